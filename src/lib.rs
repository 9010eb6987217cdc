pub mod animation;
pub mod canvas;
pub mod component;
pub mod display;
pub mod error;
pub mod input;
pub mod props;
pub mod registry;
pub mod resources;
pub mod runtime;
pub mod scheduler;
pub mod tree;
pub mod widgets;

use std::time::{Duration, Instant};

use calloop::channel::{self, Channel, Sender};
use calloop::timer::{TimeoutAction, Timer};
use calloop::{EventLoop, LoopSignal};

pub use error::{Error, Result};
pub use runtime::Runtime;

use display::DisplaySink;
use input::ButtonEvent;
use props::Descriptor;
use registry::ComponentRegistry;
use resources::Resources;

pub mod prelude {
    pub use crate::canvas::{Canvas, Rect};
    pub use crate::component::{Action, Component, RenderCtx, UpdateCtx};
    pub use crate::display::{DisplaySink, MemoryDisplay, PngDisplay};
    pub use crate::error::{ConfigurationError, RenderError};
    pub use crate::input::{Button, ButtonEvent, EventResponse};
    pub use crate::props::{Descriptor, PropValue, Props};
    pub use crate::registry::ComponentRegistry;
    pub use crate::resources::{FontStyle, Resources};
    pub use crate::widgets::{
        carousel, image, list, marquee_text, navigator, row, text, transition, TaskMonitor,
        TaskPage, TaskStatus, Transition, TransitionTable,
    };
    pub use crate::{button_channel, App, AppConfig, Runtime};
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub width: u32,
    pub height: u32,
    /// How often the event loop advances time and presents a frame
    pub frame_interval: Duration,
    /// Idle time before the display is dimmed
    pub dimming_timeout: Option<Duration>,
    /// Idle time before the screensaver replaces the main tree
    pub screensaver_timeout: Option<Duration>,
    pub screensaver: Option<Descriptor>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            width: 128,
            height: 64,
            frame_interval: Duration::from_millis(50),
            dimming_timeout: None,
            screensaver_timeout: None,
            screensaver: None,
        }
    }
}

impl AppConfig {
    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    pub fn dimming_timeout(mut self, timeout: Duration) -> Self {
        self.dimming_timeout = Some(timeout);
        self
    }

    /// Show `screensaver` after `timeout` without input.
    pub fn screensaver(mut self, timeout: Duration, screensaver: Descriptor) -> Self {
        self.screensaver_timeout = Some(timeout);
        self.screensaver = Some(screensaver);
        self
    }
}

/// A sender for button events from any thread, and the source [`App`]
/// listens on.
///
/// ```ignore
/// let (buttons, source) = button_channel();
/// std::thread::spawn(move || poll_gpio(buttons));
/// App::new().buttons(source).run(root, display)?;
/// ```
pub fn button_channel() -> (Sender<ButtonEvent>, Channel<ButtonEvent>) {
    channel::channel()
}

/// A callback that gets called each frame before rendering.
pub type UpdateCallback = Box<dyn FnMut(&mut Runtime)>;

pub struct App {
    config: AppConfig,
    registry: ComponentRegistry,
    resources: Resources,
    buttons: Option<Channel<ButtonEvent>>,
    on_update: Option<UpdateCallback>,
}

struct LoopState {
    runtime: Runtime,
    sink: Box<dyn DisplaySink>,
    on_update: Option<UpdateCallback>,
    last_tick: Instant,
    signal: LoopSignal,
    error: Option<Error>,
}

impl LoopState {
    fn fail(&mut self, error: Error) {
        log::error!("{}", error);
        self.error = Some(error);
        self.signal.stop();
    }

    fn frame(&mut self) -> Result<()> {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_tick);
        self.last_tick = now;

        if let Some(callback) = self.on_update.as_mut() {
            callback(&mut self.runtime);
        }
        self.runtime.advance(elapsed)?;
        self.runtime.present(self.sink.as_mut())?;
        Ok(())
    }
}

impl App {
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self {
            config,
            registry: ComponentRegistry::with_builtins(),
            resources: Resources::default(),
            buttons: None,
            on_update: None,
        }
    }

    pub fn width(mut self, width: u32) -> Self {
        self.config.width = width;
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.config.height = height;
        self
    }

    /// Replace the component registry (the built-in widgets by default).
    pub fn registry(mut self, registry: ComponentRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn resources(mut self, resources: Resources) -> Self {
        self.resources = resources;
        self
    }

    /// Listen for buttons on a channel made by [`button_channel`].
    pub fn buttons(mut self, source: Channel<ButtonEvent>) -> Self {
        self.buttons = Some(source);
        self
    }

    /// Set a callback that gets called each frame before time advances.
    pub fn on_update<F: FnMut(&mut Runtime) + 'static>(mut self, callback: F) -> Self {
        self.on_update = Some(Box::new(callback));
        self
    }

    /// Mount `root` and run until the button channel closes or a step fails.
    pub fn run(self, root: Descriptor, sink: impl DisplaySink + 'static) -> Result<()> {
        env_logger::init();

        let frame_interval = self.config.frame_interval;
        let mut runtime = Runtime::new(self.config, self.registry, self.resources, root)?;
        runtime.start()?;

        let mut event_loop: EventLoop<LoopState> = EventLoop::try_new()?;
        let handle = event_loop.handle();

        handle
            .insert_source(Timer::immediate(), move |_, _, state| {
                if let Err(error) = state.frame() {
                    state.fail(error);
                }
                TimeoutAction::ToDuration(frame_interval)
            })
            .map_err(|err| err.error)?;

        if let Some(buttons) = self.buttons {
            handle
                .insert_source(buttons, |event, _, state| match event {
                    channel::Event::Msg(button) => {
                        log::debug!("button {:?}", button);
                        if let Err(error) = state.runtime.handle_button(button) {
                            state.fail(error.into());
                        }
                    }
                    channel::Event::Closed => {
                        log::info!("button source closed, exiting");
                        state.signal.stop();
                    }
                })
                .map_err(|err| err.error)?;
        }

        let mut state = LoopState {
            runtime,
            sink: Box::new(sink),
            on_update: self.on_update,
            last_tick: Instant::now(),
            signal: event_loop.get_signal(),
            error: None,
        };
        event_loop.run(None, &mut state, |_| {})?;

        state.runtime.stop();
        match state.error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
