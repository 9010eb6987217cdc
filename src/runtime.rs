//! Drives a component tree through time, input and frames.
//!
//! [`Runtime`] owns the mounted tree, the interval scheduler and the
//! injected resources. It never sleeps or reads the clock: the caller moves
//! time forward with [`Runtime::advance`] and feeds buttons through
//! [`Runtime::handle_button`]. Each step runs in a fixed order:
//!
//! 1. due intervals fire, earliest first;
//! 2. one update pass reconciles the whole active tree;
//! 3. idle timeouts (dimming, screensaver) are checked.
//!
//! Frames are produced on demand by [`Runtime::render`] or, with change
//! tracking and dirty hints, by [`Runtime::present`].

use std::time::Duration;

use crate::canvas::Canvas;
use crate::component::Action;
use crate::display::DisplaySink;
use crate::error::{ConfigurationError, RenderError, Result};
use crate::input::{Button, ButtonEvent, EventResponse};
use crate::props::Descriptor;
use crate::registry::ComponentRegistry;
use crate::resources::Resources;
use crate::scheduler::Scheduler;
use crate::tree::{Env, Node};
use crate::AppConfig;

/// Borrow the lifecycle environment out of a runtime's fields, leaving the
/// trees free to be borrowed mutably alongside it.
macro_rules! lifecycle_env {
    ($runtime:expr) => {
        Env {
            registry: &$runtime.registry,
            scheduler: &mut $runtime.scheduler,
            resources: &$runtime.resources,
        }
    };
}

pub struct Runtime {
    config: AppConfig,
    registry: ComponentRegistry,
    resources: Resources,
    scheduler: Scheduler,
    root: Node,
    screensaver: Option<Node>,
    running: bool,
    last_input: Duration,
    dimmed: bool,
    /// Dim state the sink has not been told about yet
    pending_dim: Option<bool>,
    /// Release of the button that woke the screensaver, still to be eaten
    swallow_release: Option<Button>,
    last_frame: Option<Canvas>,
}

impl Runtime {
    /// Build the root component. Nothing is mounted until [`start`](Self::start).
    pub fn new(
        config: AppConfig,
        registry: ComponentRegistry,
        resources: Resources,
        root: Descriptor,
    ) -> std::result::Result<Self, ConfigurationError> {
        let root = Node::build(&root, &registry)?;
        Ok(Self {
            config,
            registry,
            resources,
            scheduler: Scheduler::new(),
            root,
            screensaver: None,
            running: false,
            last_input: Duration::ZERO,
            dimmed: false,
            pending_dim: None,
            swallow_release: None,
            last_frame: None,
        })
    }

    /// Activate the root and everything it asks for.
    pub fn start(&mut self) -> std::result::Result<(), ConfigurationError> {
        if self.running {
            return Ok(());
        }
        self.running = true;
        self.last_input = self.scheduler.now();
        log::info!(
            "starting {} ({}x{})",
            self.root.kind(),
            self.config.width,
            self.config.height
        );
        self.root.activate(&mut lifecycle_env!(self))
    }

    /// Deactivate every mounted component. The tree stays built and can be
    /// started again.
    pub fn stop(&mut self) {
        if let Some(mut screensaver) = self.screensaver.take() {
            screensaver.deactivate(&mut self.scheduler);
        }
        self.root.deactivate(&mut self.scheduler);
        self.running = false;
        log::info!("stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// The mounted screensaver tree, while the screen is asleep.
    pub fn screensaver(&self) -> Option<&Node> {
        self.screensaver.as_ref()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    pub fn is_dimmed(&self) -> bool {
        self.dimmed
    }

    pub fn is_sleeping(&self) -> bool {
        self.screensaver.is_some()
    }

    /// Move virtual time forward by `elapsed`.
    pub fn advance(&mut self, elapsed: Duration) -> std::result::Result<(), ConfigurationError> {
        let target = self.scheduler.now() + elapsed;

        while let Some((_, owner)) = self.scheduler.pop_due(target) {
            let fired = {
                let mut env = lifecycle_env!(self);
                match self.root.fire_interval(owner, &mut env) {
                    Some(fired) => Some(fired),
                    None => self
                        .screensaver
                        .as_mut()
                        .and_then(|screensaver| screensaver.fire_interval(owner, &mut env)),
                }
            };
            let Some(fired) = fired else {
                continue;
            };
            drop_unhandled(fired.escaped);
            // Settle the tree before the next tick fires
            if fired.emitted {
                self.update()?;
            }
        }
        self.scheduler.set_now(target);

        self.update()?;
        self.check_idle()
    }

    /// Deliver one button event along the focus path.
    pub fn handle_button(
        &mut self,
        event: ButtonEvent,
    ) -> std::result::Result<EventResponse, ConfigurationError> {
        if !self.running {
            return Ok(EventResponse::Ignored);
        }

        self.last_input = self.scheduler.now();
        if self.dimmed {
            log::info!("waking display");
            self.dimmed = false;
            self.pending_dim = Some(false);
        }

        if self.screensaver.is_some() {
            self.exit_screensaver()?;
            if !event.is_release() {
                self.swallow_release = Some(event.button);
            }
            return Ok(EventResponse::Handled);
        }
        if event.is_release() && self.swallow_release == Some(event.button) {
            self.swallow_release = None;
            return Ok(EventResponse::Handled);
        }

        let (response, escaped) = self.root.dispatch_button(event, &mut lifecycle_env!(self));
        drop_unhandled(escaped);
        self.update()?;
        Ok(response)
    }

    /// Run one update pass over the mounted trees.
    pub fn update(&mut self) -> std::result::Result<(), ConfigurationError> {
        let mut env = lifecycle_env!(self);
        self.root.update(&mut env)?;
        if let Some(screensaver) = self.screensaver.as_mut() {
            screensaver.update(&mut env)?;
        }
        Ok(())
    }

    fn check_idle(&mut self) -> std::result::Result<(), ConfigurationError> {
        if !self.running {
            return Ok(());
        }
        let idle = self.scheduler.now().saturating_sub(self.last_input);

        if let Some(timeout) = self.config.dimming_timeout {
            if !self.dimmed && idle >= timeout {
                log::info!("dimming display after {:?} idle", idle);
                self.dimmed = true;
                self.pending_dim = Some(true);
            }
        }

        if let Some(timeout) = self.config.screensaver_timeout {
            if self.screensaver.is_none() && idle >= timeout {
                self.enter_screensaver()?;
            }
        }
        Ok(())
    }

    fn enter_screensaver(&mut self) -> std::result::Result<(), ConfigurationError> {
        let Some(descriptor) = self.config.screensaver.as_ref() else {
            return Ok(());
        };
        let mut screensaver = Node::build(descriptor, &self.registry)?;

        self.root.deactivate(&mut self.scheduler);
        log::info!("starting screensaver {}", screensaver.kind());
        let result = screensaver.activate(&mut lifecycle_env!(self));
        self.screensaver = Some(screensaver);
        result
    }

    fn exit_screensaver(&mut self) -> std::result::Result<(), ConfigurationError> {
        if let Some(mut screensaver) = self.screensaver.take() {
            log::info!("stopping screensaver {}", screensaver.kind());
            screensaver.deactivate(&mut self.scheduler);
        }
        self.root.activate(&mut lifecycle_env!(self))
    }

    /// Whether anything changed since the last presented frame.
    pub fn needs_render(&self) -> bool {
        self.root.needs_render()
            || self
                .screensaver
                .as_ref()
                .is_some_and(|screensaver| screensaver.needs_render())
    }

    /// Draw the mounted trees onto `canvas`. Inactive trees draw nothing.
    pub fn render(&self, mut canvas: Canvas) -> std::result::Result<Canvas, RenderError> {
        self.root.render(&mut canvas, &self.resources)?;
        if let Some(screensaver) = &self.screensaver {
            screensaver.render(&mut canvas, &self.resources)?;
        }
        Ok(canvas)
    }

    /// Render a fresh frame and hand it to `sink` if it changed.
    ///
    /// Returns whether a frame was shown. The dirty hint passed along is the
    /// bounding box of the pixels that differ from the previous frame.
    pub fn present(&mut self, sink: &mut dyn DisplaySink) -> Result<bool> {
        if let Some(dimmed) = self.pending_dim.take() {
            sink.set_dimmed(dimmed)?;
        }
        if self.last_frame.is_some() && !self.needs_render() {
            return Ok(false);
        }

        let frame = self.render(Canvas::new(self.config.width, self.config.height))?;
        self.root.clear_flags();
        if let Some(screensaver) = self.screensaver.as_mut() {
            screensaver.clear_flags();
        }

        let dirty = match &self.last_frame {
            Some(previous) => match frame.diff(previous) {
                Some(changed) => Some(changed),
                None => return Ok(false),
            },
            None => None,
        };
        sink.show(&frame, dirty)?;
        self.last_frame = Some(frame);
        Ok(true)
    }
}

fn drop_unhandled(actions: Vec<Action>) {
    for action in actions {
        log::warn!("unhandled action {:?} dropped", action);
    }
}
