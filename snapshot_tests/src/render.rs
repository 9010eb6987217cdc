use std::time::Duration;

use image::GrayImage;
use miniscreen::canvas::Canvas;
use miniscreen::display::MemoryDisplay;
use miniscreen::input::ButtonEvent;
use miniscreen::props::Descriptor;
use miniscreen::registry::ComponentRegistry;
use miniscreen::resources::Resources;
use miniscreen::{AppConfig, Runtime};

use crate::Result;

/// A tree to mount and the input to replay before the frame is taken
#[derive(Clone, Debug)]
pub struct Scene {
    pub name: String,
    pub root: Descriptor,
    pub width: u32,
    pub height: u32,
    /// Buttons delivered after mounting, in order
    pub buttons: Vec<ButtonEvent>,
    /// Virtual time to let pass before rendering
    pub settle: Duration,
}

impl Scene {
    pub fn new(name: impl Into<String>, root: Descriptor) -> Self {
        Self {
            name: name.into(),
            root,
            width: 128,
            height: 64,
            buttons: Vec::new(),
            settle: Duration::ZERO,
        }
    }

    pub fn click(mut self, button: miniscreen::input::Button) -> Self {
        self.buttons.push(ButtonEvent::press(button));
        self.buttons.push(ButtonEvent::release(button));
        self
    }

    pub fn settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }
}

/// Mount the scene with the built-in widgets and render one frame.
///
/// A frame is drawn after mounting and after every button, the way the
/// app's frame loop would, so widgets that measure their region see it.
pub fn render_scene(scene: &Scene) -> Result<GrayImage> {
    let config = AppConfig::default().size(scene.width, scene.height);
    let mut runtime = Runtime::new(
        config,
        ComponentRegistry::with_builtins(),
        Resources::default(),
        scene.root.clone(),
    )
    .map_err(miniscreen::Error::from)?;
    runtime.start().map_err(miniscreen::Error::from)?;
    let mut display = MemoryDisplay::new();
    runtime.present(&mut display)?;

    for event in &scene.buttons {
        runtime
            .handle_button(*event)
            .map_err(miniscreen::Error::from)?;
        runtime.present(&mut display)?;
    }
    runtime
        .advance(scene.settle)
        .map_err(miniscreen::Error::from)?;

    let frame = runtime
        .render(Canvas::new(scene.width, scene.height))
        .map_err(miniscreen::Error::from)?;
    Ok(frame.into_image())
}
