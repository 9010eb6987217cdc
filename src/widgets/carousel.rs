use std::time::Duration;

use crate::canvas::Canvas;
use crate::component::{Component, RenderCtx, UpdateCtx};
use crate::error::{ConfigurationError, RenderError};
use crate::input::{Button, ButtonEvent, EventResponse};
use crate::props::{Descriptor, Props};
use crate::resources::Resources;

pub const KIND: &str = "carousel";

/// Shows one child at a time and moves to the next on every interval.
///
/// Up and Down step through the slides by hand. Slides that are not shown
/// stay mounted but inactive.
pub struct Carousel {
    slides: Vec<Descriptor>,
    period: Duration,
    index: usize,
}

impl Carousel {
    pub fn from_props(props: &Props) -> Result<Self, ConfigurationError> {
        Ok(Self {
            slides: props.children(KIND, "children")?,
            period: Duration::from_millis(u64::from(props.u32_or(KIND, "interval_ms", 5000)?)),
            index: 0,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    fn step(&mut self, forward: bool) -> bool {
        let count = self.slides.len();
        if count < 2 {
            return false;
        }
        self.index = if forward {
            (self.index + 1) % count
        } else {
            (self.index + count - 1) % count
        };
        true
    }
}

impl Component for Carousel {
    fn set_props(&mut self, props: &Props, _: &Resources) -> Result<(), ConfigurationError> {
        let next = Carousel::from_props(props)?;
        self.slides = next.slides;
        self.period = next.period;
        if self.index >= self.slides.len() {
            self.index = 0;
        }
        Ok(())
    }

    fn children(&self) -> Vec<Descriptor> {
        self.slides.clone()
    }

    fn child_active(&self, index: usize) -> bool {
        index == self.index
    }

    fn focused_child(&self) -> Option<usize> {
        (self.index < self.slides.len()).then_some(self.index)
    }

    fn interval(&self) -> Option<Duration> {
        Some(self.period)
    }

    fn on_interval(&mut self, ctx: &mut UpdateCtx<'_>) {
        if self.step(true) {
            ctx.request_render();
        }
    }

    fn on_button(&mut self, event: ButtonEvent, ctx: &mut UpdateCtx<'_>) -> EventResponse {
        let forward = match event.released() {
            Some(Button::Down) => true,
            Some(Button::Up) => false,
            _ => return EventResponse::Ignored,
        };
        if self.step(forward) {
            ctx.request_render();
            EventResponse::Handled
        } else {
            EventResponse::Ignored
        }
    }

    fn render(&self, canvas: &mut Canvas, ctx: &RenderCtx<'_>) -> Result<(), RenderError> {
        ctx.render_child(self.index, canvas)
    }
}

/// Descriptor for a [`Carousel`] cycling through `slides`.
pub fn carousel(slides: Vec<Descriptor>) -> Descriptor {
    Descriptor::new(KIND).prop("children", slides)
}
