//! Text that scrolls horizontally when it does not fit.
//!
//! The scroll offset only moves on interval ticks, so it freezes while the
//! widget is inactive and restarts from zero on every activation.

use std::cell::Cell;
use std::time::Duration;

use crate::canvas::Canvas;
use crate::component::{Component, RenderCtx, UpdateCtx};
use crate::error::{ConfigurationError, RenderError};
use crate::props::{Descriptor, Props};
use crate::resources::{text_width, FontStyle, Resources};

use super::text::{draw_text, font_style, resolve_font};

pub const KIND: &str = "marquee_text";

pub struct MarqueeText {
    content: String,
    style: FontStyle,
    y: i32,
    step: u32,
    gap: u32,
    period: Duration,
    offset: u32,
    text_width: u32,
    /// Width of the region seen by the last render
    viewport: Cell<u32>,
}

impl MarqueeText {
    pub fn from_props(props: &Props) -> Result<Self, ConfigurationError> {
        Ok(Self {
            content: props.text(KIND, "text")?.to_string(),
            style: font_style(KIND, props)?,
            y: props.i32_or(KIND, "y", 0)?,
            step: props.u32_or(KIND, "step", 1)?,
            gap: props.u32_or(KIND, "gap", 20)?,
            period: Duration::from_millis(u64::from(props.u32_or(KIND, "interval_ms", 50)?)),
            offset: 0,
            text_width: 0,
            viewport: Cell::new(u32::MAX),
        })
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    fn measure(&mut self, resources: &Resources) {
        self.text_width = resources
            .fonts
            .font(self.style)
            .map(|font| text_width(font, &self.content))
            .unwrap_or(0);
    }

    fn overflows(&self) -> bool {
        self.text_width > self.viewport.get()
    }
}

impl Component for MarqueeText {
    fn set_props(&mut self, props: &Props, resources: &Resources) -> Result<(), ConfigurationError> {
        let mut next = MarqueeText::from_props(props)?;
        if next.content == self.content && next.style == self.style {
            next.offset = self.offset;
        }
        next.viewport = Cell::new(self.viewport.get());
        next.measure(resources);
        *self = next;
        Ok(())
    }

    fn interval(&self) -> Option<Duration> {
        Some(self.period)
    }

    fn on_mount(&mut self, ctx: &mut UpdateCtx<'_>) -> Result<(), ConfigurationError> {
        self.offset = 0;
        self.measure(ctx.resources());
        Ok(())
    }

    fn on_interval(&mut self, ctx: &mut UpdateCtx<'_>) {
        if !self.overflows() {
            return;
        }
        let cycle = self.text_width + self.gap;
        self.offset = (self.offset + self.step) % cycle;
        ctx.request_render();
    }

    fn render(&self, canvas: &mut Canvas, ctx: &RenderCtx<'_>) -> Result<(), RenderError> {
        self.viewport.set(canvas.width());
        let font = resolve_font(ctx.fonts(), self.style)?;

        let x = -(self.offset as i32);
        draw_text(canvas, font, &self.content, x, self.y);
        if self.overflows() {
            let wrapped = x + (self.text_width + self.gap) as i32;
            draw_text(canvas, font, &self.content, wrapped, self.y);
        }
        Ok(())
    }
}

/// Descriptor for a [`MarqueeText`] showing `content`.
pub fn marquee_text(content: impl Into<String>) -> Descriptor {
    Descriptor::new(KIND).prop("text", content.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::MemoryDisplay;
    use crate::widgets::{carousel, harness};

    fn long_text() -> Descriptor {
        marquee_text("a line that is far too long for the screen")
            .prop("size", 10)
            .prop("interval_ms", 10)
    }

    #[test]
    fn test_short_text_stays_still() {
        let mut runtime = harness(marquee_text("hi").prop("size", 10), 128, 16);
        let mut display = MemoryDisplay::new();
        assert!(runtime.present(&mut display).unwrap());

        runtime.advance(Duration::from_millis(500)).unwrap();
        assert!(!runtime.present(&mut display).unwrap());
        assert_eq!(display.frames().len(), 1);
    }

    #[test]
    fn test_long_text_scrolls_while_active() {
        let mut runtime = harness(long_text(), 64, 16);
        let before = runtime.render(Canvas::new(64, 16)).unwrap();

        runtime.advance(Duration::from_millis(30)).unwrap();
        let after = runtime.render(Canvas::new(64, 16)).unwrap();
        assert_ne!(before, after);

        // Shifted left by exactly three steps
        let mut shifted = Canvas::new(64, 16);
        for y in 0..16 {
            for x in 0..61 {
                shifted.set_pixel(x, y, before.pixel(x + 3, y));
            }
        }
        for y in 0..16 {
            for x in 0..61 {
                assert_eq!(after.pixel(x, y), shifted.pixel(x, y), "pixel {x},{y}");
            }
        }
    }

    #[test]
    fn test_offset_freezes_while_hidden() {
        // Two slides: the marquee is hidden while the carousel shows the other
        let root = carousel(vec![long_text(), Descriptor::new("text").prop("text", "x")])
            .prop("interval_ms", 1000);
        let mut runtime = harness(root, 64, 16);
        runtime.render(Canvas::new(64, 16)).unwrap();

        runtime.advance(Duration::from_millis(1000)).unwrap();
        let marquee = &runtime.root().children()[0];
        assert!(!marquee.is_active());
        assert_eq!(runtime.scheduler().registrations_for(marquee.id()), 0);

        runtime.advance(Duration::from_millis(1000)).unwrap();
        let marquee = &runtime.root().children()[0];
        assert!(marquee.is_active());
        // Back from the start after reactivation
        let canvas = runtime.render(Canvas::new(64, 16)).unwrap();
        let fresh = harness(long_text(), 64, 16)
            .render(Canvas::new(64, 16))
            .unwrap();
        assert_eq!(canvas, fresh);
    }
}
