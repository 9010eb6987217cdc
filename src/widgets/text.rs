use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text as TextDrawable};

use crate::canvas::Canvas;
use crate::component::{Component, RenderCtx};
use crate::error::{ConfigurationError, RenderError};
use crate::props::{Descriptor, Props};
use crate::resources::{text_width, FontProvider, FontStyle, Resources};

pub const KIND: &str = "text";

const DEFAULT_SIZE: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    pub(crate) fn from_props(kind: &str, props: &Props) -> Result<Self, ConfigurationError> {
        match props.text_or(kind, "align", "left")? {
            "left" => Ok(Align::Left),
            "center" => Ok(Align::Center),
            "right" => Ok(Align::Right),
            _ => Err(ConfigurationError::InvalidProp {
                kind: kind.to_string(),
                prop: "align".to_string(),
                expected: "one of left, center, right",
            }),
        }
    }
}

/// Font request shared by text-drawing widgets: `size` and `bold` props.
pub(crate) fn font_style(kind: &str, props: &Props) -> Result<FontStyle, ConfigurationError> {
    Ok(FontStyle {
        size: props.u32_or(kind, "size", DEFAULT_SIZE)?,
        bold: props.bool_or(kind, "bold", false)?,
    })
}

pub(crate) fn resolve_font(
    fonts: &dyn FontProvider,
    style: FontStyle,
) -> Result<&'static MonoFont<'static>, RenderError> {
    fonts.font(style).ok_or(RenderError::MissingFont {
        size: style.size,
        bold: style.bold,
    })
}

/// Draw one line of text with its top-left corner at (x, y).
pub(crate) fn draw_text(canvas: &mut Canvas, font: &MonoFont<'_>, content: &str, x: i32, y: i32) {
    let style = MonoTextStyle::new(font, BinaryColor::On);
    // Drawing into the canvas is infallible.
    let _ = TextDrawable::with_baseline(content, Point::new(x, y), style, Baseline::Top).draw(canvas);
}

/// A single line of static text.
pub struct Text {
    content: String,
    style: FontStyle,
    align: Align,
    x: i32,
    y: i32,
}

impl Text {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            style: FontStyle::regular(DEFAULT_SIZE),
            align: Align::Left,
            x: 0,
            y: 0,
        }
    }

    pub fn style(mut self, style: FontStyle) -> Self {
        self.style = style;
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn position(mut self, x: i32, y: i32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn from_props(props: &Props) -> Result<Self, ConfigurationError> {
        Ok(Text::new(props.text(KIND, "text")?)
            .style(font_style(KIND, props)?)
            .align(Align::from_props(KIND, props)?)
            .position(
                props.i32_or(KIND, "x", 0)?,
                props.i32_or(KIND, "y", 0)?,
            ))
    }
}

impl Component for Text {
    fn set_props(&mut self, props: &Props, _: &Resources) -> Result<(), ConfigurationError> {
        *self = Text::from_props(props)?;
        Ok(())
    }

    fn render(&self, canvas: &mut Canvas, ctx: &RenderCtx<'_>) -> Result<(), RenderError> {
        let font = resolve_font(ctx.fonts(), self.style)?;
        let width = text_width(font, &self.content) as i32;
        let x = match self.align {
            Align::Left => self.x,
            Align::Center => (canvas.width() as i32 - width) / 2 + self.x,
            Align::Right => canvas.width() as i32 - width - self.x,
        };
        draw_text(canvas, font, &self.content, x, self.y);
        Ok(())
    }
}

/// Descriptor for a [`Text`] showing `content`.
pub fn text(content: impl Into<String>) -> Descriptor {
    Descriptor::new(KIND).prop("text", content.into())
}
