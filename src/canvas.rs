//! The 1-bit framebuffer passed down the render chain.
//!
//! A [`Canvas`] owns a single-channel image whose pixels are either 0 (off)
//! or 255 (on). Components draw into the *current region*: a translated,
//! clipped window pushed with [`Canvas::with_region`]. Coordinates given to
//! every drawing method are local to that region.

use std::convert::Infallible;
use std::io::Cursor;

use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::geometry::{OriginDimensions, Point, Size};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::primitives::{Primitive, PrimitiveStyle, Rectangle};
use embedded_graphics::{Drawable, Pixel};
use image::{DynamicImage, GrayImage, ImageFormat, Luma};

const ON: Luma<u8> = Luma([255]);
const OFF: Luma<u8> = Luma([0]);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    pub fn inset(&self, amount: u32) -> Self {
        Self {
            x: self.x + amount as i32,
            y: self.y + amount as i32,
            width: self.width.saturating_sub(amount * 2),
            height: self.height.saturating_sub(amount * 2),
        }
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Overlapping area of two rects, `None` when they do not overlap.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        Some(Rect::new(x, y, (right - x) as u32, (bottom - y) as u32))
    }

    /// Smallest rect containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, (right - x) as u32, (bottom - y) as u32)
    }
}

/// A drawing window in absolute image coordinates.
#[derive(Debug, Clone, Copy)]
struct Region {
    /// Logical area of the region (may extend past the image)
    area: Rect,
    /// Visible part of `area`, already intersected with the parent clip
    clip: Option<Rect>,
}

pub struct Canvas {
    image: GrayImage,
    regions: Vec<Region>,
}

impl Canvas {
    /// Create a blank (all off) canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self::from_image(GrayImage::new(width, height))
    }

    /// Wrap an existing grayscale image, thresholding it to 1 bit.
    pub fn from_image(mut image: GrayImage) -> Self {
        for pixel in image.pixels_mut() {
            *pixel = if pixel[0] >= 128 { ON } else { OFF };
        }
        let full = Rect::from_size(image.width(), image.height());
        Self {
            image,
            regions: vec![Region {
                area: full,
                clip: Some(full),
            }],
        }
    }

    fn region(&self) -> Region {
        // The base region is pushed in the constructor and never popped.
        self.regions[self.regions.len() - 1]
    }

    /// Width of the current region.
    pub fn width(&self) -> u32 {
        self.region().area.width
    }

    /// Height of the current region.
    pub fn height(&self) -> u32 {
        self.region().area.height
    }

    /// The current region in local coordinates.
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width(), self.height())
    }

    /// Run `f` with drawing restricted to `rect` (local coordinates).
    ///
    /// Inside `f`, (0, 0) is the top-left corner of `rect` and drawing
    /// outside of it is discarded.
    pub fn with_region<R>(&mut self, rect: Rect, f: impl FnOnce(&mut Canvas) -> R) -> R {
        let parent = self.region();
        let area = rect.offset(parent.area.x, parent.area.y);
        let clip = parent.clip.and_then(|clip| clip.intersection(&area));
        self.regions.push(Region { area, clip });
        let result = f(self);
        self.regions.pop();
        result
    }

    fn to_absolute(&self, x: i32, y: i32) -> Option<(u32, u32)> {
        let region = self.region();
        let (ax, ay) = (x + region.area.x, y + region.area.y);
        match region.clip {
            Some(clip) if clip.contains(ax, ay) => Some((ax as u32, ay as u32)),
            _ => None,
        }
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, on: bool) {
        if let Some((ax, ay)) = self.to_absolute(x, y) {
            self.image.put_pixel(ax, ay, if on { ON } else { OFF });
        }
    }

    /// Pixel state in local coordinates; pixels outside the region read as off.
    pub fn pixel(&self, x: i32, y: i32) -> bool {
        self.to_absolute(x, y)
            .map(|(ax, ay)| self.image.get_pixel(ax, ay)[0] != 0)
            .unwrap_or(false)
    }

    /// Turn off every pixel of the current region.
    pub fn clear(&mut self) {
        self.fill_rect(self.bounds(), false);
    }

    pub fn fill_rect(&mut self, rect: Rect, on: bool) {
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                self.set_pixel(x, y, on);
            }
        }
    }

    /// Flip every pixel inside `rect`.
    pub fn invert_rect(&mut self, rect: Rect) {
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                let on = self.pixel(x, y);
                self.set_pixel(x, y, !on);
            }
        }
    }

    /// Draw a one pixel outline along the inside edge of `rect`.
    pub fn stroke_rect(&mut self, rect: Rect) {
        let outline = Rectangle::new(
            Point::new(rect.x, rect.y),
            Size::new(rect.width, rect.height),
        )
        .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1));
        // Drawing into the canvas is infallible.
        let _ = outline.draw(self);
    }

    /// Copy a monochrome bitmap with its top-left corner at (x, y).
    pub fn blit(&mut self, bitmap: &GrayImage, x: i32, y: i32) {
        for (bx, by, pixel) in bitmap.enumerate_pixels() {
            self.set_pixel(x + bx as i32, y + by as i32, pixel[0] >= 128);
        }
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.image
    }

    pub fn into_image(self) -> GrayImage {
        self.image
    }

    /// Encode the whole canvas as PNG.
    pub fn to_png(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut bytes = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    /// Bounding box of the pixels that differ from `other`.
    ///
    /// Canvases of different sizes differ everywhere.
    pub fn diff(&self, other: &Canvas) -> Option<Rect> {
        let full = Rect::from_size(self.image.width(), self.image.height());
        if self.image.dimensions() != other.image.dimensions() {
            return Some(full);
        }

        let mut changed: Option<Rect> = None;
        for (x, y, pixel) in self.image.enumerate_pixels() {
            if pixel != other.image.get_pixel(x, y) {
                let dot = Rect::new(x as i32, y as i32, 1, 1);
                changed = Some(match changed {
                    Some(area) => area.union(&dot),
                    None => dot,
                });
            }
        }
        changed
    }
}

impl Clone for Canvas {
    /// Clones the pixels; the region stack starts fresh.
    fn clone(&self) -> Self {
        Self::from_image(self.image.clone())
    }
}

impl PartialEq for Canvas {
    fn eq(&self, other: &Self) -> bool {
        self.image == other.image
    }
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.image.width())
            .field("height", &self.image.height())
            .field("depth", &self.regions.len())
            .finish()
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }
}

impl DrawTarget for Canvas {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point.x, point.y, color.is_on());
        }
        Ok(())
    }
}

/// Threshold a decoded image to the 1-bit palette.
///
/// A pixel is on when it is mostly opaque and at least mid-gray.
pub fn to_monochrome(image: &DynamicImage) -> GrayImage {
    let rgba = image.to_rgba8();
    let mut out = GrayImage::new(rgba.width(), rgba.height());
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let luma = (u32::from(r) * 299 + u32::from(g) * 587 + u32::from(b) * 114) / 1000;
        let on = a >= 128 && luma >= 128;
        out.put_pixel(x, y, if on { ON } else { OFF });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_offset() {
        let rect = Rect::new(10, 20, 100, 200);
        let offset_rect = rect.offset(5, 10);
        assert_eq!(offset_rect, Rect::new(15, 30, 100, 200));
    }

    #[test]
    fn test_rect_inset() {
        let rect = Rect::new(0, 0, 100, 100);
        assert_eq!(rect.inset(10), Rect::new(10, 10, 80, 80));

        // Inset never goes negative
        let over_inset = Rect::new(0, 0, 10, 10).inset(20);
        assert_eq!(over_inset.width, 0);
        assert_eq!(over_inset.height, 0);
    }

    #[test]
    fn test_rect_contains() {
        let rect = Rect::new(10, 20, 100, 50);
        assert!(rect.contains(50, 40));
        assert!(rect.contains(10, 20));
        assert!(!rect.contains(110, 70));
        assert!(!rect.contains(5, 40));
        assert!(!rect.contains(50, 100));
    }

    #[test]
    fn test_rect_intersection_and_union() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 10, 10);
        assert_eq!(a.intersection(&b), Some(Rect::new(5, 5, 5, 5)));
        assert_eq!(a.union(&b), Rect::new(0, 0, 15, 15));
        assert_eq!(a.intersection(&Rect::new(20, 20, 1, 1)), None);
    }

    #[test]
    fn test_region_translates_and_clips() {
        let mut canvas = Canvas::new(16, 16);
        canvas.with_region(Rect::new(4, 4, 4, 4), |c| {
            assert_eq!(c.width(), 4);
            c.set_pixel(0, 0, true);
            // Outside the region: discarded
            c.set_pixel(5, 0, true);
            c.set_pixel(-1, 0, true);
        });
        assert!(canvas.pixel(4, 4));
        assert!(!canvas.pixel(9, 4));
        assert!(!canvas.pixel(3, 4));
    }

    #[test]
    fn test_nested_regions_clip_to_parent() {
        let mut canvas = Canvas::new(16, 16);
        canvas.with_region(Rect::new(0, 0, 8, 8), |outer| {
            outer.with_region(Rect::new(6, 6, 8, 8), |inner| {
                assert_eq!(inner.width(), 8);
                inner.fill_rect(inner.bounds(), true);
            });
        });
        assert!(canvas.pixel(7, 7));
        assert!(!canvas.pixel(8, 8));
    }

    #[test]
    fn test_stroke_rect_draws_outline_only() {
        let mut canvas = Canvas::new(8, 8);
        canvas.stroke_rect(Rect::new(0, 0, 4, 4));
        assert!(canvas.pixel(0, 0));
        assert!(canvas.pixel(3, 3));
        assert!(!canvas.pixel(1, 1));
    }

    #[test]
    fn test_diff_bounds_changed_pixels() {
        let blank = Canvas::new(32, 32);
        let mut drawn = Canvas::new(32, 32);
        assert_eq!(drawn.diff(&blank), None);

        drawn.set_pixel(3, 4, true);
        drawn.set_pixel(10, 2, true);
        assert_eq!(drawn.diff(&blank), Some(Rect::new(3, 2, 8, 3)));
    }

    #[test]
    fn test_from_image_thresholds() {
        let mut gray = GrayImage::new(2, 1);
        gray.put_pixel(0, 0, Luma([200]));
        gray.put_pixel(1, 0, Luma([20]));
        let canvas = Canvas::from_image(gray);
        assert!(canvas.pixel(0, 0));
        assert!(!canvas.pixel(1, 0));
    }

    #[test]
    fn test_png_encoding() {
        let canvas = Canvas::new(128, 64);
        let png = canvas.to_png().unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }
}
