//! Injected drawing resources: fonts and image lookup.
//!
//! Components never load fonts or resolve asset paths on their own; the
//! runtime hands them a [`Resources`] value, so tests and devices can swap
//! either side without touching component code.

use std::path::{Path, PathBuf};

use embedded_graphics::mono_font::ascii;
use embedded_graphics::mono_font::MonoFont;

/// Font request made by text components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontStyle {
    /// Nominal line height in pixels
    pub size: u32,
    pub bold: bool,
}

impl FontStyle {
    pub const fn regular(size: u32) -> Self {
        Self { size, bold: false }
    }

    pub const fn bold(size: u32) -> Self {
        Self { size, bold: true }
    }
}

pub trait FontProvider {
    /// The font to use for `style`, or `None` when nothing fits.
    fn font(&self, style: FontStyle) -> Option<&'static MonoFont<'static>>;
}

/// Picks the tallest built-in ASCII bitmap font not taller than the
/// requested size. Bold falls back to regular below 13px.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonoFontProvider;

impl FontProvider for MonoFontProvider {
    fn font(&self, style: FontStyle) -> Option<&'static MonoFont<'static>> {
        let font: &'static MonoFont<'static> = match (style.size, style.bold) {
            (0..=5, _) => return None,
            (6..=7, _) => &ascii::FONT_4X6,
            (8..=9, _) => &ascii::FONT_5X8,
            (10..=11, _) => &ascii::FONT_6X10,
            (12, _) => &ascii::FONT_6X12,
            (13, false) => &ascii::FONT_7X13,
            (13, true) => &ascii::FONT_7X13_BOLD,
            (14, false) => &ascii::FONT_7X14,
            (14, true) => &ascii::FONT_7X14_BOLD,
            (15..=17, false) => &ascii::FONT_9X15,
            (15..=17, true) => &ascii::FONT_9X15_BOLD,
            (18..=19, false) => &ascii::FONT_9X18,
            (18..=19, true) => &ascii::FONT_9X18_BOLD,
            (_, _) => &ascii::FONT_10X20,
        };
        Some(font)
    }
}

/// Rendered width of a single line of `text`.
pub fn text_width(font: &MonoFont<'_>, text: &str) -> u32 {
    let chars = text.chars().count() as u32;
    if chars == 0 {
        return 0;
    }
    chars * font.character_size.width + (chars - 1) * font.character_spacing
}

pub trait ImageResolver {
    /// Turn an asset-relative path into a file on disk.
    fn resolve(&self, relative: &str) -> PathBuf;
}

/// Looks an asset up in a list of directories, first match wins.
///
/// When no directory contains the file, the path inside the first directory
/// is returned so the load error names a sensible location.
#[derive(Debug, Clone)]
pub struct DirResolver {
    dirs: Vec<PathBuf>,
}

impl DirResolver {
    pub fn new<P: AsRef<Path>>(dirs: impl IntoIterator<Item = P>) -> Self {
        Self {
            dirs: dirs.into_iter().map(|d| d.as_ref().to_path_buf()).collect(),
        }
    }
}

impl Default for DirResolver {
    fn default() -> Self {
        Self::new(["assets"])
    }
}

impl ImageResolver for DirResolver {
    fn resolve(&self, relative: &str) -> PathBuf {
        self.dirs
            .iter()
            .map(|dir| dir.join(relative))
            .find(|candidate| candidate.exists())
            .or_else(|| self.dirs.first().map(|dir| dir.join(relative)))
            .unwrap_or_else(|| PathBuf::from(relative))
    }
}

pub struct Resources {
    pub fonts: Box<dyn FontProvider>,
    pub images: Box<dyn ImageResolver>,
}

impl Resources {
    pub fn new() -> Self {
        Self {
            fonts: Box::new(MonoFontProvider),
            images: Box::new(DirResolver::default()),
        }
    }

    pub fn with_fonts(mut self, fonts: impl FontProvider + 'static) -> Self {
        self.fonts = Box::new(fonts);
        self
    }

    pub fn with_images(mut self, images: impl ImageResolver + 'static) -> Self {
        self.images = Box::new(images);
        self
    }
}

impl Default for Resources {
    fn default() -> Self {
        Self::new()
    }
}
