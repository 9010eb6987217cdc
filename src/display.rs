//! Frame sinks.
//!
//! The engine hands finished frames to a [`DisplaySink`] and knows nothing
//! about the hardware behind it. Device drivers implement the trait; the two
//! sinks here serve tests and host-side development.

use std::path::PathBuf;

use crate::canvas::{Canvas, Rect};
use crate::error::DisplayError;

pub trait DisplaySink {
    /// Show a finished frame. `dirty` bounds the pixels that changed since
    /// the previous frame; `None` means the whole frame is new.
    fn show(&mut self, frame: &Canvas, dirty: Option<Rect>) -> Result<(), DisplayError>;

    /// Lower (or restore) the panel brightness.
    fn set_dimmed(&mut self, dimmed: bool) -> Result<(), DisplayError> {
        let _ = dimmed;
        Ok(())
    }
}

/// Keeps every frame it is shown.
#[derive(Debug, Default)]
pub struct MemoryDisplay {
    frames: Vec<(Canvas, Option<Rect>)>,
    dimmed: bool,
}

impl MemoryDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every frame shown so far, with its dirty hint.
    pub fn frames(&self) -> &[(Canvas, Option<Rect>)] {
        &self.frames
    }

    pub fn last(&self) -> Option<&Canvas> {
        self.frames.last().map(|(frame, _)| frame)
    }

    pub fn is_dimmed(&self) -> bool {
        self.dimmed
    }
}

impl DisplaySink for MemoryDisplay {
    fn show(&mut self, frame: &Canvas, dirty: Option<Rect>) -> Result<(), DisplayError> {
        self.frames.push((frame.clone(), dirty));
        Ok(())
    }

    fn set_dimmed(&mut self, dimmed: bool) -> Result<(), DisplayError> {
        self.dimmed = dimmed;
        Ok(())
    }
}

/// Writes each frame to a PNG file, replacing the previous one.
#[derive(Debug, Clone)]
pub struct PngDisplay {
    path: PathBuf,
}

impl PngDisplay {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DisplaySink for PngDisplay {
    fn show(&mut self, frame: &Canvas, _dirty: Option<Rect>) -> Result<(), DisplayError> {
        let bytes = frame.to_png()?;
        std::fs::write(&self.path, bytes)?;
        Ok(())
    }

    fn set_dimmed(&mut self, dimmed: bool) -> Result<(), DisplayError> {
        log::info!("display {}", if dimmed { "dimmed" } else { "woken" });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_display_writes_frame() {
        let path = std::env::temp_dir().join("miniscreen-png-display.png");
        let mut frame = Canvas::new(8, 4);
        frame.fill_rect(Rect::new(0, 0, 4, 4), true);

        PngDisplay::new(&path).show(&frame, None).unwrap();

        let written = image::open(&path).unwrap().to_luma8();
        assert_eq!(Canvas::from_image(written), frame);
    }

    #[test]
    fn test_memory_display_records_hints() {
        let mut display = MemoryDisplay::new();
        display.show(&Canvas::new(2, 2), None).unwrap();
        display
            .show(&Canvas::new(2, 2), Some(Rect::new(0, 0, 1, 1)))
            .unwrap();
        display.set_dimmed(true).unwrap();

        assert_eq!(display.frames().len(), 2);
        assert_eq!(display.frames()[1].1, Some(Rect::new(0, 0, 1, 1)));
        assert!(display.is_dimmed());
    }
}
