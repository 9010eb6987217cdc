//! Static and animated bitmaps.
//!
//! Files are resolved through the injected [`ImageResolver`] when the widget
//! mounts, decoded once, and thresholded to the 1-bit palette. GIFs play one
//! frame at a time on the widget's interval and either stop on the last
//! frame or loop.
//!
//! [`ImageResolver`]: crate::resources::ImageResolver

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, DynamicImage, GrayImage, ImageError};

use crate::canvas::{to_monochrome, Canvas};
use crate::component::{Component, RenderCtx, UpdateCtx};
use crate::error::{ConfigurationError, RenderError};
use crate::props::{Descriptor, Props};
use crate::resources::Resources;

pub const KIND: &str = "image";

/// GIFs often declare a zero delay; players treat that as this.
const FALLBACK_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct Frame {
    pub bitmap: GrayImage,
    pub delay: Duration,
}

pub struct Image {
    path: String,
    looping: bool,
    x: i32,
    y: i32,
    frames: Vec<Frame>,
    loaded_from: Option<PathBuf>,
    current: usize,
    elapsed: Duration,
}

impl Image {
    pub fn from_props(props: &Props) -> Result<Self, ConfigurationError> {
        Ok(Self {
            path: props.text(KIND, "path")?.to_string(),
            looping: props.bool_or(KIND, "loop", false)?,
            x: props.i32_or(KIND, "x", 0)?,
            y: props.i32_or(KIND, "y", 0)?,
            frames: Vec::new(),
            loaded_from: None,
            current: 0,
            elapsed: Duration::ZERO,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn current_frame(&self) -> usize {
        self.current
    }

    fn load(&mut self, resources: &Resources) -> Result<(), ConfigurationError> {
        let resolved = resources.images.resolve(&self.path);
        if self.loaded_from.as_ref() == Some(&resolved) {
            return Ok(());
        }
        self.frames = load_frames(&resolved).map_err(|source| ConfigurationError::Image {
            path: resolved.clone(),
            source,
        })?;
        log::debug!("loaded {} frame(s) from {}", self.frames.len(), resolved.display());
        self.loaded_from = Some(resolved);
        self.current = 0;
        self.elapsed = Duration::ZERO;
        Ok(())
    }

    fn is_animated(&self) -> bool {
        self.frames.len() > 1
    }
}

fn is_gif(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gif"))
}

/// Decode every frame of `path`. Non-GIF formats yield a single frame.
pub fn load_frames(path: &Path) -> Result<Vec<Frame>, ImageError> {
    if !is_gif(path) {
        let image = image::open(path)?;
        return Ok(vec![Frame {
            bitmap: to_monochrome(&image),
            delay: FALLBACK_DELAY,
        }]);
    }

    let decoder = GifDecoder::new(BufReader::new(File::open(path)?))?;
    decoder
        .into_frames()
        .collect_frames()?
        .into_iter()
        .map(|frame| {
            let (numer, denom) = frame.delay().numer_denom_ms();
            let millis = u64::from(numer) / u64::from(denom.max(1));
            let delay = if millis == 0 {
                FALLBACK_DELAY
            } else {
                Duration::from_millis(millis)
            };
            let bitmap = to_monochrome(&DynamicImage::ImageRgba8(frame.into_buffer()));
            Ok(Frame { bitmap, delay })
        })
        .collect()
}

impl Component for Image {
    fn set_props(&mut self, props: &Props, resources: &Resources) -> Result<(), ConfigurationError> {
        let mut next = Image::from_props(props)?;
        if next.path == self.path {
            next.frames = std::mem::take(&mut self.frames);
            next.loaded_from = self.loaded_from.take();
            next.current = self.current;
            next.elapsed = self.elapsed;
        } else {
            next.load(resources)?;
        }
        *self = next;
        Ok(())
    }

    fn interval(&self) -> Option<Duration> {
        if !self.is_animated() {
            return None;
        }
        self.frames.iter().map(|frame| frame.delay).min()
    }

    fn on_mount(&mut self, ctx: &mut UpdateCtx<'_>) -> Result<(), ConfigurationError> {
        self.load(ctx.resources())?;
        self.current = 0;
        self.elapsed = Duration::ZERO;
        Ok(())
    }

    fn on_interval(&mut self, ctx: &mut UpdateCtx<'_>) {
        let Some(period) = self.interval() else {
            return;
        };
        self.elapsed += period;
        let before = self.current;

        while self.elapsed >= self.frames[self.current].delay {
            self.elapsed -= self.frames[self.current].delay;
            if self.current + 1 < self.frames.len() {
                self.current += 1;
            } else if self.looping {
                self.current = 0;
            } else {
                self.elapsed = Duration::ZERO;
                break;
            }
        }

        if self.current != before {
            ctx.request_render();
        }
    }

    fn render(&self, canvas: &mut Canvas, _ctx: &RenderCtx<'_>) -> Result<(), RenderError> {
        if let Some(frame) = self.frames.get(self.current) {
            canvas.blit(&frame.bitmap, self.x, self.y);
        }
        Ok(())
    }
}

/// Descriptor for an [`Image`] loaded from `path`.
pub fn image(path: impl Into<String>) -> Descriptor {
    Descriptor::new(KIND).prop("path", path.into())
}
