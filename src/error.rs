//! Error types for the component engine.
//!
//! Errors are split by the phase that produces them: building and
//! reconciling the tree (`ConfigurationError`), drawing a frame
//! (`RenderError`) and handing the frame to hardware (`DisplayError`).

use std::path::PathBuf;

use thiserror::Error;

/// The tree could not be built from its descriptors.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("unknown component type `{0}`")]
    UnknownComponent(String),
    #[error("component `{kind}` requires prop `{prop}`")]
    MissingProp { kind: String, prop: String },
    #[error("prop `{prop}` of component `{kind}` must be {expected}")]
    InvalidProp {
        kind: String,
        prop: String,
        expected: &'static str,
    },
    #[error("failed to load image {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// A component failed to produce its part of the frame.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("no font available for size {size} (bold: {bold})")]
    MissingFont { size: u32, bold: bool },
    /// Raised by application components that cannot draw their state
    #[error("component `{kind}` failed to render: {reason}")]
    Leaf { kind: String, reason: String },
}

/// The display sink rejected a frame.
#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Display(#[from] DisplayError),
    #[error("event loop error: {0}")]
    EventLoop(#[from] calloop::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
