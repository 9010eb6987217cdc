//! Frame snapshot testing.
//!
//! A [`Scene`] is mounted in a [`miniscreen::Runtime`], driven with buttons
//! and virtual time, and rendered. The frame is compared with
//! `references/<name>.png`. A missing reference fails the test; set
//! `UPDATE_SNAPSHOTS` to write (or rewrite) the references from the
//! current output.

mod compare;
mod render;

pub use compare::{compare_images, generate_diff_image, CompareResult};
pub use render::{render_scene, Scene};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Failed to render scene: {0}")]
    Render(#[from] miniscreen::Error),
    #[error("Failed to compare images: {0}")]
    Compare(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Reference image not found: {0}")]
    ReferenceNotFound(PathBuf),
}

pub type Result<T> = std::result::Result<T, SnapshotError>;

/// Result of a snapshot test
pub struct SnapshotResult {
    /// Whether the test passed (similarity >= threshold)
    pub passed: bool,
    /// The similarity score (0.0 to 1.0)
    pub similarity: f64,
    pub changed_pixels: usize,
    /// Path to the captured frame
    pub captured_path: PathBuf,
    /// Path to the reference image
    pub reference_path: PathBuf,
    /// Path to diff image (if generated on failure)
    pub diff_path: Option<PathBuf>,
    /// The reference was (re)written by this run
    pub updated: bool,
}

/// Get the path to the references directory
pub fn references_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("references")
}

pub fn reference_path(name: &str) -> PathBuf {
    references_dir().join(format!("{}.png", name))
}

/// Get the path to the output directory for test artifacts
pub fn output_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("output")
}

pub fn captured_path(name: &str) -> PathBuf {
    output_dir().join(format!("{}_captured.png", name))
}

pub fn diff_path(name: &str) -> PathBuf {
    output_dir().join(format!("{}_diff.png", name))
}

/// Check if we're in update references mode
pub fn should_update_references() -> bool {
    std::env::var("UPDATE_SNAPSHOTS").is_ok()
}

/// Render `scene` and compare it with its reference.
pub fn run_snapshot(scene: &Scene, similarity_threshold: f64) -> Result<SnapshotResult> {
    std::fs::create_dir_all(output_dir())?;

    let ref_path = reference_path(&scene.name);
    let cap_path = captured_path(&scene.name);

    let captured = render_scene(scene)?;
    captured.save(&cap_path)?;

    if should_update_references() {
        std::fs::create_dir_all(references_dir())?;
        captured.save(&ref_path)?;
        println!("Updated reference: {}", ref_path.display());
        return Ok(SnapshotResult {
            passed: true,
            similarity: 1.0,
            changed_pixels: 0,
            captured_path: cap_path,
            reference_path: ref_path,
            diff_path: None,
            updated: true,
        });
    }

    if !ref_path.exists() {
        return Err(SnapshotError::ReferenceNotFound(ref_path));
    }

    let reference = image::open(&ref_path)?.to_luma8();
    let compare_result = compare_images(&reference, &captured)?;
    let passed = compare_result.similarity >= similarity_threshold;

    let diff = if !passed {
        let diff_file = diff_path(&scene.name);
        generate_diff_image(&reference, &captured, &diff_file)?;
        Some(diff_file)
    } else {
        None
    };

    Ok(SnapshotResult {
        passed,
        similarity: compare_result.similarity,
        changed_pixels: compare_result.changed_pixels,
        captured_path: cap_path,
        reference_path: ref_path,
        diff_path: diff,
        updated: false,
    })
}
