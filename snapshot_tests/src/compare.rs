use crate::{Result, SnapshotError};
use image::{GrayImage, Rgba, RgbaImage};
use image_compare::Algorithm;
use std::path::Path;

/// Result of comparing two images
pub struct CompareResult {
    /// Similarity score from 0.0 to 1.0
    pub similarity: f64,
    /// Number of pixels that differ
    pub changed_pixels: usize,
}

/// Compare two frames using SSIM plus an exact pixel count
pub fn compare_images(reference: &GrayImage, captured: &GrayImage) -> Result<CompareResult> {
    if reference.dimensions() != captured.dimensions() {
        return Err(SnapshotError::Compare(format!(
            "Image dimensions don't match: reference {:?} vs captured {:?}",
            reference.dimensions(),
            captured.dimensions()
        )));
    }

    let result = image_compare::gray_similarity_structure(&Algorithm::MSSIMSimple, reference, captured)
        .map_err(|e| SnapshotError::Compare(format!("SSIM comparison failed: {}", e)))?;

    let changed_pixels = reference
        .pixels()
        .zip(captured.pixels())
        .filter(|(a, b)| a != b)
        .count();

    Ok(CompareResult {
        similarity: result.score,
        changed_pixels,
    })
}

/// Write an image highlighting differences between two frames
pub fn generate_diff_image(reference: &GrayImage, captured: &GrayImage, output: &Path) -> Result<()> {
    let (width, height) = reference.dimensions();
    let mut diff_img = RgbaImage::new(width, height);

    for (x, y, ref_pixel) in reference.enumerate_pixels() {
        let cap_pixel = captured.get_pixel(x, y);
        let color = match (ref_pixel[0] != 0, cap_pixel[0] != 0) {
            // Missing from the capture
            (true, false) => Rgba([255, 0, 0, 255]),
            // New in the capture
            (false, true) => Rgba([0, 255, 0, 255]),
            (true, true) => Rgba([85, 85, 85, 255]),
            (false, false) => Rgba([0, 0, 0, 255]),
        };
        diff_img.put_pixel(x, y, color);
    }

    diff_img.save(output)?;
    Ok(())
}
