//! Convenience helpers for loading images via the `image` crate.
//!
//! Available when the `image-io` feature is enabled. Decoded pixels are
//! single-channel grayscale rescaled from `[0, 255]` to `[0, 1]`, the range
//! the core operates in.

use crate::image::Grid;
use crate::util::{BlobCorrError, BlobCorrResult};
use std::path::Path;

/// Converts a grayscale image buffer into a `[0, 1]`-normalized grid.
pub fn grid_from_gray_image(img: &image::GrayImage) -> BlobCorrResult<Grid> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    let data = img.as_raw().iter().map(|&v| v as f32 / 255.0).collect();
    Grid::new(data, width, height)
}

/// Converts any decoded image to grayscale and normalizes it.
pub fn grid_from_dynamic_image(img: &image::DynamicImage) -> BlobCorrResult<Grid> {
    let gray = img.to_luma8();
    grid_from_gray_image(&gray)
}

/// Loads an image from disk as a `[0, 1]`-normalized grayscale grid.
pub fn load_normalized_gray<P: AsRef<Path>>(path: P) -> BlobCorrResult<Grid> {
    let img = image::open(path).map_err(|err| BlobCorrError::ImageLoad {
        reason: err.to_string(),
    })?;
    grid_from_dynamic_image(&img)
}
