//! Scalar reference implementation of the sliding-window scan.

use crate::image::{Grid, ImageView};
use crate::score::Scoring;
use crate::trace::trace_event;
use crate::util::{math, BlobCorrError, BlobCorrResult};
use crate::Kernel;

/// Scores one window with its top-left corner at `(left, top)`.
///
/// Returns `None` for an entirely zero window: such windows are skipped so
/// empty background neither costs inner-product work nor produces spurious
/// scores. For a non-zero window the cosine denominator is never zero.
pub(super) fn score_window(
    image: ImageView<'_, f32>,
    kernel_values: &[f32],
    kernel_norm: f32,
    left: usize,
    top: usize,
    size: usize,
    scoring: Scoring,
) -> Option<f32> {
    let mut dot = 0.0f32;
    let mut sum_sq = 0.0f32;
    let mut any_nonzero = false;

    for ty in 0..size {
        let img_row = image.row(top + ty).expect("row within bounds for scan");
        let base = ty * size;
        for tx in 0..size {
            let value = img_row[left + tx];
            if value != 0.0 {
                any_nonzero = true;
            }
            dot += kernel_values[base + tx] * value;
            sum_sq += value * value;
        }
    }

    if !any_nonzero {
        return None;
    }

    let score = match scoring {
        Scoring::RawCorrelation => dot,
        Scoring::Cosine => (dot / (sum_sq.sqrt() * kernel_norm)).max(0.0),
    };
    Some(score)
}

/// Runs the full sliding-window pass, writing scores at window centers.
///
/// Positions never visited by a window center (the border band of width
/// `size / 2`) and centers of skipped windows stay 0. The output grid has
/// the same shape as the input image.
pub(crate) fn scan(
    image: ImageView<'_, f32>,
    kernel: &Kernel,
    scoring: Scoring,
) -> BlobCorrResult<Grid> {
    let img_width = image.width();
    let img_height = image.height();
    let size = kernel.size();
    if size > img_width || size > img_height {
        return Err(BlobCorrError::KernelTooLarge {
            size,
            img_width,
            img_height,
        });
    }

    let half = size / 2;
    let kernel_values = kernel.values();
    let kernel_norm = math::euclidean_norm(kernel_values);

    let mut out = Grid::zeros(img_width, img_height)?;
    let mut skipped = 0usize;
    for top in 0..=(img_height - size) {
        for left in 0..=(img_width - size) {
            match score_window(image, kernel_values, kernel_norm, left, top, size, scoring) {
                Some(score) => out.set(left + half, top + half, score),
                None => skipped += 1,
            }
        }
    }

    let windows = (img_height - size + 1) * (img_width - size + 1);
    trace_event!("similarity_scan", windows = windows, skipped = skipped);
    Ok(out)
}
