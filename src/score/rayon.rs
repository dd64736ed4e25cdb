//! Rayon-parallel scoring (feature-gated).
//!
//! Parallelizes the sliding-window pass over window rows. Each worker scores
//! every placement in its rows with the same scalar arithmetic as the
//! sequential pass, so the two produce bit-identical maps.

use crate::image::Grid;
use crate::kernel::Kernel;
use crate::score::{apply_score_gate, scalar, Scoring, SimilarityMap};
use crate::trace::{trace_event, trace_span};
use crate::util::{math, BlobCorrError, BlobCorrResult};
use rayon::prelude::*;

/// Row-parallel equivalent of [`crate::compute_similarity_map`].
pub fn compute_similarity_map_par(
    image: &Grid,
    kernel: &Kernel,
    scoring: Scoring,
) -> BlobCorrResult<SimilarityMap> {
    let _span = trace_span!(
        "similarity_map",
        size = kernel.size(),
        sigma = kernel.param().sigma(),
        parallel = true,
    )
    .entered();

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
    let view = image.view();

    // One result row per window row; None marks a skipped all-zero window.
    let rows: Vec<Vec<Option<f32>>> = (0..=(img_height - size))
        .into_par_iter()
        .map(|top| {
            (0..=(img_width - size))
                .map(|left| {
                    scalar::score_window(
                        view,
                        kernel_values,
                        kernel_norm,
                        left,
                        top,
                        size,
                        scoring,
                    )
                })
                .collect()
        })
        .collect();

    let mut out = Grid::zeros(img_width, img_height)?;
    let mut skipped = 0usize;
    for (top, row) in rows.iter().enumerate() {
        for (left, scored) in row.iter().enumerate() {
            match scored {
                Some(score) => out.set(left + half, top + half, *score),
                None => skipped += 1,
            }
        }
    }

    let windows = (img_height - size + 1) * (img_width - size + 1);
    trace_event!("similarity_scan", windows = windows, skipped = skipped);
    Ok(SimilarityMap::new(apply_score_gate(out), kernel.param()))
}
