//! Sliding-window similarity scoring.
//!
//! The scorer slides a Gaussian kernel over the filtered image and writes a
//! per-position similarity score at each window center, then gates the map
//! against an adaptive fraction of its own maximum. The scalar pass is the
//! reference implementation; the `rayon` feature adds a row-parallel variant
//! with identical arithmetic.

use crate::image::Grid;
use crate::kernel::KernelParam;
use crate::trace::{trace_event, trace_span};
use crate::util::BlobCorrResult;
use crate::Kernel;

pub(crate) mod scalar;

#[cfg(feature = "rayon")]
pub mod rayon;

/// Fraction of the map maximum used by the adaptive score gate.
pub(crate) const SCORE_GATE_FACTOR: f32 = 0.6;

/// Window scoring strategy.
///
/// The raw correlation is the main pipeline path: the plain inner product of
/// the flattened window and kernel, deliberately sensitive to window energy.
/// The cosine strategy normalizes that product by both vector norms and
/// floors it at 0, trading energy sensitivity for a bounded `[0, 1]` score.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Scoring {
    /// Un-normalized inner product of window and kernel.
    #[default]
    RawCorrelation,
    /// `dot / (‖window‖·‖kernel‖)`, floored at 0.
    Cosine,
}

impl Scoring {
    /// Returns a short identifier for logs and serialized output.
    pub fn name(&self) -> &'static str {
        match self {
            Scoring::RawCorrelation => "raw_correlation",
            Scoring::Cosine => "cosine",
        }
    }
}

/// Similarity map produced by scoring one image with one kernel.
///
/// The map has the same shape as the scored image, is non-negative, and is 0
/// everywhere a window was never centered: the border band of width
/// `size / 2` and the centers of windows skipped as all-zero.
#[derive(Clone, Debug, PartialEq)]
pub struct SimilarityMap {
    map: Grid,
    params: KernelParam,
}

impl SimilarityMap {
    pub(crate) fn new(map: Grid, params: KernelParam) -> Self {
        Self { map, params }
    }

    /// Returns the score grid.
    pub fn map(&self) -> &Grid {
        &self.map
    }

    /// Returns the kernel parameters that produced this map.
    pub fn params(&self) -> KernelParam {
        self.params
    }

    /// Consumes the map, returning the score grid.
    pub fn into_grid(self) -> Grid {
        self.map
    }
}

/// Scores `image` with `kernel`, producing a gated similarity map.
///
/// Every `size × size` window fully inside the image is scored unless it is
/// entirely zero; the score lands at the window center. After the pass the
/// map is gated at `0.6 * max(map)` (inclusive). Rejects kernels larger than
/// either image dimension, since no window would fit.
pub fn compute_similarity_map(
    image: &Grid,
    kernel: &Kernel,
    scoring: Scoring,
) -> BlobCorrResult<SimilarityMap> {
    let _span = trace_span!(
        "similarity_map",
        size = kernel.size(),
        sigma = kernel.param().sigma(),
    )
    .entered();

    let raw = scalar::scan(image.view(), kernel, scoring)?;
    let gated = apply_score_gate(raw);
    Ok(SimilarityMap::new(gated, kernel.param()))
}

/// Gates a score map at `SCORE_GATE_FACTOR` of its maximum.
///
/// An all-zero map passes through unchanged (the gate must not divide or
/// fail on empty evidence). A map whose maximum is negative carries no
/// positive evidence at all and is zeroed outright, which keeps similarity
/// maps non-negative for every scoring strategy.
pub(crate) fn apply_score_gate(map: Grid) -> Grid {
    let max = map.max_value();
    if max < 0.0 {
        trace_event!("score_gate", max = max, zeroed = true);
        return Grid::zeros(map.width(), map.height())
            .expect("gate preserves validated dimensions");
    }
    trace_event!("score_gate", max = max, zeroed = false);
    map.retain_at_least(SCORE_GATE_FACTOR * max)
}
