//! Pipeline orchestration: filter, score per kernel, aggregate.
//!
//! The pipeline is thin control flow over the numerical stages. It owns the
//! call-order contract (filter first, then one scoring pass per kernel
//! parameter in caller order, then aggregation) and the diagnostics
//! boundary; it does not catch errors from any stage.

use crate::aggregate::{aggregate, AggregatedMap, Reduction};
use crate::filter::{filter_by_intensity, validate_filter_intensity};
use crate::image::Grid;
use crate::kernel::{Kernel, KernelParam};
use crate::score::{compute_similarity_map, Scoring, SimilarityMap};
use crate::trace::trace_span;
use crate::util::{BlobCorrError, BlobCorrResult};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Sink for intermediate grids, rendered outside the numerical core.
///
/// The orchestrator hands each stage's output to the sink together with a
/// descriptive title. Sinks never influence control flow or results; the
/// unit type is the built-in no-op sink.
pub trait DiagnosticSink {
    /// Receives one intermediate grid.
    fn show(&mut self, title: &str, grid: &Grid);
}

impl DiagnosticSink for () {
    fn show(&mut self, _title: &str, _grid: &Grid) {}
}

/// Pipeline configuration, validated once at [`Pipeline::new`].
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Adaptive intensity gate fraction in `(0, 1]`.
    pub filter_intensity: f32,
    /// Kernel scales to score, in aggregation order.
    pub kernel_params: Vec<KernelParam>,
    /// Window scoring strategy.
    pub scoring: Scoring,
    /// Reduction across the per-kernel similarity maps.
    pub reduction: Reduction,
    /// Score kernels concurrently (requires the `rayon` feature).
    pub parallel: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            filter_intensity: 0.1,
            kernel_params: Vec::new(),
            scoring: Scoring::default(),
            reduction: Reduction::default(),
            parallel: false,
        }
    }
}

/// Orchestrator wiring the stages for one image and a list of kernel scales.
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Creates a pipeline, rejecting malformed configuration up front.
    ///
    /// Kernel parameters are already validated by [`KernelParam::new`]; this
    /// checks the remaining surface: the filter intensity range and that at
    /// least one kernel scale is present.
    pub fn new(config: PipelineConfig) -> BlobCorrResult<Self> {
        validate_filter_intensity(config.filter_intensity)?;
        if config.kernel_params.is_empty() {
            return Err(BlobCorrError::InvalidParameter {
                name: "kernel_params",
                reason: "must contain at least one kernel",
            });
        }
        Ok(Self { config })
    }

    /// Returns the validated configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Loads a grayscale image from disk and runs the pipeline on it.
    #[cfg(feature = "image-io")]
    pub fn run<P: AsRef<std::path::Path>>(&self, path: P) -> BlobCorrResult<AggregatedMap> {
        let image = crate::image::io::load_normalized_gray(path)?;
        self.run_image(&image)
    }

    /// Runs the pipeline on a `[0, 1]`-normalized grayscale grid.
    pub fn run_image(&self, image: &Grid) -> BlobCorrResult<AggregatedMap> {
        self.run_image_with(image, &mut ())
    }

    /// Runs the pipeline, handing each stage's output to `sink`.
    pub fn run_image_with<S: DiagnosticSink>(
        &self,
        image: &Grid,
        sink: &mut S,
    ) -> BlobCorrResult<AggregatedMap> {
        let _span = trace_span!(
            "pipeline",
            width = image.width(),
            height = image.height(),
            kernels = self.config.kernel_params.len(),
        )
        .entered();

        let filtered = filter_by_intensity(image, self.config.filter_intensity)?;
        sink.show("filtered image", &filtered);

        let maps = self.score_all(&filtered)?;
        for map in &maps {
            let params = map.params();
            sink.show(
                &format!(
                    "similarity map (size {}, sigma {})",
                    params.size(),
                    params.sigma()
                ),
                map.map(),
            );
        }

        let aggregated = aggregate(maps, self.config.reduction)?;
        sink.show("aggregated map", aggregated.map());
        Ok(aggregated)
    }

    /// Scores every kernel scale in caller order.
    fn score_all(&self, filtered: &Grid) -> BlobCorrResult<Vec<SimilarityMap>> {
        #[cfg(feature = "rayon")]
        if self.config.parallel {
            return self.score_all_par(filtered);
        }

        let mut maps = Vec::with_capacity(self.config.kernel_params.len());
        for &param in &self.config.kernel_params {
            let kernel = Kernel::generate(param)?;
            maps.push(compute_similarity_map(filtered, &kernel, self.config.scoring)?);
        }
        Ok(maps)
    }

    /// Scores kernels concurrently; the collected order still matches the
    /// caller-supplied kernel order regardless of completion order.
    #[cfg(feature = "rayon")]
    fn score_all_par(&self, filtered: &Grid) -> BlobCorrResult<Vec<SimilarityMap>> {
        let params = &self.config.kernel_params;
        if params.len() == 1 {
            // A single kernel cannot fan out; parallelize its rows instead.
            let kernel = Kernel::generate(params[0])?;
            let map =
                crate::score::rayon::compute_similarity_map_par(filtered, &kernel, self.config.scoring)?;
            return Ok(vec![map]);
        }

        params
            .par_iter()
            .map(|&param| {
                let kernel = Kernel::generate(param)?;
                compute_similarity_map(filtered, &kernel, self.config.scoring)
            })
            .collect()
    }
}
