//! BlobCorr locates Gaussian-blob-shaped features in grayscale images.
//!
//! The crate scores how strongly each local neighborhood of an image
//! resembles a zero-mean, unit-norm Gaussian template, at one or more
//! spatial scales, and reduces the per-scale similarity maps into a single
//! surface. Optional parallelism is available via the `rayon` feature and
//! image decoding via the `image-io` feature.

pub mod aggregate;
pub mod filter;
pub mod image;
pub mod kernel;
pub mod pipeline;
pub mod score;
pub(crate) mod trace;
pub mod util;

pub use aggregate::{aggregate, AggregatedMap, Reduction};
pub use filter::filter_by_intensity;
pub use image::{Grid, ImageView};
pub use kernel::{Kernel, KernelParam};
pub use pipeline::{DiagnosticSink, Pipeline, PipelineConfig};
pub use score::{compute_similarity_map, Scoring, SimilarityMap};
pub use util::{BlobCorrError, BlobCorrResult};

#[cfg(feature = "rayon")]
pub use score::rayon::compute_similarity_map_par;

#[cfg(feature = "image-io")]
pub use image::io::load_normalized_gray;
