//! Error types for blobcorr.

use thiserror::Error;

/// Result alias for blobcorr operations.
pub type BlobCorrResult<T> = std::result::Result<T, BlobCorrError>;

/// Errors raised by blobcorr precondition checks and the image boundary.
///
/// Every variant is raised eagerly at the point of violation; no stage
/// substitutes a default value or retries.
#[derive(Debug, Error, PartialEq)]
pub enum BlobCorrError {
    /// A parameter is outside its documented range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// Why the value was rejected.
        reason: &'static str,
    },
    /// The kernel collapses to zero after zero-mean normalization.
    #[error("degenerate kernel: {reason}")]
    DegenerateKernel {
        /// Why the kernel is unusable.
        reason: &'static str,
    },
    /// The kernel does not fit inside the image, so no window is valid.
    #[error("kernel size {size} exceeds image dimensions {img_width}x{img_height}")]
    KernelTooLarge {
        /// Kernel edge length in pixels.
        size: usize,
        /// Image width in pixels.
        img_width: usize,
        /// Image height in pixels.
        img_height: usize,
    },
    /// Aggregation was called with no similarity maps.
    #[error("no similarity maps to aggregate")]
    EmptyInput,
    /// Aggregation inputs do not share one grid shape.
    #[error("map shape {width}x{height} differs from expected {expected_width}x{expected_height}")]
    ShapeMismatch {
        /// Width of the first map, which fixes the expected shape.
        expected_width: usize,
        /// Height of the first map.
        expected_height: usize,
        /// Offending map width.
        width: usize,
        /// Offending map height.
        height: usize,
    },
    /// A view or grid was constructed with zero or overflowing dimensions.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },
    /// A view stride is smaller than the row width.
    #[error("stride {stride} is smaller than width {width}")]
    InvalidStride {
        /// Row width in elements.
        width: usize,
        /// Stride in elements.
        stride: usize,
    },
    /// The backing buffer is shorter than the view requires.
    #[error("buffer too small: needed {needed} elements, got {got}")]
    BufferTooSmall {
        /// Minimum buffer length for the requested view.
        needed: usize,
        /// Actual buffer length.
        got: usize,
    },
    /// The external image decoder failed; the reason is passed through.
    #[error("image load failed: {reason}")]
    ImageLoad {
        /// Decoder error message.
        reason: String,
    },
}
