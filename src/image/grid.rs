//! Owned contiguous `f32` grids.

use crate::image::ImageView;
use crate::util::{math, BlobCorrError, BlobCorrResult};

/// Owned contiguous 2D buffer of `f32` values in row-major order.
///
/// Grids carry both images (intensities in `[0, 1]`) and similarity maps.
/// Constructors validate dimensions against the buffer length, so a `Grid`
/// is always internally consistent.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    data: Vec<f32>,
    width: usize,
    height: usize,
}

impl Grid {
    /// Creates a grid from a contiguous row-major buffer.
    pub fn new(data: Vec<f32>, width: usize, height: usize) -> BlobCorrResult<Self> {
        if width == 0 || height == 0 {
            return Err(BlobCorrError::InvalidDimensions { width, height });
        }
        let needed = width
            .checked_mul(height)
            .ok_or(BlobCorrError::InvalidDimensions { width, height })?;
        if data.len() < needed {
            return Err(BlobCorrError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(BlobCorrError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Creates an all-zero grid.
    pub fn zeros(width: usize, height: usize) -> BlobCorrResult<Self> {
        if width == 0 || height == 0 {
            return Err(BlobCorrError::InvalidDimensions { width, height });
        }
        let len = width
            .checked_mul(height)
            .ok_or(BlobCorrError::InvalidDimensions { width, height })?;
        Ok(Self {
            data: vec![0.0; len],
            width,
            height,
        })
    }

    /// Copies a borrowed view (dropping any row padding) into an owned grid.
    pub fn from_view(view: ImageView<'_, f32>) -> BlobCorrResult<Self> {
        let width = view.width();
        let height = view.height();
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            let row = view.row(y).ok_or(BlobCorrError::BufferTooSmall {
                needed: y * view.stride() + width,
                got: view.as_slice().len(),
            })?;
            data.extend_from_slice(row);
        }
        Self::new(data, width, height)
    }

    /// Returns the grid width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the grid height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the backing row-major slice.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Returns a borrowed view of the grid.
    pub fn view(&self) -> ImageView<'_, f32> {
        ImageView::from_slice(&self.data, self.width, self.height)
            .expect("grid dimensions validated at construction")
    }

    /// Returns the value at `(x, y)`, panicking out of bounds.
    pub fn at(&self, x: usize, y: usize) -> f32 {
        assert!(x < self.width && y < self.height, "grid index out of bounds");
        self.data[y * self.width + x]
    }

    pub(crate) fn set(&mut self, x: usize, y: usize, value: f32) {
        debug_assert!(x < self.width && y < self.height);
        self.data[y * self.width + x] = value;
    }

    /// Returns the largest value in the grid.
    pub fn max_value(&self) -> f32 {
        math::max_value(&self.data)
    }

    /// Returns a new grid keeping values `>= threshold` and zeroing the rest.
    ///
    /// The comparison is inclusive: a value exactly equal to the threshold
    /// survives the gate. Surviving values are copied through unchanged, so
    /// every output cell is either 0 or exactly its input value.
    pub fn retain_at_least(&self, threshold: f32) -> Self {
        let data = self
            .data
            .iter()
            .map(|&v| if v >= threshold { v } else { 0.0 })
            .collect();
        Self {
            data,
            width: self.width,
            height: self.height,
        }
    }
}
