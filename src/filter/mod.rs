//! Adaptive intensity pre-filtering.

use crate::image::Grid;
use crate::util::{BlobCorrError, BlobCorrResult};

/// Zeroes pixels below an adaptive brightness threshold.
///
/// The threshold is `filter_intensity * max(image)`, so the gate adapts to
/// the brightest content actually present. Pixels at or above the threshold
/// keep their exact value; everything else becomes 0. This is a hard gate
/// that suppresses background before correlation, not a soft weighting.
///
/// `filter_intensity` must lie in `(0, 1]`.
pub fn filter_by_intensity(image: &Grid, filter_intensity: f32) -> BlobCorrResult<Grid> {
    validate_filter_intensity(filter_intensity)?;
    let threshold = filter_intensity * image.max_value();
    Ok(image.retain_at_least(threshold))
}

pub(crate) fn validate_filter_intensity(filter_intensity: f32) -> BlobCorrResult<()> {
    if !(filter_intensity.is_finite() && filter_intensity > 0.0 && filter_intensity <= 1.0) {
        return Err(BlobCorrError::InvalidParameter {
            name: "filter_intensity",
            reason: "must lie in (0, 1]",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::filter_by_intensity;
    use crate::image::Grid;
    use crate::util::BlobCorrError;

    #[test]
    fn keeps_exact_values_or_zero() {
        let image = Grid::new(vec![0.1, 0.3, 0.5, 1.0], 2, 2).unwrap();
        let filtered = filter_by_intensity(&image, 0.5).unwrap();
        assert_eq!(filtered.as_slice(), &[0.0, 0.0, 0.5, 1.0]);
    }

    #[test]
    fn threshold_equality_is_kept() {
        // max = 0.8, intensity 0.5 -> threshold 0.4; the 0.4 pixel survives.
        let image = Grid::new(vec![0.4, 0.8, 0.2, 0.0], 2, 2).unwrap();
        let filtered = filter_by_intensity(&image, 0.5).unwrap();
        assert_eq!(filtered.as_slice(), &[0.4, 0.8, 0.0, 0.0]);
    }

    #[test]
    fn all_zero_image_stays_zero() {
        let image = Grid::zeros(4, 3).unwrap();
        let filtered = filter_by_intensity(&image, 0.2).unwrap();
        assert!(filtered.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn rejects_out_of_range_intensity() {
        let image = Grid::zeros(2, 2).unwrap();
        for bad in [0.0, -0.5, 1.5, f32::NAN] {
            let err = filter_by_intensity(&image, bad).err().unwrap();
            assert_eq!(
                err,
                BlobCorrError::InvalidParameter {
                    name: "filter_intensity",
                    reason: "must lie in (0, 1]",
                }
            );
        }
    }
}
