//! Gaussian kernel parameters and generation.
//!
//! A kernel is the template the scorer slides over the image: a separable 2D
//! Gaussian bump, centered by subtracting its mean and scaled to unit
//! Euclidean norm. Zero-mean makes the correlation respond to shape contrast
//! rather than absolute brightness; unit norm keeps scores comparable across
//! kernel sizes and sigmas.

use crate::util::{math, BlobCorrError, BlobCorrResult};

/// Validated (size, sigma) pair describing one Gaussian template.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KernelParam {
    size: usize,
    sigma: f32,
}

impl KernelParam {
    /// Creates a kernel parameter pair.
    ///
    /// `size` is the template edge length in pixels and must be a positive
    /// odd integer so the template has a center pixel. `sigma` is the
    /// Gaussian spread and must be positive and finite.
    pub fn new(size: usize, sigma: f32) -> BlobCorrResult<Self> {
        if size < 1 {
            return Err(BlobCorrError::InvalidParameter {
                name: "size",
                reason: "must be at least 1",
            });
        }
        if size % 2 == 0 {
            return Err(BlobCorrError::InvalidParameter {
                name: "size",
                reason: "must be odd",
            });
        }
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(BlobCorrError::InvalidParameter {
                name: "sigma",
                reason: "must be positive and finite",
            });
        }
        Ok(Self { size, sigma })
    }

    /// Returns the template edge length in pixels.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the Gaussian spread.
    pub fn sigma(&self) -> f32 {
        self.sigma
    }
}

/// Zero-mean, unit-norm separable Gaussian template.
///
/// Built once per [`KernelParam`] and consumed read-only by the scorer.
pub struct Kernel {
    param: KernelParam,
    values: Vec<f32>,
}

impl Kernel {
    /// Generates the normalized kernel for `param`.
    ///
    /// The 1D profile samples the Gaussian density at integer offsets from
    /// the center and is normalized to unit sum; the 2D template is its
    /// outer product with itself, then centered to zero mean and scaled to
    /// unit Euclidean norm over the flattened grid.
    ///
    /// A `size` of 1 centers to a single zero cell and cannot be normalized;
    /// it is rejected as [`BlobCorrError::DegenerateKernel`] rather than
    /// producing NaNs.
    pub fn generate(param: KernelParam) -> BlobCorrResult<Self> {
        let size = param.size();
        let profile = gaussian_profile(size, param.sigma());

        let mut values = Vec::with_capacity(size * size);
        for &gy in &profile {
            for &gx in &profile {
                values.push(gy * gx);
            }
        }

        let mean = values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64;
        for v in &mut values {
            *v -= mean as f32;
        }

        let norm = math::euclidean_norm(&values);
        if norm <= 1e-12 {
            return Err(BlobCorrError::DegenerateKernel {
                reason: "zero norm after centering",
            });
        }
        for v in &mut values {
            *v /= norm;
        }

        Ok(Self { param, values })
    }

    /// Returns the parameters the kernel was generated from.
    pub fn param(&self) -> KernelParam {
        self.param
    }

    /// Returns the template edge length in pixels.
    pub fn size(&self) -> usize {
        self.param.size()
    }

    /// Returns the flattened row-major template values.
    pub fn values(&self) -> &[f32] {
        &self.values
    }
}

/// Samples a unit-sum 1D Gaussian of length `size` centered at `(size-1)/2`.
fn gaussian_profile(size: usize, sigma: f32) -> Vec<f32> {
    let center = (size - 1) as f32 / 2.0;
    let sigma2 = sigma as f64 * sigma as f64;

    let mut profile = Vec::with_capacity(size);
    let mut sum = 0.0f64;
    for i in 0..size {
        let x = (i as f32 - center) as f64;
        let g = (-(x * x) / (2.0 * sigma2)).exp();
        sum += g;
        profile.push(g);
    }
    profile.into_iter().map(|g| (g / sum) as f32).collect()
}

#[cfg(test)]
mod tests {
    use super::{gaussian_profile, Kernel, KernelParam};
    use crate::util::BlobCorrError;

    #[test]
    fn param_rejects_out_of_range_values() {
        assert!(matches!(
            KernelParam::new(0, 1.0),
            Err(BlobCorrError::InvalidParameter { name: "size", .. })
        ));
        assert!(matches!(
            KernelParam::new(4, 1.0),
            Err(BlobCorrError::InvalidParameter { name: "size", .. })
        ));
        assert!(matches!(
            KernelParam::new(3, 0.0),
            Err(BlobCorrError::InvalidParameter { name: "sigma", .. })
        ));
        assert!(matches!(
            KernelParam::new(3, f32::NAN),
            Err(BlobCorrError::InvalidParameter { name: "sigma", .. })
        ));
    }

    #[test]
    fn profile_sums_to_one_and_is_symmetric() {
        let profile = gaussian_profile(7, 1.3);
        let sum: f32 = profile.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        for i in 0..3 {
            assert!((profile[i] - profile[6 - i]).abs() < 1e-6);
        }
        assert!(profile[3] > profile[2]);
    }

    #[test]
    fn generated_kernel_is_zero_mean_unit_norm() {
        let kernel = Kernel::generate(KernelParam::new(5, 1.0).unwrap()).unwrap();
        let mean: f32 = kernel.values().iter().sum::<f32>() / 25.0;
        assert!(mean.abs() < 1e-6);
        let norm: f32 = kernel.values().iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn unit_size_kernel_is_degenerate() {
        let err = Kernel::generate(KernelParam::new(1, 0.5).unwrap())
            .err()
            .unwrap();
        assert_eq!(
            err,
            BlobCorrError::DegenerateKernel {
                reason: "zero norm after centering",
            }
        );
    }
}
