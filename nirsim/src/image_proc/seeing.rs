//! Gaussian seeing kernels for atmosphere-limited imaging

use ndarray::Array2;

/// Convert a FWHM to the standard deviation of the equivalent Gaussian.
pub fn fwhm_to_sigma(fwhm: f64) -> f64 {
    fwhm / (2.0 * (2.0 * 2.0f64.ln()).sqrt())
}

/// Build a normalized 2-D Gaussian kernel for a given seeing disk.
///
/// # Arguments
/// * `seeing_fwhm_as` - Seeing diameter (FWHM) in arcseconds
/// * `plate_scale_as_per_px` - Plate scale of the target image
/// * `size_px` - Kernel size as (height, width) in pixels
///
/// # Returns
/// Kernel with unit sum, centered on the grid middle.
pub fn gaussian_seeing_kernel(
    seeing_fwhm_as: f64,
    plate_scale_as_per_px: f64,
    size_px: (usize, usize),
) -> Array2<f64> {
    let (height, width) = size_px;
    if seeing_fwhm_as <= 0.0 || plate_scale_as_per_px <= 0.0 || height == 0 || width == 0 {
        panic!(
            "Seeing kernel parameters must be positive: fwhm {}, plate scale {}, size {}x{}",
            seeing_fwhm_as, plate_scale_as_per_px, height, width
        );
    }

    let sigma_as = fwhm_to_sigma(seeing_fwhm_as);
    let denom = 2.0 * sigma_as * sigma_as;

    let mut kernel = Array2::from_shape_fn((height, width), |(i, j)| {
        let y = (i as f64 - (height / 2) as f64) * plate_scale_as_per_px;
        let x = (j as f64 - (width / 2) as f64) * plate_scale_as_per_px;
        (-(x * x + y * y) / denom).exp()
    });

    let sum = kernel.sum();
    kernel.mapv_inplace(|v| v / sum);
    kernel
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fwhm_sigma_relation() {
        assert_relative_eq!(fwhm_to_sigma(2.3548200450309493), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_unit_sum() {
        let kernel = gaussian_seeing_kernel(1.5, 0.12, (65, 65));
        assert_relative_eq!(kernel.sum(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_half_maximum_at_half_fwhm() {
        // Choose the plate scale so the FWHM spans an integer pixel count
        let fwhm_as = 1.2;
        let plate = 0.1;
        let kernel = gaussian_seeing_kernel(fwhm_as, plate, (129, 129));
        let center = kernel[[64, 64]];
        // FWHM/2 = 0.6 as = 6 px from center
        let half = kernel[[64, 70]];
        assert_relative_eq!(half / center, 0.5, epsilon = 1e-10);
    }

    #[test]
    fn test_symmetry() {
        let kernel = gaussian_seeing_kernel(1.0, 0.1, (33, 33));
        assert_relative_eq!(kernel[[16, 10]], kernel[[16, 22]], epsilon = 1e-12);
        assert_relative_eq!(kernel[[10, 16]], kernel[[22, 16]], epsilon = 1e-12);
    }
}
