//! End-to-end image formation: truth image to simulated exposure.
//!
//! Ties the kernel synthesis, resampling and convolution stages together the
//! way an observation is actually simulated:
//!
//! 1. generate the instrument PSF at a finer-than-detector sampling,
//! 2. resample the truth image up to the PSF's native plate scale,
//! 3. convolve,
//! 4. resample back down to the detector's plate scale.
//!
//! When the truth image already carries the blur of an upstream optical
//! system, the convolution uses the quadrature-composed equivalent PSF
//! rather than the full instrument PSF, so blur is not double-counted.

use log::debug;
use ndarray::Array2;
use thiserror::Error;

use crate::image_proc::airy::{airy_kernel_truncated, DEFAULT_TRUNCATION_RADIUS};
use crate::image_proc::compose::{compose_psfs_in_quadrature, ComposeError};
use crate::image_proc::convolve::convolve;
use crate::image_proc::resample::resample;
use crate::image_proc::sampling::{SamplingConstraint, SamplingError};
use crate::image_proc::seeing::{fwhm_to_sigma, gaussian_seeing_kernel};

/// Errors that can occur in the imaging pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Compose(#[from] ComposeError),

    #[error(transparent)]
    Sampling(#[from] SamplingError),
}

/// Oversampling used when integrating the pipeline's Airy kernels.
const KERNEL_OVERSAMPLING: usize = 8;

/// Simulate diffraction-limited imaging of a truth image.
///
/// # Arguments
/// * `truth` - Input image at the detector plate scale
/// * `pixel_pitch_m` - Detector pixel pitch
/// * `focal_ratio` - Focal ratio of the imaging system
/// * `wavelength_m` - Imaging wavelength
/// * `input_blur` - `(focal_ratio, wavelength_m)` of the optical system the
///   truth image was formed by, when it is not pristine; the additional PSF
///   is composed in quadrature
/// * `psf_nyquist_factor` - Sampling at which the PSF is generated and the
///   convolution performed (4 is a good default)
pub fn diffraction_limited_image(
    truth: &Array2<f64>,
    pixel_pitch_m: f64,
    focal_ratio: f64,
    wavelength_m: f64,
    input_blur: Option<(f64, f64)>,
    psf_nyquist_factor: f64,
) -> Result<Array2<f64>, PipelineError> {
    // The PSF to convolve with: full instrument blur, or the quadrature
    // remainder when the input already carries some.
    let (effective_focal_ratio, effective_wavelength_m) = match input_blur {
        Some((focal_ratio_in, wavelength_in_m)) => {
            let composed = compose_psfs_in_quadrature(
                focal_ratio_in,
                wavelength_in_m,
                focal_ratio,
                wavelength_m,
            )?;
            (composed.focal_ratio, composed.wavelength_m)
        }
        None => (focal_ratio, wavelength_m),
    };

    // Nyquist factor the truth image is already sampled at.
    let input_nyquist = SamplingConstraint {
        focal_ratio: Some(effective_focal_ratio),
        pixel_pitch_m: Some(pixel_pitch_m),
        nyquist_factor: None,
    }
    .solve(effective_wavelength_m)?
    .nyquist_factor;

    // PSF generated at the requested (finer) sampling of the same pixels.
    let psf_sampling = SamplingConstraint {
        focal_ratio: None,
        pixel_pitch_m: Some(pixel_pitch_m),
        nyquist_factor: Some(psf_nyquist_factor),
    }
    .solve(effective_wavelength_m)?;

    debug!(
        "diffraction-limiting: input N_OS {:.2}, psf N_OS {:.2}, effective f/{:.1}",
        input_nyquist, psf_nyquist_factor, effective_focal_ratio
    );

    let psf = airy_kernel_truncated(
        effective_wavelength_m,
        psf_sampling.focal_ratio,
        psf_sampling.pixel_pitch_m,
        psf_nyquist_factor,
        KERNEL_OVERSAMPLING,
        DEFAULT_TRUNCATION_RADIUS,
        1.0,
    );

    // Match plate scales, convolve, and come back down.
    let upsampled = resample(truth, 1.0 / input_nyquist, 1.0 / psf_nyquist_factor);
    let convolved = convolve(&upsampled, &psf.kernel, 1);
    Ok(resample(
        &convolved,
        1.0 / psf_nyquist_factor,
        1.0 / input_nyquist,
    ))
}

/// Simulate seeing-limited imaging with a Gaussian atmosphere.
///
/// # Arguments
/// * `image` - Input image
/// * `seeing_fwhm_as` - Seeing disk FWHM in arcseconds
/// * `plate_scale_as_per_px` - Plate scale of the image
/// * `pad_factor` - Convolution pad margin divisor
pub fn seeing_limited_image(
    image: &Array2<f64>,
    seeing_fwhm_as: f64,
    plate_scale_as_per_px: f64,
    pad_factor: usize,
) -> Array2<f64> {
    let (height, width) = image.dim();
    let sigma_px = fwhm_to_sigma(seeing_fwhm_as) / plate_scale_as_per_px;

    // Truncate the kernel at 4 sigma each side, clamped to the image, odd
    // so the convolution stays centered.
    let span = ((8.0 * sigma_px).ceil() as usize).max(3);
    let clamp_odd = |limit: usize, value: usize| {
        let v = value.min(limit);
        if v % 2 == 0 {
            (v - 1).max(3)
        } else {
            v
        }
    };
    let kernel_h = clamp_odd(height, span);
    let kernel_w = clamp_odd(width, span);

    let kernel = gaussian_seeing_kernel(seeing_fwhm_as, plate_scale_as_per_px, (kernel_h, kernel_w));
    convolve(image, &kernel, pad_factor)
}
