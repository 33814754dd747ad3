//! PSF composition, source placement and pointing jitter.
//!
//! Utilities that assemble a simulated field: combining optical blurs in
//! quadrature when an image already carries an upstream PSF, dropping a
//! flux-scaled PSF onto a canvas at an angular offset (field stars), and
//! shifting an image by a random or explicit sub-pixel amount to model
//! tip/tilt pointing error.

use ndarray::{s, Array2};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rand_distr::{Distribution, Normal};
use thiserror::Error;

/// Errors that can occur composing or placing PSFs
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error(
        "Target PSF (FWHM {fwhm_out_m} m) is not broader than the input PSF (FWHM {fwhm_in_m} m); a coarser-or-equal target cannot be reached by adding blur"
    )]
    CoarserTarget { fwhm_in_m: f64, fwhm_out_m: f64 },

    #[error("Exactly one of a jitter sigma or an explicit shift must be supplied")]
    JitterSpec,

    #[error(
        "Source at pixel offset ({row_px}, {col_px}) does not fit a {canvas_h}x{canvas_w} canvas"
    )]
    OutOfCanvas {
        row_px: isize,
        col_px: isize,
        canvas_h: usize,
        canvas_w: usize,
    },
}

/// Equivalent optical system whose PSF, convolved onto the input, reaches
/// the target blur.
#[derive(Debug, Clone, Copy)]
pub struct QuadratureComposition {
    pub focal_ratio: f64,
    pub wavelength_m: f64,
    /// FWHM of the additional blur, in meters at unit effective focal length
    pub fwhm_m: f64,
}

/// Combine two diffraction blurs in quadrature.
///
/// When an image was formed by an upstream optical system, convolving it
/// with the downstream PSF directly would double-count blur. Instead the
/// additional PSF satisfies `FWHM'² = FWHM_out² − FWHM_in²` (FWHM ≈ λ·F at
/// unit effective focal length). The returned system keeps the input
/// wavelength and carries the equivalent focal ratio.
pub fn compose_psfs_in_quadrature(
    focal_ratio_in: f64,
    wavelength_in_m: f64,
    focal_ratio_out: f64,
    wavelength_out_m: f64,
) -> Result<QuadratureComposition, ComposeError> {
    let fwhm_in_m = wavelength_in_m * focal_ratio_in;
    let fwhm_out_m = wavelength_out_m * focal_ratio_out;

    if fwhm_out_m <= fwhm_in_m {
        return Err(ComposeError::CoarserTarget {
            fwhm_in_m,
            fwhm_out_m,
        });
    }

    let fwhm_m = (fwhm_out_m * fwhm_out_m - fwhm_in_m * fwhm_in_m).sqrt();
    let wavelength_m = wavelength_in_m;
    Ok(QuadratureComposition {
        focal_ratio: fwhm_m / wavelength_m,
        wavelength_m,
        fwhm_m,
    })
}

/// Place a flux-scaled PSF on a canvas at an angular offset from center.
///
/// # Arguments
/// * `psf` - PSF kernel to place
/// * `flux_scale` - Multiplier taking the kernel to the source's count rate
/// * `offset_as` - (row, col) offset from the canvas center in arcseconds
/// * `plate_scale_as_per_px` - Plate scale of the canvas
/// * `canvas_size` - Output size as (height, width)
pub fn place_source_at_offset(
    psf: &Array2<f64>,
    flux_scale: f64,
    offset_as: (f64, f64),
    plate_scale_as_per_px: f64,
    canvas_size: (usize, usize),
) -> Result<Array2<f64>, ComposeError> {
    let (psf_h, psf_w) = psf.dim();
    let (canvas_h, canvas_w) = canvas_size;

    let row_px = (offset_as.0 / plate_scale_as_per_px).round() as isize;
    let col_px = (offset_as.1 / plate_scale_as_per_px).round() as isize;

    let out_of_canvas = ComposeError::OutOfCanvas {
        row_px,
        col_px,
        canvas_h,
        canvas_w,
    };
    if psf_h > canvas_h || psf_w > canvas_w {
        return Err(out_of_canvas);
    }

    let top = ((canvas_h - psf_h) / 2) as isize + row_px;
    let left = ((canvas_w - psf_w) / 2) as isize + col_px;
    if top < 0
        || left < 0
        || top as usize + psf_h > canvas_h
        || left as usize + psf_w > canvas_w
    {
        return Err(out_of_canvas);
    }

    let mut canvas = Array2::<f64>::zeros((canvas_h, canvas_w));
    let (top, left) = (top as usize, left as usize);
    canvas
        .slice_mut(s![top..top + psf_h, left..left + psf_w])
        .assign(&psf.mapv(|v| v * flux_scale));
    Ok(canvas)
}

/// Shift an image by a sub-pixel tip/tilt offset.
///
/// Exactly one of `sigma_px` (isotropic Gaussian draw, independent per axis)
/// or `shift_px` (explicit (row, col) offset) must be supplied. Returns the
/// shifted image together with the offset actually applied, so callers can
/// replay or undo it.
pub fn add_jitter(
    image: &Array2<f64>,
    sigma_px: Option<f64>,
    shift_px: Option<(f64, f64)>,
    rng_seed: Option<u64>,
) -> Result<(Array2<f64>, (f64, f64)), ComposeError> {
    let shift = match (sigma_px, shift_px) {
        (Some(sigma), None) => {
            if !sigma.is_finite() || sigma < 0.0 {
                return Err(ComposeError::JitterSpec);
            }
            let seed = rng_seed.unwrap_or_else(|| rand::rng().next_u64());
            let mut rng = StdRng::seed_from_u64(seed);
            let normal = Normal::new(0.0, sigma).expect("finite non-negative sigma");
            (normal.sample(&mut rng), normal.sample(&mut rng))
        }
        (None, Some(shift)) => shift,
        _ => return Err(ComposeError::JitterSpec),
    };

    Ok((shift_image(image, shift), shift))
}

/// Bilinear sub-pixel shift with zero fill outside the input.
fn shift_image(image: &Array2<f64>, shift: (f64, f64)) -> Array2<f64> {
    let (dy, dx) = shift;
    Array2::from_shape_fn(image.dim(), |(i, j)| {
        bilinear_sample(image, i as f64 - dy, j as f64 - dx)
    })
}

fn bilinear_sample(image: &Array2<f64>, y: f64, x: f64) -> f64 {
    let (height, width) = image.dim();
    let y0 = y.floor();
    let x0 = x.floor();
    let ty = y - y0;
    let tx = x - x0;

    let mut acc = 0.0;
    for (dy, wy) in [(0, 1.0 - ty), (1, ty)] {
        for (dx, wx) in [(0, 1.0 - tx), (1, tx)] {
            let yy = y0 as isize + dy;
            let xx = x0 as isize + dx;
            if yy >= 0 && xx >= 0 && (yy as usize) < height && (xx as usize) < width {
                acc += wy * wx * image[[yy as usize, xx as usize]];
            }
        }
    }
    acc
}
