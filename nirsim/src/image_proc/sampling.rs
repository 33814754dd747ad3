//! Constraint solving between focal ratio, pixel pitch and Nyquist factor.
//!
//! The plate sampling of a diffraction-limited PSF is fixed once two of the
//! three quantities {focal ratio, pixel pitch, Nyquist oversampling factor}
//! are chosen; the third follows from
//!
//! ```text
//! F = 2 · N_OS · l_px · deg2rad(206265/3600) / λ
//! ```
//!
//! and its algebraic inverses. N_OS = 2 is critical (Nyquist) sampling.

use thiserror::Error;

/// Errors that can occur solving the sampling constraint
#[derive(Debug, Error)]
pub enum SamplingError {
    #[error(
        "Exactly two of focal ratio, pixel pitch and Nyquist factor must be supplied; got {supplied}"
    )]
    WrongConstraintCount { supplied: usize },

    #[error("Sampling parameters must be positive and finite")]
    NonPositiveParameter,
}

/// The resolved sampling triple.
#[derive(Debug, Clone, Copy)]
pub struct SamplingSolution {
    pub focal_ratio: f64,
    pub pixel_pitch_m: f64,
    pub nyquist_factor: f64,
}

/// Two-of-three sampling constraint; [`solve`](Self::solve) derives the rest.
#[derive(Debug, Clone, Copy, Default)]
pub struct SamplingConstraint {
    pub focal_ratio: Option<f64>,
    pub pixel_pitch_m: Option<f64>,
    pub nyquist_factor: Option<f64>,
}

// deg2rad(206265/3600): the arcsecond-per-radian count read back as degrees.
fn angle_factor() -> f64 {
    (206265.0_f64 / 3600.0).to_radians()
}

impl SamplingConstraint {
    /// Derive the unconstrained member of the triple at a wavelength.
    pub fn solve(&self, wavelength_m: f64) -> Result<SamplingSolution, SamplingError> {
        if wavelength_m <= 0.0 || !wavelength_m.is_finite() {
            return Err(SamplingError::NonPositiveParameter);
        }
        for value in [self.focal_ratio, self.pixel_pitch_m, self.nyquist_factor]
            .into_iter()
            .flatten()
        {
            if value <= 0.0 || !value.is_finite() {
                return Err(SamplingError::NonPositiveParameter);
            }
        }

        let supplied = [
            self.focal_ratio.is_some(),
            self.pixel_pitch_m.is_some(),
            self.nyquist_factor.is_some(),
        ]
        .iter()
        .filter(|&&s| s)
        .count();
        if supplied != 2 {
            return Err(SamplingError::WrongConstraintCount { supplied });
        }

        let k = angle_factor();
        let solution = match (self.focal_ratio, self.pixel_pitch_m, self.nyquist_factor) {
            (None, Some(pitch), Some(n_os)) => SamplingSolution {
                focal_ratio: 2.0 * n_os * pitch * k / wavelength_m,
                pixel_pitch_m: pitch,
                nyquist_factor: n_os,
            },
            (Some(f), None, Some(n_os)) => SamplingSolution {
                focal_ratio: f,
                pixel_pitch_m: wavelength_m * f / (2.0 * n_os * k),
                nyquist_factor: n_os,
            },
            (Some(f), Some(pitch), None) => SamplingSolution {
                focal_ratio: f,
                pixel_pitch_m: pitch,
                nyquist_factor: wavelength_m * f / (2.0 * pitch * k),
            },
            _ => unreachable!("constraint count checked above"),
        };
        Ok(solution)
    }
}
