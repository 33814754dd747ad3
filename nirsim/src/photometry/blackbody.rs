//! Blackbody radiometry for thermal self-emission estimates.
//!
//! This module integrates the Planck spectral-radiance law over a wavelength
//! interval, through an étendue (area × solid angle), system efficiency and
//! emissivity, to produce a photon or photo-electron flux. Every thermal
//! background term in the noise budget (cryostat walls, telescope mirrors,
//! spider vanes, cryostat window, atmosphere) is built on this one integral.
//!
//! # Physics
//!
//! The Planck spectral radiance of an emitter at temperature `T` is
//!
//! ```text
//! B(λ, T) = 2hc²/λ⁵ · 1/(exp(hc/λkT) − 1)      [W m⁻³ sr⁻¹]
//! ```
//!
//! Dividing by the photon energy `hc/λ` gives the photon-flux spectral
//! density, which is what a photon-counting detector responds to. The
//! integral
//!
//! ```text
//! Φ = Ω · A · η · ∫ ε(λ) · B(λ,T) · λ/(hc) dλ
//! ```
//!
//! is evaluated with adaptive Simpson quadrature to a configurable relative
//! tolerance. The result is in photons/s when `η` excludes the quantum
//! efficiency and in electrons/s when it includes QE × avalanche gain; the
//! component is unit-agnostic beyond the Planck law.

use thiserror::Error;

use crate::constants::SI;
use crate::photometry::emissivity::Emissivity;

/// Errors that can occur during a radiometric integration
#[derive(Debug, Error)]
pub enum RadiometryError {
    #[error("Invalid wavelength interval {min_m}..{max_m}: lower bound must be below upper")]
    InvalidRange { min_m: f64, max_m: f64 },

    #[error(
        "Integration did not converge: best estimate {partial} with error estimate {error_estimate}"
    )]
    NonConvergent {
        /// Best-effort value of the integral; not converged, do not use
        /// without acknowledging the attached error estimate.
        partial: f64,
        error_estimate: f64,
    },
}

/// Controls for the adaptive quadrature
#[derive(Debug, Clone, Copy)]
pub struct IntegrationOptions {
    /// Relative error target for the integral
    pub rel_tolerance: f64,
    /// Maximum interval-halving depth before giving up
    pub max_depth: u32,
}

impl Default for IntegrationOptions {
    fn default() -> Self {
        Self {
            rel_tolerance: 1e-8,
            max_depth: 48,
        }
    }
}

/// Planck spectral radiance B(λ, T) in W m⁻³ sr⁻¹.
///
/// Returns 0.0 at non-positive wavelengths and deep in the Wien tail where
/// the exponential overflows; both limits are physical.
pub fn spectral_radiance(wavelength_m: f64, temperature_k: f64) -> f64 {
    if wavelength_m <= 0.0 || temperature_k <= 0.0 {
        return 0.0;
    }

    let hc = SI::PLANCK_CONSTANT * SI::SPEED_OF_LIGHT;
    let x = hc / (wavelength_m * SI::BOLTZMANN * temperature_k);
    let denom = x.exp() - 1.0;
    if !denom.is_finite() || denom <= 0.0 {
        return 0.0;
    }

    2.0 * SI::PLANCK_CONSTANT * SI::SPEED_OF_LIGHT * SI::SPEED_OF_LIGHT
        / wavelength_m.powi(5)
        / denom
}

/// Photon-flux spectral density: B(λ, T) divided by the photon energy.
fn photon_radiance(wavelength_m: f64, temperature_k: f64) -> f64 {
    let hc = SI::PLANCK_CONSTANT * SI::SPEED_OF_LIGHT;
    spectral_radiance(wavelength_m, temperature_k) * wavelength_m / hc
}

/// Integrate thermal photon flux through an optical system.
///
/// # Arguments
/// * `temperature_k` - Emitter temperature
/// * `wavelength_min_m` / `wavelength_max_m` - Integration interval in meters
/// * `solid_angle_sr` - Solid angle subtended by the emitter on the pupil
/// * `area_m2` - Collecting area of the pupil
/// * `emissivity` - Grey-body scalar or tabulated curve
/// * `efficiency` - System efficiency; include QE × gain for electrons/s
///
/// # Returns
/// The integrated flux, in photons/s or electrons/s depending on what the
/// caller folded into `efficiency`.
pub fn integrated_flux(
    temperature_k: f64,
    wavelength_min_m: f64,
    wavelength_max_m: f64,
    solid_angle_sr: f64,
    area_m2: f64,
    emissivity: &Emissivity,
    efficiency: f64,
) -> Result<f64, RadiometryError> {
    integrated_flux_with(
        temperature_k,
        wavelength_min_m,
        wavelength_max_m,
        solid_angle_sr,
        area_m2,
        emissivity,
        efficiency,
        &IntegrationOptions::default(),
    )
}

/// [`integrated_flux`] with explicit quadrature controls.
#[allow(clippy::too_many_arguments)]
pub fn integrated_flux_with(
    temperature_k: f64,
    wavelength_min_m: f64,
    wavelength_max_m: f64,
    solid_angle_sr: f64,
    area_m2: f64,
    emissivity: &Emissivity,
    efficiency: f64,
    options: &IntegrationOptions,
) -> Result<f64, RadiometryError> {
    if wavelength_min_m >= wavelength_max_m {
        return Err(RadiometryError::InvalidRange {
            min_m: wavelength_min_m,
            max_m: wavelength_max_m,
        });
    }

    let etendue = solid_angle_sr * area_m2 * efficiency;

    // Dispatch on the emissivity form once, not per sample: a grey body
    // factors out of the integral entirely.
    let (raw, scale) = match emissivity {
        Emissivity::Constant(eps) => {
            let result = adaptive_simpson(
                &|wl| photon_radiance(wl, temperature_k),
                wavelength_min_m,
                wavelength_max_m,
                options,
            );
            (result, etendue * eps)
        }
        Emissivity::Tabulated { .. } => {
            let result = adaptive_simpson(
                &|wl| photon_radiance(wl, temperature_k) * emissivity.at(wl),
                wavelength_min_m,
                wavelength_max_m,
                options,
            );
            (result, etendue)
        }
    };

    match raw {
        Ok(value) => Ok(value * scale),
        Err((partial, error_estimate)) => Err(RadiometryError::NonConvergent {
            partial: partial * scale,
            error_estimate: error_estimate * scale,
        }),
    }
}

/// Simpson's rule over [a, b] given endpoint and midpoint samples.
fn simpson(a: f64, b: f64, fa: f64, fm: f64, fb: f64) -> f64 {
    (b - a) / 6.0 * (fa + 4.0 * fm + fb)
}

/// Adaptive Simpson quadrature with Richardson error control.
///
/// Returns `Ok(value)` when every subinterval met the tolerance, otherwise
/// `Err((best_estimate, error_estimate))`.
fn adaptive_simpson(
    f: &dyn Fn(f64) -> f64,
    a: f64,
    b: f64,
    options: &IntegrationOptions,
) -> Result<f64, (f64, f64)> {
    let m = 0.5 * (a + b);
    let fa = f(a);
    let fm = f(m);
    let fb = f(b);
    let whole = simpson(a, b, fa, fm, fb);

    // Zero coarse estimate and zero interior samples: the integrand is flat
    // zero over the interval (e.g. deep in the Wien tail).
    if whole == 0.0 && f(0.5 * (a + m)) == 0.0 && f(0.5 * (m + b)) == 0.0 {
        return Ok(0.0);
    }

    // Absolute tolerance derived from the coarse pass, with a floor that
    // keeps the recursion sane when the coarse pass underestimates badly.
    let abs_tol = (options.rel_tolerance * whole.abs()).max(f64::MIN_POSITIVE);

    let mut error_estimate = 0.0;
    let mut converged = true;
    let value = refine(
        f,
        a,
        m,
        b,
        fa,
        fm,
        fb,
        whole,
        abs_tol,
        options.max_depth,
        &mut error_estimate,
        &mut converged,
    );

    if converged {
        Ok(value)
    } else {
        Err((value, error_estimate))
    }
}

#[allow(clippy::too_many_arguments)]
fn refine(
    f: &dyn Fn(f64) -> f64,
    a: f64,
    m: f64,
    b: f64,
    fa: f64,
    fm: f64,
    fb: f64,
    whole: f64,
    tol: f64,
    depth: u32,
    error_estimate: &mut f64,
    converged: &mut bool,
) -> f64 {
    let lm = 0.5 * (a + m);
    let rm = 0.5 * (m + b);
    let flm = f(lm);
    let frm = f(rm);

    let left = simpson(a, m, fa, flm, fm);
    let right = simpson(m, b, fm, frm, fb);
    let delta = left + right - whole;

    // Richardson extrapolation: the two-panel estimate is 15x closer than
    // the one-panel estimate for Simpson's rule.
    if delta.abs() <= 15.0 * tol {
        *error_estimate += delta.abs() / 15.0;
        return left + right + delta / 15.0;
    }

    if depth == 0 {
        *converged = false;
        *error_estimate += delta.abs();
        return left + right + delta / 15.0;
    }

    refine(
        f,
        a,
        lm,
        m,
        fa,
        flm,
        fm,
        left,
        tol / 2.0,
        depth - 1,
        error_estimate,
        converged,
    ) + refine(
        f,
        m,
        rm,
        b,
        fm,
        frm,
        fb,
        right,
        tol / 2.0,
        depth - 1,
        error_estimate,
        converged,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_flux(temperature_k: f64, min_m: f64, max_m: f64) -> f64 {
        integrated_flux(
            temperature_k,
            min_m,
            max_m,
            1.0,
            1.0,
            &Emissivity::Constant(1.0),
            1.0,
        )
        .unwrap()
    }

    #[test]
    fn test_invalid_range() {
        let result = integrated_flux(
            300.0,
            2.0e-6,
            1.0e-6,
            1.0,
            1.0,
            &Emissivity::Constant(1.0),
            1.0,
        );
        assert!(matches!(result, Err(RadiometryError::InvalidRange { .. })));
    }

    #[test]
    fn test_monotonic_in_temperature() {
        // Stefan-Boltzmann consistency: flux grows with temperature for any
        // fixed interval.
        let mut last = 0.0;
        for t in [150.0, 200.0, 273.0, 300.0, 400.0] {
            let flux = unit_flux(t, 1.0e-6, 2.5e-6);
            assert!(
                flux > last,
                "Flux at {} K ({}) not above flux at lower temperature ({})",
                t,
                flux,
                last
            );
            last = flux;
        }
    }

    #[test]
    fn test_monotonic_in_interval_width() {
        let narrow = unit_flux(273.0, 2.0e-6, 2.2e-6);
        let wide = unit_flux(273.0, 2.0e-6, 2.4e-6);
        let wider = unit_flux(273.0, 1.8e-6, 2.4e-6);
        assert!(narrow < wide);
        assert!(wide < wider);
    }

    #[test]
    fn test_zero_lower_bound_is_finite() {
        // The cryostat term integrates from λ = 0; the integrand vanishes
        // there and the quadrature must cope.
        let flux = unit_flux(170.0, 0.0, 2.5e-6);
        assert!(flux.is_finite());
        assert!(flux > 0.0);
    }

    #[test]
    fn test_grey_body_scales_linearly() {
        let full = unit_flux(273.0, 1.0e-6, 2.5e-6);
        let half = integrated_flux(
            273.0,
            1.0e-6,
            2.5e-6,
            1.0,
            1.0,
            &Emissivity::Constant(0.5),
            1.0,
        )
        .unwrap();
        assert_relative_eq!(half, full * 0.5, max_relative = 1e-10);
    }

    #[test]
    fn test_tabulated_matches_constant() {
        // A flat table must agree with the equivalent grey body.
        let table = Emissivity::from_table(vec![0.5e-6, 3.0e-6], vec![0.7, 0.7]).unwrap();
        let tabulated = integrated_flux(273.0, 1.0e-6, 2.5e-6, 1.0, 1.0, &table, 1.0).unwrap();
        let grey = integrated_flux(
            273.0,
            1.0e-6,
            2.5e-6,
            1.0,
            1.0,
            &Emissivity::Constant(0.7),
            1.0,
        )
        .unwrap();
        assert_relative_eq!(tabulated, grey, max_relative = 1e-7);
    }

    #[test]
    fn test_etendue_scaling() {
        let base = unit_flux(273.0, 1.0e-6, 2.5e-6);
        let scaled = integrated_flux(
            273.0,
            1.0e-6,
            2.5e-6,
            2.0,
            3.0,
            &Emissivity::Constant(1.0),
            0.5,
        )
        .unwrap();
        assert_relative_eq!(scaled, base * 3.0, max_relative = 1e-10);
    }

    #[test]
    fn test_wien_displacement_sanity() {
        // At 273 K the spectral radiance peaks near 10.6 um; radiance at the
        // peak must dominate radiance far down the Wien side.
        let peak = spectral_radiance(10.6e-6, 273.0);
        let tail = spectral_radiance(2.0e-6, 273.0);
        assert!(peak > tail * 1e3);
    }

    #[test]
    fn test_deep_wien_tail_is_zero() {
        // Far below the thermal peak the exponential overflows; the radiance
        // must cleanly evaluate to zero rather than NaN.
        assert_eq!(spectral_radiance(0.1e-6, 80.0), 0.0);
        assert_eq!(unit_flux(80.0, 1.0e-8, 2.0e-8), 0.0);
    }
}
