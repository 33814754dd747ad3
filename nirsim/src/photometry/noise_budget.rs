//! Per-exposure noise budget and signal-to-noise estimation.
//!
//! Assembles every electron-flux contributor seen by a pixel (source
//! signal, dark current, cryostat self-emission, thermal and empirical sky
//! backgrounds, telescope thermal emission including the spider vanes) and
//! combines them into expected counts, Poisson standard deviations and an
//! SNR for a chosen band and exposure time.
//!
//! The SNR returned is per pixel. All computations are pure functions of the
//! supplied instrument configuration and request; nothing is cached or
//! mutated.

use log::debug;
use thiserror::Error;

use crate::hardware::OpticalSystem;
use crate::photometry::band::{filter_band, BandId, SkyModel, SpectralBand};
use crate::photometry::blackbody::{integrated_flux, RadiometryError};
use crate::photometry::emissivity::Emissivity;
use crate::photometry::magnitude::{surface_brightness_to_rate, MagnitudeError, MagnitudeSystem};

/// Default effective sky temperature in kelvin
pub const DEFAULT_SKY_TEMPERATURE_K: f64 = 273.0;

/// Errors that can occur while computing a noise budget
#[derive(Debug, Error)]
pub enum BudgetError {
    #[error(transparent)]
    Magnitude(#[from] MagnitudeError),

    #[error(transparent)]
    Radiometry(#[from] RadiometryError),

    #[error("Total noise variance is zero; SNR is undefined")]
    DegenerateNoise,
}

/// Expected electron count for one contributor with its Poisson sigma.
#[derive(Debug, Clone, Copy)]
pub struct NoiseTerm {
    /// Expected electron count over the exposure
    pub expected: f64,
    /// Poisson standard deviation, √expected
    pub sigma: f64,
}

impl NoiseTerm {
    fn from_expected(expected: f64) -> Self {
        Self {
            expected,
            sigma: expected.sqrt(),
        }
    }
}

/// Complete per-exposure noise budget for one band.
///
/// A value object: recomputed on every call, no persisted identity.
#[derive(Debug, Clone)]
pub struct NoiseBudgetResult {
    pub band: BandId,
    pub exposure_s: f64,
    pub surface_brightness: f64,
    pub magnitude_system: MagnitudeSystem,

    pub source: NoiseTerm,
    pub dark: NoiseTerm,
    pub cryostat: NoiseTerm,
    pub sky_thermal: NoiseTerm,
    pub sky_empirical: NoiseTerm,
    pub telescope: NoiseTerm,
    /// Combined sky per the band's [`SkyModel`] policy
    pub sky: NoiseTerm,

    /// Read noise RMS in electrons; independent of exposure time
    pub read_noise_sigma: f64,
    /// Read-noise variance term entering the SNR denominator
    pub read_noise_counts: f64,

    pub snr: f64,
}

/// One exposure request against a configured instrument.
#[derive(Debug, Clone)]
pub struct ExposureRequest<'a> {
    pub band: BandId,
    /// Exposure time in seconds
    pub exposure_s: f64,
    /// Source surface brightness in magnitudes per square arcsecond
    pub surface_brightness: f64,
    pub magnitude_system: MagnitudeSystem,
    /// Atmospheric emissivity curve, ε(λ) = 1 − transmission(λ)
    pub sky_emissivity: &'a Emissivity,
    /// Effective sky temperature in kelvin
    pub sky_temperature_k: f64,
    /// Treat the spider as fully emissive at telescope temperature
    pub worst_case_spider: bool,
}

impl<'a> ExposureRequest<'a> {
    pub fn new(
        band: BandId,
        exposure_s: f64,
        surface_brightness: f64,
        magnitude_system: MagnitudeSystem,
        sky_emissivity: &'a Emissivity,
    ) -> Self {
        Self {
            band,
            exposure_s,
            surface_brightness,
            magnitude_system,
            sky_emissivity,
            sky_temperature_k: DEFAULT_SKY_TEMPERATURE_K,
            worst_case_spider: false,
        }
    }
}

/// Source count rate in electrons/s/pixel for a surface brightness.
pub fn source_rate(
    system: &OpticalSystem,
    band: &SpectralBand,
    surface_brightness: f64,
    magnitude_system: MagnitudeSystem,
) -> Result<f64, MagnitudeError> {
    let vega_zero_point = Some(system.telescope.vega_zero_points.get(band.id));
    surface_brightness_to_rate(
        surface_brightness,
        magnitude_system,
        vega_zero_point,
        band,
        system.plate_scale_as_per_px(),
        system.telescope.collecting_area_m2,
        system.total_throughput(),
        system.detector.qe,
        system.detector.avalanche_gain,
    )
}

/// Empirical sky-background rate from the per-band sky-brightness table.
pub fn empirical_sky_rate(
    system: &OpticalSystem,
    band: &SpectralBand,
) -> Result<f64, MagnitudeError> {
    surface_brightness_to_rate(
        system.telescope.sky_brightness_mag.get(band.id),
        MagnitudeSystem::AB,
        None,
        band,
        system.plate_scale_as_per_px(),
        system.telescope.collecting_area_m2,
        system.total_throughput(),
        system.detector.qe,
        system.detector.avalanche_gain,
    )
}

/// Cryostat wall self-emission rate in electrons/s/pixel.
///
/// Integrates over everything the detector responds to, from zero up to its
/// cutoff wavelength, through the enclosure solid angle onto the pixel area.
pub fn cryostat_emission_rate(system: &OpticalSystem) -> Result<f64, RadiometryError> {
    let detector = &system.detector;
    let cryo = &system.cryostat;
    integrated_flux(
        cryo.temperature_k,
        0.0,
        detector.cutoff_wavelength_m,
        cryo.enclosure_solid_angle_sr,
        detector.pixel_area_m2(),
        &Emissivity::Constant(cryo.wall_emissivity),
        detector.qe * detector.avalanche_gain,
    )
}

/// Thermal sky-emission rate in a band, in electrons/s/pixel.
pub fn sky_thermal_rate(
    system: &OpticalSystem,
    band: &SpectralBand,
    sky_emissivity: &Emissivity,
    sky_temperature_k: f64,
) -> Result<f64, RadiometryError> {
    let raw = integrated_flux(
        sky_temperature_k,
        band.wavelength_min_m,
        band.wavelength_max_m,
        system.pixel_solid_angle_sr(),
        system.telescope.collecting_area_m2,
        sky_emissivity,
        1.0,
    )?;
    // The sky shines through the full warm train and the cryostat window.
    Ok(raw
        * system.detector.avalanche_gain
        * system.detector.qe
        * system.telescope.throughput
        * system.cryostat.window_transmission)
}

/// Telescope thermal-emission rate in a band, in electrons/s/pixel.
///
/// Sums the grey-body contributions of each mirror surface at the telescope
/// temperature, the spider vanes, and the cryostat window. The spider is a
/// weighted pair of grey bodies: `spider_emissivity` at telescope
/// temperature plus its complement reflecting the sky; the worst case forces
/// it fully emissive at telescope temperature. Mirror and spider emission
/// passes through the cryostat window; the window term radiates from inside
/// it, so only QE and gain apply there.
pub fn telescope_thermal_rate(
    system: &OpticalSystem,
    band: &SpectralBand,
    sky_temperature_k: f64,
    worst_case_spider: bool,
) -> Result<f64, RadiometryError> {
    let telescope = &system.telescope;
    let cryo = &system.cryostat;
    let omega_px = system.pixel_solid_angle_sr();
    let (min_m, max_m) = (band.wavelength_min_m, band.wavelength_max_m);

    let mut warm_side = 0.0;
    for mirror in &telescope.mirrors {
        warm_side += integrated_flux(
            telescope.temperature_k,
            min_m,
            max_m,
            omega_px,
            mirror.area_m2,
            &Emissivity::Constant(mirror.emissivity),
            1.0,
        )?;
    }

    let spider = if worst_case_spider {
        integrated_flux(
            telescope.temperature_k,
            min_m,
            max_m,
            omega_px,
            telescope.spider_area_m2,
            &Emissivity::Constant(1.0),
            1.0,
        )?
    } else {
        integrated_flux(
            telescope.temperature_k,
            min_m,
            max_m,
            omega_px,
            telescope.spider_area_m2,
            &Emissivity::Constant(telescope.spider_emissivity),
            1.0,
        )? + integrated_flux(
            sky_temperature_k,
            min_m,
            max_m,
            omega_px,
            telescope.spider_area_m2,
            &Emissivity::Constant(1.0 - telescope.spider_emissivity),
            1.0,
        )?
    };
    warm_side += spider;

    let window = integrated_flux(
        cryo.temperature_k,
        min_m,
        max_m,
        omega_px,
        telescope.primary_mirror().area_m2,
        &Emissivity::Constant(cryo.window_emissivity),
        1.0,
    )?;

    let detector_efficiency = system.detector.avalanche_gain * system.detector.qe;
    Ok(detector_efficiency * cryo.window_transmission * warm_side + detector_efficiency * window)
}

/// Compute the complete per-pixel noise budget for one exposure.
///
/// SNR = N_src / √(N_src + N_dark + N_cryo + N_sky + N_RN²-term), with the
/// combined sky term selected by the band's [`SkyModel`] policy.
pub fn compute_exposure(
    system: &OpticalSystem,
    request: &ExposureRequest,
) -> Result<NoiseBudgetResult, BudgetError> {
    let band = filter_band(request.band);

    let sigma_source = source_rate(
        system,
        band,
        request.surface_brightness,
        request.magnitude_system,
    )?;
    let sigma_dark = system.detector.dark_current_e_s;
    let sigma_cryo = cryostat_emission_rate(system)?;
    let sigma_tel = telescope_thermal_rate(
        system,
        band,
        request.sky_temperature_k,
        request.worst_case_spider,
    )?;
    let sigma_sky_thermal = sky_thermal_rate(
        system,
        band,
        request.sky_emissivity,
        request.sky_temperature_k,
    )?;
    let sigma_sky_empirical = empirical_sky_rate(system, band)?;

    let sigma_sky = match band.sky_model {
        SkyModel::ThermalContinuum => sigma_sky_thermal + sigma_tel,
        SkyModel::EmpiricalOh => sigma_sky_empirical,
    };

    debug!(
        "{} band rates [e-/s/px]: source {:.3e}, dark {:.3e}, cryo {:.3e}, tel {:.3e}, sky {:.3e}",
        band.id, sigma_source, sigma_dark, sigma_cryo, sigma_tel, sigma_sky
    );

    let t = request.exposure_s;
    let source = NoiseTerm::from_expected(sigma_source * t);
    let dark = NoiseTerm::from_expected(sigma_dark * t);
    let cryostat = NoiseTerm::from_expected(sigma_cryo * t);
    let telescope = NoiseTerm::from_expected(sigma_tel * t);
    let sky_thermal = NoiseTerm::from_expected(sigma_sky_thermal * t);
    let sky_empirical = NoiseTerm::from_expected(sigma_sky_empirical * t);
    let sky = NoiseTerm::from_expected(sigma_sky * t);

    let read_noise_sigma = system.detector.read_noise_e;
    let read_noise_counts = read_noise_sigma * read_noise_sigma;

    let variance =
        source.expected + dark.expected + cryostat.expected + sky.expected + read_noise_counts;
    if variance <= 0.0 {
        return Err(BudgetError::DegenerateNoise);
    }
    let snr = source.expected / variance.sqrt();

    Ok(NoiseBudgetResult {
        band: request.band,
        exposure_s: request.exposure_s,
        surface_brightness: request.surface_brightness,
        magnitude_system: request.magnitude_system,
        source,
        dark,
        cryostat,
        sky_thermal,
        sky_empirical,
        telescope,
        sky,
        read_noise_sigma,
        read_noise_counts,
        snr,
    })
}

/// Find the cryostat temperature at which wall self-emission crosses a
/// reference rate (typically the dark current).
///
/// Scans `steps` temperatures over `[t_min_k, t_max_k]` and returns the one
/// whose emission rate is closest to `reference_rate_e_s`. This is the
/// design-margin question a cryostat is specified against: how warm can the
/// housing run before its own glow beats the detector's dark floor.
pub fn cryostat_crossover_temperature(
    system: &OpticalSystem,
    t_min_k: f64,
    t_max_k: f64,
    steps: usize,
    reference_rate_e_s: f64,
) -> Result<f64, RadiometryError> {
    let detector = &system.detector;
    let cryo = &system.cryostat;

    let mut best_t = t_min_k;
    let mut best_gap = f64::INFINITY;
    for i in 0..steps {
        let t = t_min_k + (t_max_k - t_min_k) * i as f64 / (steps - 1).max(1) as f64;
        let rate = integrated_flux(
            t,
            0.0,
            detector.cutoff_wavelength_m,
            cryo.enclosure_solid_angle_sr,
            detector.pixel_area_m2(),
            &Emissivity::Constant(cryo.wall_emissivity),
            detector.qe * detector.avalanche_gain,
        )?;
        let gap = (rate - reference_rate_e_s).abs();
        if gap < best_gap {
            best_gap = gap;
            best_t = t;
        }
    }
    Ok(best_t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::models::NIR_APD_IMAGER;
    use approx::assert_relative_eq;

    fn flat_sky() -> Emissivity {
        // Broadband ~10% emissive atmosphere
        Emissivity::Constant(0.1)
    }

    fn request<'a>(band: BandId, exposure_s: f64, sky: &'a Emissivity) -> ExposureRequest<'a> {
        ExposureRequest::new(band, exposure_s, 19.0, MagnitudeSystem::AB, sky)
    }

    #[test]
    fn test_snr_matches_independent_combination() {
        // Regression scenario: K band, 1 s, 19 AB mag.
        let system = NIR_APD_IMAGER.clone();
        let sky = flat_sky();
        let result = compute_exposure(&system, &request(BandId::K, 1.0, &sky)).unwrap();

        let expected_snr = result.source.expected
            / (result.source.expected
                + result.dark.expected
                + result.cryostat.expected
                + result.sky.expected
                + result.read_noise_counts)
                .sqrt();
        assert_relative_eq!(result.snr, expected_snr, max_relative = 1e-12);
        // Sanity bracket for this instrument class; catches gross unit slips
        assert!(
            result.snr > 0.1 && result.snr < 100.0,
            "K-band 19-mag 1-s SNR {} outside plausible range",
            result.snr
        );
    }

    #[test]
    fn test_k_band_uses_thermal_sky() {
        let system = NIR_APD_IMAGER.clone();
        let sky = flat_sky();
        let result = compute_exposure(&system, &request(BandId::K, 1.0, &sky)).unwrap();
        assert_relative_eq!(
            result.sky.expected,
            result.sky_thermal.expected + result.telescope.expected,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_j_band_uses_empirical_sky() {
        let system = NIR_APD_IMAGER.clone();
        let sky = flat_sky();
        let result = compute_exposure(&system, &request(BandId::J, 1.0, &sky)).unwrap();
        assert_relative_eq!(
            result.sky.expected,
            result.sky_empirical.expected,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_counts_scale_linearly_with_exposure() {
        let system = NIR_APD_IMAGER.clone();
        let sky = flat_sky();
        let one = compute_exposure(&system, &request(BandId::K, 1.0, &sky)).unwrap();
        let ten = compute_exposure(&system, &request(BandId::K, 10.0, &sky)).unwrap();
        assert_relative_eq!(
            ten.source.expected,
            one.source.expected * 10.0,
            max_relative = 1e-10
        );
        assert_relative_eq!(ten.sky.expected, one.sky.expected * 10.0, max_relative = 1e-10);
        // Read noise does not grow with exposure time
        assert_eq!(ten.read_noise_sigma, one.read_noise_sigma);
    }

    #[test]
    fn test_snr_scales_as_sqrt_time_when_source_dominated() {
        // A very bright source swamps every other term, so SNR ~ √N_src ~ √t.
        let system = NIR_APD_IMAGER.clone();
        let sky = flat_sky();
        let mut bright = request(BandId::K, 1.0, &sky);
        bright.surface_brightness = 5.0;
        let one = compute_exposure(&system, &bright).unwrap();
        bright.exposure_s = 100.0;
        let hundred = compute_exposure(&system, &bright).unwrap();
        assert_relative_eq!(hundred.snr / one.snr, 10.0, max_relative = 1e-3);
    }

    #[test]
    fn test_poisson_sigmas() {
        let system = NIR_APD_IMAGER.clone();
        let sky = flat_sky();
        let result = compute_exposure(&system, &request(BandId::H, 2.0, &sky)).unwrap();
        assert_relative_eq!(
            result.source.sigma,
            result.source.expected.sqrt(),
            max_relative = 1e-12
        );
        assert_relative_eq!(
            result.sky.sigma,
            result.sky.expected.sqrt(),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_worst_case_spider_increases_background() {
        // A winter sky colder than the optics: the nominal spider partly
        // reflects that colder sky, so forcing it fully emissive at
        // telescope temperature must raise the thermal background.
        let system = NIR_APD_IMAGER.clone();
        let sky = flat_sky();
        let mut nominal_req = request(BandId::K, 1.0, &sky);
        nominal_req.sky_temperature_k = 253.0;
        let nominal = compute_exposure(&system, &nominal_req).unwrap();

        let mut worst_req = request(BandId::K, 1.0, &sky);
        worst_req.sky_temperature_k = 253.0;
        worst_req.worst_case_spider = true;
        let worst = compute_exposure(&system, &worst_req).unwrap();

        assert!(worst.telescope.expected > nominal.telescope.expected);
    }

    #[test]
    fn test_degenerate_noise_rejected() {
        let mut system = NIR_APD_IMAGER.clone();
        system.detector.read_noise_e = 0.0;
        system.detector.dark_current_e_s = 0.0;
        system.detector.qe = 0.0; // kills source, sky and cryo terms
        let sky = Emissivity::Constant(0.0);
        let result = compute_exposure(&system, &request(BandId::J, 1.0, &sky));
        assert!(matches!(result, Err(BudgetError::DegenerateNoise)));
    }

    #[test]
    fn test_cryostat_emission_negligible_when_cold() {
        // At 85 K with a 2.5 um cutoff the walls contribute essentially
        // nothing next to the dark current.
        let system = NIR_APD_IMAGER.clone();
        let rate = cryostat_emission_rate(&system).unwrap();
        assert!(rate < system.detector.dark_current_e_s);
    }

    #[test]
    fn test_crossover_temperature_monotone_bracket() {
        let system = NIR_APD_IMAGER.clone();
        let t = cryostat_crossover_temperature(
            &system,
            80.0,
            200.0,
            121,
            system.detector.dark_current_e_s,
        )
        .unwrap();
        assert!((80.0..=200.0).contains(&t));
        // The crossover must sit above the operating temperature: the
        // cryostat is specified to keep self-emission under the dark floor.
        assert!(t > system.cryostat.temperature_k);
    }
}
