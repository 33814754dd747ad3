//! Telescope optical system configuration for near-infrared imaging.
//!
//! Models the warm optical train ahead of the cryostat: collecting aperture,
//! the individual mirror surfaces with their effective areas and
//! emissivities (each one a grey-body emitter in the thermal-background
//! budget), the spider vanes, plate scale and total throughput, plus the
//! per-band empirical sky-brightness and Vega zero-point tables the
//! radiometry needs.
//!
//! The configuration is a read-only parameter bundle: the simulation core
//! receives it whole and never mutates it.

use once_cell::sync::Lazy;

use crate::photometry::band::BandTable;

/// One reflective surface in the optical train, as seen by the detector.
///
/// `area_m2` is the surface's effective emitting area over the beam and
/// `emissivity` its effective grey-body emissivity; both fold in geometry
/// factors, so they are per-instrument calibration numbers rather than raw
/// coating properties.
#[derive(Debug, Clone)]
pub struct MirrorSurface {
    pub label: String,
    pub area_m2: f64,
    pub emissivity: f64,
}

impl MirrorSurface {
    pub fn new(label: impl Into<String>, area_m2: f64, emissivity: f64) -> Self {
        Self {
            label: label.into(),
            area_m2,
            emissivity,
        }
    }
}

/// Complete telescope configuration.
#[derive(Debug, Clone)]
pub struct TelescopeConfig {
    /// Telescope model name or identifier
    pub name: String,
    /// Unobstructed collecting area in square meters
    pub collecting_area_m2: f64,
    /// Mirror surfaces contributing grey-body thermal emission, primary first
    pub mirrors: Vec<MirrorSurface>,
    /// Effective emitting area of the spider vanes over the beam
    pub spider_area_m2: f64,
    /// Effective spider emissivity; its complement is the sky-reflection weight
    pub spider_emissivity: f64,
    /// Bulk temperature of the warm optics in kelvin
    pub temperature_k: f64,
    /// Plate scale in arcseconds per meter at the focal plane
    pub plate_scale_as_per_m: f64,
    /// Total optical throughput of the warm train (0.0-1.0)
    pub throughput: f64,
    /// Empirical sky brightness per band, AB mag per square arcsecond
    pub sky_brightness_mag: BandTable,
    /// Vega zero points per band
    pub vega_zero_points: BandTable,
}

impl TelescopeConfig {
    /// The primary mirror entry.
    ///
    /// # Panics
    /// Panics when the mirror table is empty; a telescope without a primary
    /// is a malformed configuration.
    pub fn primary_mirror(&self) -> &MirrorSurface {
        self.mirrors
            .first()
            .expect("telescope configuration has no mirror surfaces")
    }
}

/// Standard telescope models
pub mod models {
    use super::*;

    /// 2.3 m equatorial telescope feeding the NIR imager.
    ///
    /// M3 folds the beam to the Nasmyth focus and reuses the primary's
    /// effective area and emissivity. Vega zero points from Bessell et al.
    /// photometric calibrations for J/H/K.
    pub static TELESCOPE_2_3M: Lazy<TelescopeConfig> = Lazy::new(|| TelescopeConfig {
        name: "2.3m NIR imager".to_string(),
        collecting_area_m2: 4.155,
        mirrors: vec![
            MirrorSurface::new("M1", 4.155, 0.091),
            MirrorSurface::new("M2", 0.42, 0.091),
            MirrorSurface::new("M3", 4.155, 0.091),
        ],
        spider_area_m2: 4.155,
        spider_emissivity: 0.091,
        temperature_k: 273.0,
        plate_scale_as_per_m: 4982.0,
        throughput: 0.77,
        sky_brightness_mag: BandTable {
            j: 16.7,
            h: 14.4,
            k: 13.0,
        },
        vega_zero_points: BandTable {
            j: 49.46953099,
            h: 49.95637318,
            k: 50.47441871,
        },
    });
}
