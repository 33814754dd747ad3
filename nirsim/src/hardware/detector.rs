//! Near-infrared avalanche photodiode detector configuration

use once_cell::sync::Lazy;

/// Detector configuration for an electron-avalanche photodiode array.
///
/// Noise parameters are quoted at unity avalanche gain; the simulation
/// applies `avalanche_gain` where the signal chain multiplies it in.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Detector model name or identifier
    pub name: String,
    /// Array width in pixels
    pub width_px: usize,
    /// Array height in pixels
    pub height_px: usize,
    /// Pixel pitch in meters
    pub pixel_pitch_m: f64,
    /// Quantum efficiency (0.0-1.0), flat over the science bands
    pub qe: f64,
    /// Avalanche multiplication gain
    pub avalanche_gain: f64,
    /// Dark current in electrons/pixel/second at the operating temperature
    pub dark_current_e_s: f64,
    /// Read noise RMS in electrons
    pub read_noise_e: f64,
    /// Long-wavelength cutoff in meters
    pub cutoff_wavelength_m: f64,
    /// Worst-case cutoff in meters for cryostat design margins
    pub cutoff_wavelength_worst_m: f64,
}

impl DetectorConfig {
    /// Light-sensitive area of one pixel in square meters
    pub fn pixel_area_m2(&self) -> f64 {
        self.pixel_pitch_m * self.pixel_pitch_m
    }
}

/// Standard detector models
pub mod models {
    use super::*;

    /// HgCdTe e-APD array, 320x256 with 24 um pixels.
    pub static APD_320X256: Lazy<DetectorConfig> = Lazy::new(|| DetectorConfig {
        name: "HgCdTe e-APD 320x256".to_string(),
        width_px: 320,
        height_px: 256,
        pixel_pitch_m: 24.0e-6,
        qe: 0.8,
        avalanche_gain: 52.0,
        dark_current_e_s: 0.03,
        read_noise_e: 9.0,
        cutoff_wavelength_m: 2.5e-6,
        cutoff_wavelength_worst_m: 3.3e-6,
    });
}
