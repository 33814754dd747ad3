//! Cryostat configuration for the cooled detector housing

use once_cell::sync::Lazy;

/// Cryostat configuration.
///
/// The detector sees the cryostat walls over `enclosure_solid_angle_sr` and
/// the warm world through a window with transmission `window_transmission`;
/// the window itself is a grey body at the cryostat temperature with
/// emissivity `window_emissivity`.
#[derive(Debug, Clone)]
pub struct CryostatConfig {
    /// Cold-head temperature in kelvin
    pub temperature_k: f64,
    /// Window transmission (0.0-1.0)
    pub window_transmission: f64,
    /// Window grey-body emissivity
    pub window_emissivity: f64,
    /// Solid angle of the enclosure walls seen by a pixel, in steradians
    pub enclosure_solid_angle_sr: f64,
    /// Emissivity of the enclosure walls
    pub wall_emissivity: f64,
}

/// Standard cryostat models
pub mod models {
    use super::*;

    /// LN2-backed cryostat holding the APD array at 85 K.
    pub static APD_CRYOSTAT: Lazy<CryostatConfig> = Lazy::new(|| CryostatConfig {
        temperature_k: 85.0,
        window_transmission: 0.98,
        window_emissivity: 0.02,
        enclosure_solid_angle_sr: 2.0 * std::f64::consts::PI,
        wall_emissivity: 1.0,
    });
}
