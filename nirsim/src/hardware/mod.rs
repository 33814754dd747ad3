//! Hardware configuration for the telescope-cryostat-detector chain

pub mod cryostat;
pub mod detector;
pub mod telescope;

pub use cryostat::CryostatConfig;
pub use detector::DetectorConfig;
pub use telescope::{MirrorSurface, TelescopeConfig};

use once_cell::sync::Lazy;

use crate::constants::arcsec_to_rad;

/// The complete optical system: telescope, detector and cryostat.
///
/// Supplied whole by the caller and treated as read-only by every
/// computation in the crate.
#[derive(Debug, Clone)]
pub struct OpticalSystem {
    pub telescope: TelescopeConfig,
    pub detector: DetectorConfig,
    pub cryostat: CryostatConfig,
}

impl OpticalSystem {
    /// Plate scale in arcseconds per pixel
    pub fn plate_scale_as_per_px(&self) -> f64 {
        self.telescope.plate_scale_as_per_m * self.detector.pixel_pitch_m
    }

    /// Solid angle subtended by one pixel on the sky, in steradians
    pub fn pixel_solid_angle_sr(&self) -> f64 {
        let plate_scale_rad = arcsec_to_rad(self.plate_scale_as_per_px());
        plate_scale_rad * plate_scale_rad
    }

    /// Throughput from the top of the atmosphere to the detector surface:
    /// warm optics times the cryostat window.
    pub fn total_throughput(&self) -> f64 {
        self.telescope.throughput * self.cryostat.window_transmission
    }
}

/// Standard instrument models
pub mod models {
    use super::*;

    /// The 2.3 m telescope with the e-APD imager in its cryostat.
    pub static NIR_APD_IMAGER: Lazy<OpticalSystem> = Lazy::new(|| OpticalSystem {
        telescope: telescope::models::TELESCOPE_2_3M.clone(),
        detector: detector::models::APD_320X256.clone(),
        cryostat: cryostat::models::APD_CRYOSTAT.clone(),
    });
}
