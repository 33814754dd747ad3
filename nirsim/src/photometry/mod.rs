//! Photometry and radiometry models

pub mod band;
pub mod blackbody;
pub mod emissivity;
pub mod magnitude;
pub mod noise_budget;

pub use band::{filter_band, BandId, BandTable, SkyModel, SpectralBand, FILTER_BANDS};
pub use blackbody::{integrated_flux, IntegrationOptions, RadiometryError};
pub use emissivity::Emissivity;
pub use magnitude::MagnitudeSystem;
pub use noise_budget::{compute_exposure, ExposureRequest, NoiseBudgetResult, NoiseTerm};
