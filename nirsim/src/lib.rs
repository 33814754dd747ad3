//! Near-infrared telescope and detector simulation
//!
//! This crate models the signal and noise chain of a near-infrared imager: a
//! ground-based telescope feeding an avalanche-photodiode detector inside a
//! cryostat. It provides the radiometric noise budget (source signal, dark
//! current, cryostat self-emission, thermal and empirical sky backgrounds,
//! telescope thermal emission) with per-exposure SNR estimates, Airy and
//! Gaussian point-spread-function synthesis, flux-preserving image formation
//! (resampling, frequency-domain convolution, source placement, pointing
//! jitter), and Poisson noise-frame synthesis with master dark/sky
//! calibration frames.
//!
//! Plotting, file I/O and instrument-configuration loading live with the
//! callers; the crate consumes plain configuration values and produces plain
//! numeric arrays.

pub mod constants;
pub mod hardware;
pub mod image_proc;
pub mod photometry;

// Re-exports for easier access
pub use hardware::{CryostatConfig, DetectorConfig, OpticalSystem, TelescopeConfig};
pub use image_proc::airy::{airy_kernel, strehl_ratio, AirySynthesis};
pub use image_proc::noise::{draw_noise_frames, FrameSynthesizer, NoiseFrameSet};
pub use image_proc::{
    add_jitter, compose_psfs_in_quadrature, convolve, diffraction_limited_image, median_combine,
    place_source_at_offset, resample, seeing_limited_image, MasterFrames, SamplingConstraint,
};
pub use photometry::{
    compute_exposure, filter_band, BandId, Emissivity, ExposureRequest, MagnitudeSystem,
    NoiseBudgetResult, SpectralBand,
};
