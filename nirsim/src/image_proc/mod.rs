//! Image formation and frame synthesis for the simulated detector.
//!
//! Point-spread-function generation, plate-scale resampling, wrap-safe FFT
//! convolution, source placement, pointing jitter, and the Poisson noise /
//! master-calibration frame machinery.

pub mod airy;
pub mod calibration;
pub mod compose;
pub mod convolve;
pub mod noise;
pub mod pipeline;
pub mod resample;
pub mod sampling;
pub mod seeing;

// Re-export key functionality for easier access
pub use airy::{airy_kernel, airy_kernel_truncated, strehl_ratio, AirySynthesis};
pub use calibration::{median_combine, MasterFrames};
pub use compose::{
    add_jitter, compose_psfs_in_quadrature, place_source_at_offset, ComposeError,
    QuadratureComposition,
};
pub use convolve::convolve;
pub use noise::{draw_noise_frames, FrameSynthesizer, NoiseFrameSet};
pub use pipeline::{diffraction_limited_image, seeing_limited_image, PipelineError};
pub use resample::resample;
pub use sampling::{SamplingConstraint, SamplingError, SamplingSolution};
pub use seeing::{fwhm_to_sigma, gaussian_seeing_kernel};
