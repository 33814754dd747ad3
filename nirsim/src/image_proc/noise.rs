//! Poisson noise-frame synthesis from a computed noise budget.
//!
//! Turns the expected counts of a [`NoiseBudgetResult`] into stacks of
//! integer-valued noise realizations, one stack per contributor, with the
//! avalanche-gain plumbing of the real signal chain: shot-noise contributors
//! are drawn at unity gain and then multiplied, read noise is injected after
//! the gain stage and is never gain-scaled.
//!
//! Frames produced here are meant to be added to simulated science images.
//! Master calibration frames must come from an independent synthesis (see
//! [`crate::image_proc::calibration`]); the [`FrameSynthesizer`] derives a
//! fresh child seed for every call, tagged by purpose, so science and
//! calibration draws can never share a realization even under a fixed seed.

use ndarray::{Array2, Array3, Axis};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rand_distr::{Distribution, Poisson};
use rayon::prelude::*;

use crate::photometry::noise_budget::NoiseBudgetResult;

/// Per-contributor noise-frame stacks for one simulated exposure.
///
/// All stacks have shape (frames, height, width) and hold integer-valued
/// draws. Single use: add to exactly one science image, then discard.
#[derive(Debug, Clone)]
pub struct NoiseFrameSet {
    /// Combined sky background (includes telescope emission per the budget)
    pub sky: Array3<f64>,
    pub dark: Array3<f64>,
    pub cryo: Array3<f64>,
    /// Read noise, injected after the gain stage
    pub read: Array3<f64>,
    /// Sum of every contributor at its proper gain stage
    pub total: Array3<f64>,
    /// Gain-multiplied shot-noise contributors only
    pub gain_multiplied: Array3<f64>,
    /// The shot-noise sum referred back to unity gain
    pub unity_gain: Array3<f64>,
    /// Contributors added after the gain stage (read noise)
    pub post_gain: Array3<f64>,
}

/// Draw independent Poisson-distributed noise frames.
///
/// Each of the `frame_count` frames is an independent realization with the
/// same spatially uniform expected count per pixel. Every call produces
/// fresh draws; nothing is cached or reused.
///
/// # Arguments
/// * `height_px` / `width_px` - Frame dimensions
/// * `expected_count` - Poisson mean per pixel; non-positive means zero frames
/// * `frame_count` - Number of independent frames to draw
/// * `rng_seed` - Optional seed for reproducible draws
pub fn draw_noise_frames(
    height_px: usize,
    width_px: usize,
    expected_count: f64,
    frame_count: usize,
    rng_seed: Option<u64>,
) -> Array3<f64> {
    let seed = rng_seed.unwrap_or_else(|| rand::rng().next_u64());
    let mut seeder = StdRng::seed_from_u64(seed);

    // One child seed per frame keeps the per-frame draws independent while
    // letting the frames fill in parallel.
    let frame_seeds: Vec<u64> = (0..frame_count).map(|_| seeder.next_u64()).collect();
    let frames: Vec<Array2<f64>> = frame_seeds
        .into_par_iter()
        .map(|frame_seed| draw_frame(height_px, width_px, expected_count, frame_seed))
        .collect();

    let mut stack = Array3::<f64>::zeros((frame_count, height_px, width_px));
    for (k, frame) in frames.into_iter().enumerate() {
        stack.index_axis_mut(Axis(0), k).assign(&frame);
    }
    stack
}

fn draw_frame(height_px: usize, width_px: usize, expected_count: f64, seed: u64) -> Array2<f64> {
    if expected_count <= 0.0 {
        return Array2::zeros((height_px, width_px));
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let poisson = Poisson::new(expected_count).unwrap();
    Array2::from_shape_fn((height_px, width_px), |_| poisson.sample(&mut rng))
}

/// Seed-stream owner for all stochastic frame synthesis.
///
/// Owning the stream (rather than passing raw seeds around) is what enforces
/// the master-frame invariant: every synthesis call consumes a fresh child
/// seed, so two calls can never replay the same draws.
#[derive(Debug)]
pub struct FrameSynthesizer {
    rng: StdRng,
}

impl FrameSynthesizer {
    /// Synthesizer seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::seed_from_u64(rand::rng().next_u64()),
        }
    }

    /// Synthesizer with a fixed seed for reproducible runs.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub(crate) fn child_seed(&mut self, purpose: u64) -> u64 {
        self.rng.next_u64() ^ purpose
    }

    /// Build the per-contributor noise frames for one simulated exposure.
    ///
    /// # Arguments
    /// * `budget` - Noise budget the expectations come from
    /// * `height_px` / `width_px` - Frame dimensions
    /// * `frame_count` - Number of independent frames per contributor
    /// * `avalanche_gain` - The gain the budget's counts already include;
    ///   shot draws happen at unity gain and are multiplied back up
    pub fn synthesize_exposure_noise(
        &mut self,
        budget: &NoiseBudgetResult,
        height_px: usize,
        width_px: usize,
        frame_count: usize,
        avalanche_gain: f64,
    ) -> NoiseFrameSet {
        let seed = self.child_seed(SCIENCE_STREAM_TAG);
        synthesize_noise_frames(
            budget,
            height_px,
            width_px,
            frame_count,
            avalanche_gain,
            seed,
        )
    }
}

// Purpose tags folded into child seeds; values are arbitrary but must differ.
pub(crate) const SCIENCE_STREAM_TAG: u64 = 0xA5A5_5A5A_0F0F_F0F0;
pub(crate) const MASTER_STREAM_TAG: u64 = 0x0F0F_F0F0_A5A5_5A5A;

/// Core synthesis used by both science and calibration paths.
pub(crate) fn synthesize_noise_frames(
    budget: &NoiseBudgetResult,
    height_px: usize,
    width_px: usize,
    frame_count: usize,
    avalanche_gain: f64,
    seed: u64,
) -> NoiseFrameSet {
    if avalanche_gain <= 0.0 {
        panic!("Avalanche gain must be positive, got {}", avalanche_gain);
    }
    let mut seeder = StdRng::seed_from_u64(seed);

    // Shot-noise contributors drawn at unity gain, then gain-multiplied.
    let sky = draw_noise_frames(
        height_px,
        width_px,
        budget.sky.expected / avalanche_gain,
        frame_count,
        Some(seeder.next_u64()),
    )
    .mapv(|v| v * avalanche_gain);
    let dark = draw_noise_frames(
        height_px,
        width_px,
        budget.dark.expected / avalanche_gain,
        frame_count,
        Some(seeder.next_u64()),
    )
    .mapv(|v| v * avalanche_gain);
    let cryo = draw_noise_frames(
        height_px,
        width_px,
        budget.cryostat.expected / avalanche_gain,
        frame_count,
        Some(seeder.next_u64()),
    )
    .mapv(|v| v * avalanche_gain);

    // Read noise enters after the gain stage, never gain-scaled.
    let read = draw_noise_frames(
        height_px,
        width_px,
        budget.read_noise_counts,
        frame_count,
        Some(seeder.next_u64()),
    );

    let gain_multiplied = &sky + &dark + &cryo;
    let total = &gain_multiplied + &read;
    let unity_gain = gain_multiplied.mapv(|v| v / avalanche_gain);
    let post_gain = read.clone();

    NoiseFrameSet {
        sky,
        dark,
        cryo,
        read,
        total,
        gain_multiplied,
        unity_gain,
        post_gain,
    }
}
