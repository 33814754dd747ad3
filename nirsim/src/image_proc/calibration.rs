//! Master calibration frames from independent noise realizations.
//!
//! Master dark and dark-plus-sky frames are median combinations of noise
//! frames drawn freshly for the purpose. The frames injected into a science
//! image must never be the same realizations a master is built from, since a
//! real observer cannot calibrate an exposure with its own noise. This module
//! therefore only synthesizes its own stacks via the calibration-tagged seed
//! stream and never accepts a pre-drawn [`NoiseFrameSet`].

use ndarray::{Array2, Array3};

use crate::image_proc::noise::{
    synthesize_noise_frames, FrameSynthesizer, NoiseFrameSet, MASTER_STREAM_TAG,
};
use crate::photometry::noise_budget::NoiseBudgetResult;

/// Master calibration frames for one instrument configuration and exposure.
#[derive(Debug, Clone)]
pub struct MasterFrames {
    /// Median of the total background: dark + sky + cryostat + read noise
    pub dark_and_sky: Array2<f64>,
    /// Median of the total background with the sky contribution removed
    pub dark: Array2<f64>,
}

impl MasterFrames {
    fn from_noise_frames(set: &NoiseFrameSet) -> Self {
        let dark_and_sky = median_combine(&set.total);
        let dark = median_combine(&(&set.total - &set.sky));
        Self { dark_and_sky, dark }
    }
}

/// Pixel-wise median across the frame axis of a stack.
pub fn median_combine(stack: &Array3<f64>) -> Array2<f64> {
    let (frames, height, width) = stack.dim();
    if frames == 0 {
        panic!("Cannot median-combine an empty stack");
    }

    Array2::from_shape_fn((height, width), |(i, j)| {
        let mut values: Vec<f64> = (0..frames).map(|k| stack[[k, i, j]]).collect();
        values.sort_by(f64::total_cmp);
        if frames % 2 == 1 {
            values[frames / 2]
        } else {
            0.5 * (values[frames / 2 - 1] + values[frames / 2])
        }
    })
}

impl FrameSynthesizer {
    /// Build master dark and dark-plus-sky frames from fresh draws.
    ///
    /// The realizations used here come from the calibration-tagged seed
    /// stream and are discarded after combination; they are never shared
    /// with, or reachable by, any science-image synthesis.
    pub fn build_master_frames(
        &mut self,
        budget: &NoiseBudgetResult,
        height_px: usize,
        width_px: usize,
        frame_count: usize,
        avalanche_gain: f64,
    ) -> MasterFrames {
        let seed = self.child_seed(MASTER_STREAM_TAG);
        let set = synthesize_noise_frames(
            budget,
            height_px,
            width_px,
            frame_count,
            avalanche_gain,
            seed,
        );
        MasterFrames::from_noise_frames(&set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::models::NIR_APD_IMAGER;
    use crate::photometry::band::BandId;
    use crate::photometry::emissivity::Emissivity;
    use crate::photometry::magnitude::MagnitudeSystem;
    use crate::photometry::noise_budget::{compute_exposure, ExposureRequest, NoiseBudgetResult};
    use approx::assert_relative_eq;
    use ndarray::{Array3, Axis};

    fn test_budget() -> NoiseBudgetResult {
        let system = NIR_APD_IMAGER.clone();
        let sky = Emissivity::Constant(0.1);
        let request = ExposureRequest::new(BandId::K, 1.0, 19.0, MagnitudeSystem::AB, &sky);
        compute_exposure(&system, &request).unwrap()
    }

    #[test]
    fn test_median_combine_odd() {
        let mut stack = Array3::zeros((3, 2, 2));
        stack.index_axis_mut(Axis(0), 0).fill(1.0);
        stack.index_axis_mut(Axis(0), 1).fill(5.0);
        stack.index_axis_mut(Axis(0), 2).fill(3.0);
        let median = median_combine(&stack);
        for &v in median.iter() {
            assert_relative_eq!(v, 3.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_median_combine_even() {
        let mut stack = Array3::zeros((4, 1, 1));
        for (k, v) in [10.0, 2.0, 4.0, 8.0].iter().enumerate() {
            stack[[k, 0, 0]] = *v;
        }
        let median = median_combine(&stack);
        assert_relative_eq!(median[[0, 0]], 6.0, epsilon = 1e-12);
    }

    #[test]
    #[should_panic]
    fn test_median_combine_empty_panics() {
        let stack = Array3::zeros((0, 2, 2));
        median_combine(&stack);
    }

    #[test]
    fn test_master_levels_track_budget() {
        // With many frames the medians sit near the expected backgrounds.
        let budget = test_budget();
        let gain = 52.0;
        let mut synthesizer = FrameSynthesizer::with_seed(3);
        let masters = synthesizer.build_master_frames(&budget, 16, 16, 201, gain);

        let expected_total = budget.sky.expected
            + budget.dark.expected
            + budget.cryostat.expected
            + budget.read_noise_counts;
        let mean_dark_and_sky = masters.dark_and_sky.mean().unwrap();
        // Median of a skewed Poisson mixture is a biased estimator of the
        // mean, so the tolerance is loose.
        assert_relative_eq!(mean_dark_and_sky, expected_total, max_relative = 0.25);

        // The dark master must sit below the dark-and-sky master.
        assert!(masters.dark.mean().unwrap() < mean_dark_and_sky);
    }

    #[test]
    fn test_masters_independent_of_science_frames() {
        // Same seed, same parameters: the master must not reuse any science
        // realization. The purpose-tagged seed streams keep them apart even
        // on the first call of identically seeded synthesizers.
        let budget = test_budget();
        let gain = 52.0;

        let mut science_synth = FrameSynthesizer::with_seed(42);
        let science = science_synth.synthesize_exposure_noise(&budget, 8, 8, 5, gain);

        let mut master_synth = FrameSynthesizer::with_seed(42);
        let masters = master_synth.build_master_frames(&budget, 8, 8, 5, gain);

        for k in 0..5 {
            let frame = science.total.index_axis(Axis(0), k);
            assert_ne!(
                masters.dark_and_sky, frame,
                "Master frame is bit-identical to science frame {}",
                k
            );
        }
    }

    #[test]
    fn test_master_frames_reproducible() {
        let budget = test_budget();
        let a = FrameSynthesizer::with_seed(9).build_master_frames(&budget, 8, 8, 7, 52.0);
        let b = FrameSynthesizer::with_seed(9).build_master_frames(&budget, 8, 8, 7, 52.0);
        assert_eq!(a.dark_and_sky, b.dark_and_sky);
        assert_eq!(a.dark, b.dark);
    }
}
