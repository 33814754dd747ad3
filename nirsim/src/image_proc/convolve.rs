//! Frequency-domain convolution with wrap-safe padding.
//!
//! Discrete FFT convolution is circular; without padding, kernel tails wrap
//! around the image edges and contaminate the opposite side. `convolve`
//! therefore zero-pads the image symmetrically (odd dimensions get the extra
//! row/column on one side), performs the linear convolution in the frequency
//! domain, and crops back to the original footprint. The `pad_factor`
//! controls the margin as a fraction of the image size: 1 pads by half the
//! image on each side, 2 by a quarter, and so on. The margin must exceed the
//! kernel's effective half-width for the cropped region to stay clean.

use ndarray::{s, Array2};
use num_traits::Zero;
use rustfft::{num_complex::Complex64, FftPlanner};

/// Convolve an image with a kernel, preserving the image footprint.
///
/// # Arguments
/// * `image` - Input image
/// * `kernel` - Convolution kernel (any size up to the padded image)
/// * `pad_factor` - Pad margin divisor; pad per side is `dim / pad_factor / 2`
///
/// # Panics
/// Panics when `pad_factor` is zero.
pub fn convolve(image: &Array2<f64>, kernel: &Array2<f64>, pad_factor: usize) -> Array2<f64> {
    if pad_factor == 0 {
        panic!("pad_factor must be at least 1");
    }

    let (height, width) = image.dim();
    let pad_ud = height / pad_factor / 2;
    let pad_lr = width / pad_factor / 2;

    // Odd dimensions get one extra row/column of padding on the far side.
    let padded_h = height + 2 * pad_ud + height % 2;
    let padded_w = width + 2 * pad_lr + width % 2;
    let mut padded = Array2::<f64>::zeros((padded_h, padded_w));
    padded
        .slice_mut(s![pad_ud..pad_ud + height, pad_lr..pad_lr + width])
        .assign(image);

    let convolved = fft_convolve_same(&padded, kernel);

    convolved
        .slice(s![pad_ud..pad_ud + height, pad_lr..pad_lr + width])
        .to_owned()
}

/// Linear convolution via FFT, returning the "same"-sized central region.
pub fn fft_convolve_same(image: &Array2<f64>, kernel: &Array2<f64>) -> Array2<f64> {
    let (ih, iw) = image.dim();
    let (kh, kw) = kernel.dim();

    // Full linear convolution size; FFT at this size has no wrap-around.
    let fh = ih + kh - 1;
    let fw = iw + kw - 1;

    let mut image_freq = embed(image, fh, fw);
    let mut kernel_freq = embed(kernel, fh, fw);

    let mut planner = FftPlanner::new();
    fft2(&mut image_freq, &mut planner, false);
    fft2(&mut kernel_freq, &mut planner, false);

    for (a, b) in image_freq.iter_mut().zip(kernel_freq.iter()) {
        *a *= *b;
    }

    fft2(&mut image_freq, &mut planner, true);

    // rustfft leaves the inverse unnormalized
    let norm = 1.0 / (fh * fw) as f64;
    let offset_h = (kh - 1) / 2;
    let offset_w = (kw - 1) / 2;
    Array2::from_shape_fn((ih, iw), |(i, j)| {
        image_freq[[i + offset_h, j + offset_w]].re * norm
    })
}

/// Zero-embed a real array into a complex array of the given size.
fn embed(data: &Array2<f64>, height: usize, width: usize) -> Array2<Complex64> {
    let mut out = Array2::<Complex64>::zeros((height, width));
    for ((i, j), &v) in data.indexed_iter() {
        out[[i, j]] = Complex64::new(v, 0.0);
    }
    out
}

/// In-place 2-D FFT as a row pass followed by a column pass.
fn fft2(data: &mut Array2<Complex64>, planner: &mut FftPlanner<f64>, inverse: bool) {
    let (height, width) = data.dim();

    let row_fft = if inverse {
        planner.plan_fft_inverse(width)
    } else {
        planner.plan_fft_forward(width)
    };
    for mut row in data.rows_mut() {
        let slice = row
            .as_slice_mut()
            .expect("row-major array rows are contiguous");
        row_fft.process(slice);
    }

    let col_fft = if inverse {
        planner.plan_fft_inverse(height)
    } else {
        planner.plan_fft_forward(height)
    };
    let mut column = vec![Complex64::zero(); height];
    for j in 0..width {
        for i in 0..height {
            column[i] = data[[i, j]];
        }
        col_fft.process(&mut column);
        for i in 0..height {
            data[[i, j]] = column[i];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::arr2;

    fn delta_kernel(size: usize) -> Array2<f64> {
        let mut kernel = Array2::zeros((size, size));
        kernel[[size / 2, size / 2]] = 1.0;
        kernel
    }

    #[test]
    fn test_delta_kernel_identity() {
        let image = Array2::from_shape_fn((12, 9), |(i, j)| (i * 9 + j) as f64);
        let out = convolve(&image, &delta_kernel(3), 1);
        for (a, b) in out.iter().zip(image.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_flux_preserved() {
        // sum(out) == sum(in) * sum(kernel) for a kernel contained in the pad
        let mut image = Array2::zeros((32, 32));
        image[[16, 16]] = 100.0;
        image[[10, 20]] = 50.0;

        let kernel = arr2(&[
            [0.05, 0.1, 0.05],
            [0.10, 0.4, 0.10],
            [0.05, 0.1, 0.05],
        ]);
        let out = convolve(&image, &kernel, 1);
        assert_relative_eq!(
            out.sum(),
            image.sum() * kernel.sum(),
            max_relative = 1e-9
        );
    }

    #[test]
    fn test_odd_dimensions() {
        let image = Array2::from_elem((11, 7), 1.0);
        let out = convolve(&image, &delta_kernel(3), 1);
        assert_eq!(out.dim(), (11, 7));
        assert_relative_eq!(out.sum(), image.sum(), max_relative = 1e-9);
    }

    #[test]
    fn test_shifted_delta_shifts_image() {
        let mut image = Array2::zeros((16, 16));
        image[[8, 8]] = 1.0;

        // Kernel with the impulse one pixel right of center
        let mut kernel = Array2::zeros((3, 3));
        kernel[[1, 2]] = 1.0;

        let out = convolve(&image, &kernel, 1);
        assert_relative_eq!(out[[8, 9]], 1.0, epsilon = 1e-9);
        assert!(out[[8, 8]].abs() < 1e-9);
    }

    #[test]
    fn test_gaussian_blur_spreads_but_preserves() {
        let mut image = Array2::zeros((24, 24));
        image[[12, 12]] = 1000.0;

        let kernel = crate::image_proc::seeing::gaussian_seeing_kernel(0.5, 0.1, (11, 11));
        let out = convolve(&image, &kernel, 1);

        assert!(out[[12, 12]] < 1000.0);
        assert_relative_eq!(out.sum(), 1000.0, max_relative = 1e-6);
    }

    #[test]
    #[should_panic]
    fn test_zero_pad_factor_panics() {
        let image = Array2::zeros((4, 4));
        convolve(&image, &delta_kernel(3), 0);
    }
}
