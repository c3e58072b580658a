//! Separable Gaussian blur.
//!
//! A 2D Gaussian is the product of two 1D Gaussians, so the blur runs as a
//! horizontal pass into a float intermediate followed by a vertical pass back
//! into the frame: O(r) work per pixel per pass instead of O(r²).
//!
//! Neighbours outside the frame are clamped to the border (edge replication)
//! and every channel, alpha included, is blurred the same way.

use crate::{
    effects::pixel::round_channel,
    video::{Frame, Scratch, CHANNELS},
};

/// Largest supported blur radius
pub const MAX_BLUR_RADIUS: f32 = 16.0;

const MAX_TAPS: usize = 2 * MAX_BLUR_RADIUS as usize + 1;

/// 1D Gaussian weights for offsets `-half..=half`
///
/// Lives on the stack so building one per frame costs no allocation.
#[derive(Debug, Clone, Copy)]
pub struct GaussianKernel {
    weights: [f32; MAX_TAPS],
    len: usize,
}

impl GaussianKernel {
    /// Build the kernel for `radius`
    ///
    /// Offsets span `-ceil(r)..=ceil(r)` with σ = r/2. A radius of zero (or
    /// less) yields the single weight 1.0. Radii above [`MAX_BLUR_RADIUS`]
    /// are clamped.
    pub fn new(radius: f32) -> Self {
        let mut weights = [0.0; MAX_TAPS];

        if radius.is_nan() || radius <= 0.0 {
            weights[0] = 1.0;
            return Self { weights, len: 1 };
        }

        let radius = radius.min(MAX_BLUR_RADIUS);
        let half = radius.ceil() as i32;
        let sigma = radius / 2.0;
        let two_sigma_sq = 2.0 * sigma * sigma;
        let norm = (2.0 * std::f32::consts::PI).sqrt() * sigma;

        for (slot, i) in weights.iter_mut().zip(-half..=half) {
            let i = i as f32;
            *slot = (-(i * i) / two_sigma_sq).exp() / norm;
        }

        Self {
            weights,
            len: (2 * half + 1) as usize,
        }
    }

    /// Weights from offset `-half` to `+half`
    pub fn weights(&self) -> &[f32] {
        &self.weights[..self.len]
    }

    /// Number of taps on each side of the centre
    pub fn half(&self) -> usize {
        self.len / 2
    }

    /// True when convolving with this kernel cannot change a buffer
    pub fn is_identity(&self) -> bool {
        self.len == 1
    }
}

/// Blur `frame` in place with a Gaussian of the given radius
pub fn gaussian_blur(frame: &mut Frame, radius: f32, scratch: &mut Scratch) {
    let kernel = GaussianKernel::new(radius);
    if kernel.is_identity() || frame.is_empty() {
        return;
    }

    let width = frame.width() as usize;
    let height = frame.height() as usize;
    let half = kernel.half() as isize;
    let weights = kernel.weights();
    let weight_sum: f32 = weights.iter().sum();

    let intermediate = scratch.floats(width * height * CHANNELS);

    // Pass 1: rows into the intermediate buffer
    let source = frame.as_raw();
    for y in 0..height {
        let row = y * width;
        for x in 0..width {
            let mut acc = [0.0f32; CHANNELS];
            for (k, &weight) in weights.iter().enumerate() {
                let px = (x as isize + k as isize - half).clamp(0, width as isize - 1) as usize;
                let idx = (row + px) * CHANNELS;
                for (c, sum) in acc.iter_mut().enumerate() {
                    *sum += source[idx + c] as f32 * weight;
                }
            }

            let target = (row + x) * CHANNELS;
            for (c, sum) in acc.iter().enumerate() {
                intermediate[target + c] = sum / weight_sum;
            }
        }
    }

    // Pass 2: columns back into the frame
    let output = frame.as_raw_mut();
    for x in 0..width {
        for y in 0..height {
            let mut acc = [0.0f32; CHANNELS];
            for (k, &weight) in weights.iter().enumerate() {
                let py = (y as isize + k as isize - half).clamp(0, height as isize - 1) as usize;
                let idx = (py * width + x) * CHANNELS;
                for (c, sum) in acc.iter_mut().enumerate() {
                    *sum += intermediate[idx + c] * weight;
                }
            }

            let target = (y * width + x) * CHANNELS;
            for (c, sum) in acc.iter().enumerate() {
                output[target + c] = round_channel(sum / weight_sum);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_shape() {
        let kernel = GaussianKernel::new(1.0);
        assert_eq!(kernel.weights().len(), 3);
        assert_eq!(kernel.half(), 1);
        assert_eq!(kernel.weights()[0], kernel.weights()[2]);
        assert!(kernel.weights()[1] > kernel.weights()[0]);

        // Fractional radii round their reach up
        assert_eq!(GaussianKernel::new(0.5).weights().len(), 3);
        assert_eq!(GaussianKernel::new(2.2).weights().len(), 7);
    }

    #[test]
    fn test_zero_radius_is_identity() {
        let kernel = GaussianKernel::new(0.0);
        assert!(kernel.is_identity());
        assert_eq!(kernel.weights(), &[1.0]);

        let mut frame = Frame::new_blank(3, 3);
        frame.set_pixel(1, 1, [255, 10, 20, 255]);
        let original = frame.clone();

        gaussian_blur(&mut frame, 0.0, &mut Scratch::new());
        assert_eq!(frame, original);
    }

    #[test]
    fn test_uniform_buffer_is_unchanged() {
        let mut frame = Frame::new_filled(9, 7, [37, 128, 201, 180]);
        let original = frame.clone();

        gaussian_blur(&mut frame, 3.0, &mut Scratch::new());
        assert_eq!(frame, original);
    }

    #[test]
    fn test_spreads_single_pixel_symmetrically() {
        let mut frame = Frame::new_filled(5, 5, [0, 0, 0, 255]);
        frame.set_pixel(2, 2, [255, 255, 255, 255]);

        gaussian_blur(&mut frame, 1.0, &mut Scratch::new());

        let centre = frame.get_pixel(2, 2)[0];
        let left = frame.get_pixel(1, 2)[0];
        let right = frame.get_pixel(3, 2)[0];
        let up = frame.get_pixel(2, 1)[0];
        assert!(centre < 255);
        assert!(left > 0);
        assert_eq!(left, right);
        assert_eq!(left, up);
        assert!(centre > left);
        assert_eq!(frame.get_pixel(0, 0)[0], frame.get_pixel(4, 4)[0]);
    }

    #[test]
    fn test_alpha_is_blurred_like_colour() {
        let mut frame = Frame::new_filled(5, 1, [0, 0, 0, 0]);
        frame.set_pixel(2, 0, [200, 200, 200, 200]);

        gaussian_blur(&mut frame, 1.0, &mut Scratch::new());

        for x in 0..5 {
            let [r, _, _, a] = frame.get_pixel(x, 0);
            assert_eq!(r, a);
        }
    }
}
