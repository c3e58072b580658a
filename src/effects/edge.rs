//! Sobel edge detection.
//!
//! Gradients are computed over a single channel of a row-major RGBA byte
//! slice. Only interior pixels have a full 3×3 neighbourhood; callers leave
//! the 1-pixel border untouched.

use crate::video::CHANNELS;

/// Channel index of red in an RGBA pixel
pub const RED: usize = 0;

/// Sobel gradient classifier
#[derive(Debug, Clone, Copy)]
pub struct SobelDetector {
    threshold: f32,
    channel: usize,
}

impl SobelDetector {
    /// Classifier over the red channel
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            channel: RED,
        }
    }

    /// Use another channel (0 = R, 1 = G, 2 = B, 3 = A)
    pub fn with_channel(mut self, channel: usize) -> Self {
        self.channel = channel.min(CHANNELS - 1);
        self
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Horizontal and vertical gradient at an interior pixel
    ///
    /// `(x, y)` must satisfy `1 <= x < width - 1` and `1 <= y < height - 1`.
    #[inline]
    pub fn gradient(&self, pixels: &[u8], width: usize, x: usize, y: usize) -> (f32, f32) {
        debug_assert!(x >= 1 && y >= 1 && x + 1 < width);
        let at = |dx: isize, dy: isize| -> f32 {
            let px = (x as isize + dx) as usize;
            let py = (y as isize + dy) as usize;
            pixels[(py * width + px) * CHANNELS + self.channel] as f32
        };

        let gx = -at(-1, -1) - 2.0 * at(-1, 0) - at(-1, 1) + at(1, -1) + 2.0 * at(1, 0) + at(1, 1);
        let gy = -at(-1, -1) - 2.0 * at(0, -1) - at(1, -1) + at(-1, 1) + 2.0 * at(0, 1) + at(1, 1);
        (gx, gy)
    }

    /// Gradient magnitude √(Gx² + Gy²) at an interior pixel
    #[inline]
    pub fn magnitude(&self, pixels: &[u8], width: usize, x: usize, y: usize) -> f32 {
        let (gx, gy) = self.gradient(pixels, width, x, y);
        (gx * gx + gy * gy).sqrt()
    }

    /// Whether the interior pixel lies on an edge
    #[inline]
    pub fn is_edge(&self, pixels: &[u8], width: usize, x: usize, y: usize) -> bool {
        self.magnitude(pixels, width, x, y) > self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::Frame;

    #[test]
    fn test_uniform_buffer_has_no_edges() {
        let frame = Frame::new_filled(6, 5, [90, 90, 90, 255]);
        let detector = SobelDetector::new(50.0);

        for y in 1..4 {
            for x in 1..5 {
                assert_eq!(detector.magnitude(frame.as_raw(), 6, x, y), 0.0);
                assert!(!detector.is_edge(frame.as_raw(), 6, x, y));
            }
        }
    }

    #[test]
    fn test_vertical_step_is_an_edge() {
        let mut frame = Frame::new_filled(6, 3, [0, 0, 0, 255]);
        for y in 0..3 {
            for x in 3..6 {
                frame.set_pixel(x, y, [200, 0, 0, 255]);
            }
        }
        let detector = SobelDetector::new(50.0);

        let (gx, gy) = detector.gradient(frame.as_raw(), 6, 2, 1);
        assert_eq!(gx, 800.0);
        assert_eq!(gy, 0.0);
        assert!(detector.is_edge(frame.as_raw(), 6, 2, 1));
        assert!(detector.is_edge(frame.as_raw(), 6, 3, 1));
        assert!(!detector.is_edge(frame.as_raw(), 6, 1, 1));
        assert!(!detector.is_edge(frame.as_raw(), 6, 4, 1));
    }

    #[test]
    fn test_other_channels_are_ignored_by_default() {
        let mut frame = Frame::new_filled(3, 3, [10, 10, 10, 255]);
        frame.set_pixel(2, 1, [10, 255, 255, 255]);
        let detector = SobelDetector::new(50.0);

        assert!(!detector.is_edge(frame.as_raw(), 3, 1, 1));
        assert!(detector.with_channel(1).is_edge(frame.as_raw(), 3, 1, 1));
    }
}
