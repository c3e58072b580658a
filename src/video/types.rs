use std::fmt;

use image::{ImageBuffer, Rgba, RgbaImage, RgbImage};
use serde::{Deserialize, Serialize};

use crate::error::FrameError;

/// Bytes per RGBA pixel
pub const CHANNELS: usize = 4;

/// Width and height of a frame in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
}

impl Geometry {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of pixels covered by this geometry
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Length of an RGBA buffer with this geometry
    pub fn byte_len(&self) -> usize {
        self.pixel_count() * CHANNELS
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Represents a single video frame
///
/// A thin wrapper around an RGBA image buffer. Effects mutate it in place and
/// never change its geometry; the frame loop reuses one instance for every
/// frame so the backing allocation survives across frames.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    buffer: RgbaImage,
}

impl Frame {
    /// Create a new frame from an RGBA image buffer
    pub fn new(buffer: RgbaImage) -> Self {
        Self { buffer }
    }

    /// Create a new frame with the given dimensions filled with transparent black
    pub fn new_blank(width: u32, height: u32) -> Self {
        Self {
            buffer: ImageBuffer::new(width, height),
        }
    }

    /// Create a new frame with the given dimensions filled with the specified color
    pub fn new_filled(width: u32, height: u32, color: [u8; 4]) -> Self {
        let buffer = ImageBuffer::from_pixel(width, height, Rgba(color));
        Self { buffer }
    }

    /// Create a frame from raw RGBA bytes
    pub fn from_rgba_bytes(width: u32, height: u32, data: Vec<u8>) -> Result<Self, FrameError> {
        let expected = Geometry::new(width, height).byte_len();
        let actual = data.len();
        ImageBuffer::from_raw(width, height, data)
            .map(|buffer| Self { buffer })
            .ok_or(FrameError::DimensionMismatch {
                width,
                height,
                expected,
                actual,
            })
    }

    /// Get the width of the frame
    #[inline]
    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    /// Get the height of the frame
    #[inline]
    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    #[inline]
    pub fn geometry(&self) -> Geometry {
        Geometry::new(self.width(), self.height())
    }

    /// True when the frame holds no pixels
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Get a pixel at the given coordinates (returns RGBA array)
    ///
    /// Coordinates must be inside the frame.
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.buffer.get_pixel(x, y).0
    }

    /// Get a pixel with edge replication: out-of-range coordinates are clamped
    /// to the nearest border pixel. An empty frame reads as transparent black.
    #[inline]
    pub fn get_pixel_clamped(&self, x: i64, y: i64) -> [u8; 4] {
        if self.is_empty() {
            return [0; 4];
        }
        let cx = x.clamp(0, self.width() as i64 - 1) as u32;
        let cy = y.clamp(0, self.height() as i64 - 1) as u32;
        self.get_pixel(cx, cy)
    }

    /// Get a mutable reference to a pixel at the given coordinates
    #[inline]
    pub fn get_pixel_mut(&mut self, x: u32, y: u32) -> &mut [u8] {
        &mut self.buffer.get_pixel_mut(x, y).0
    }

    /// Set a pixel at the given coordinates
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 4]) {
        self.buffer.put_pixel(x, y, Rgba(color));
    }

    /// Flat RGBA bytes, row-major
    #[inline]
    pub fn as_raw(&self) -> &[u8] {
        self.buffer.as_raw()
    }

    /// Mutable flat RGBA bytes, row-major
    #[inline]
    pub fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }

    /// Get the underlying image buffer
    pub fn as_image(&self) -> &RgbaImage {
        &self.buffer
    }

    /// Change the geometry, keeping the allocation when it is large enough.
    ///
    /// Pixel contents are unspecified afterwards unless the geometry was
    /// already equal, in which case this is a no-op.
    pub fn reshape(&mut self, width: u32, height: u32) {
        if self.width() == width && self.height() == height {
            return;
        }
        let mut raw = std::mem::replace(&mut self.buffer, RgbaImage::new(0, 0)).into_raw();
        raw.resize(Geometry::new(width, height).byte_len(), 0);
        self.buffer = ImageBuffer::from_raw(width, height, raw)
            .unwrap_or_else(|| RgbaImage::new(width, height));
    }

    /// Overwrite this frame with the contents of `other`, reusing the allocation
    pub fn copy_from(&mut self, other: &Frame) {
        self.reshape(other.width(), other.height());
        self.as_raw_mut().copy_from_slice(other.as_raw());
    }

    /// Overwrite this frame with packed RGB bytes (alpha becomes opaque)
    pub fn write_rgb(&mut self, width: u32, height: u32, rgb: &[u8]) -> Result<(), FrameError> {
        let geometry = Geometry::new(width, height);
        if rgb.len() != geometry.pixel_count() * 3 {
            return Err(FrameError::DimensionMismatch {
                width,
                height,
                expected: geometry.pixel_count() * 3,
                actual: rgb.len(),
            });
        }

        self.reshape(width, height);
        for (dst, src) in self.as_raw_mut().chunks_exact_mut(CHANNELS).zip(rgb.chunks_exact(3)) {
            dst[..3].copy_from_slice(src);
            dst[3] = 255;
        }
        Ok(())
    }

    /// Drop the alpha channel, e.g. for JPEG encoding
    pub fn to_rgb_image(&self) -> RgbImage {
        ImageBuffer::from_fn(self.width(), self.height(), |x, y| {
            let [r, g, b, _] = self.get_pixel(x, y);
            image::Rgb([r, g, b])
        })
    }

    /// Save the frame as a PNG file
    pub fn save_png<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), FrameError> {
        self.buffer.save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }
}

/// Reusable working memory for effects that need a second buffer.
///
/// Owned by whoever drives the effects (normally the frame loop). Buffers only
/// grow, so after the first frame no effect allocates.
#[derive(Debug, Default)]
pub struct Scratch {
    bytes: Vec<u8>,
    floats: Vec<f32>,
    sums: Vec<u64>,
}

impl Scratch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the frame's current bytes
    pub fn snapshot(&mut self, frame: &Frame) -> &[u8] {
        self.bytes.clear();
        self.bytes.extend_from_slice(frame.as_raw());
        &self.bytes
    }

    /// Float working buffer of exactly `len` elements (contents unspecified)
    pub fn floats(&mut self, len: usize) -> &mut [f32] {
        self.floats.resize(len, 0.0);
        &mut self.floats
    }

    /// Integer accumulator buffer of exactly `len` elements (contents unspecified)
    pub fn sums(&mut self, len: usize) -> &mut [u64] {
        self.sums.resize(len, 0);
        &mut self.sums
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgba_bytes_rejects_wrong_length() {
        let result = Frame::from_rgba_bytes(2, 2, vec![0; 15]);
        assert!(matches!(
            result,
            Err(FrameError::DimensionMismatch { expected: 16, actual: 15, .. })
        ));

        let frame = Frame::from_rgba_bytes(2, 2, vec![7; 16]).unwrap();
        assert_eq!(frame.get_pixel(1, 1), [7, 7, 7, 7]);
    }

    #[test]
    fn test_clamped_reads_replicate_edges() {
        let mut frame = Frame::new_filled(3, 2, [0, 0, 0, 255]);
        frame.set_pixel(0, 0, [10, 20, 30, 255]);
        frame.set_pixel(2, 1, [40, 50, 60, 255]);

        assert_eq!(frame.get_pixel_clamped(-5, -1), [10, 20, 30, 255]);
        assert_eq!(frame.get_pixel_clamped(9, 9), [40, 50, 60, 255]);
    }

    #[test]
    fn test_clamped_read_of_empty_frame() {
        let frame = Frame::new_blank(0, 0);
        assert_eq!(frame.get_pixel_clamped(0, 0), [0, 0, 0, 0]);
        assert_eq!(frame.get_pixel_clamped(-3, 7), [0, 0, 0, 0]);
    }

    #[test]
    fn test_copy_from_reuses_allocation() {
        let source = Frame::new_filled(8, 8, [1, 2, 3, 4]);
        let mut target = Frame::new_blank(8, 8);
        let before = target.as_raw().as_ptr();

        target.copy_from(&source);

        assert_eq!(target, source);
        assert_eq!(before, target.as_raw().as_ptr());
    }

    #[test]
    fn test_write_rgb_sets_opaque_alpha() {
        let mut frame = Frame::new_blank(1, 1);
        frame.write_rgb(2, 1, &[1, 2, 3, 4, 5, 6]).unwrap();

        assert_eq!(frame.geometry(), Geometry::new(2, 1));
        assert_eq!(frame.as_raw(), &[1, 2, 3, 255, 4, 5, 6, 255]);
        assert!(frame.write_rgb(2, 2, &[0; 6]).is_err());
    }

    #[test]
    fn test_scratch_snapshot_matches_frame() {
        let frame = Frame::new_filled(4, 3, [9, 8, 7, 6]);
        let mut scratch = Scratch::new();
        assert_eq!(scratch.snapshot(&frame), frame.as_raw());
        assert_eq!(scratch.floats(12).len(), 12);
        assert_eq!(scratch.sums(5).len(), 5);
    }
}
