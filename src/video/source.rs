//! Video sources feeding the frame loop.
//!
//! A [`VideoSource`] hands out one RGBA frame per call, writing into a frame the
//! caller owns so the backing allocation is reused across reads.

use std::path::{Path, PathBuf};

use rand::{rngs::SmallRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::CameraError;
use crate::video::{Frame, Geometry, CHANNELS};

/// Which camera to prefer on devices that have more than one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    #[default]
    User,
    Environment,
}

/// Requested stream shape; sources may deliver a different geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConstraints {
    pub width: u32,
    pub height: u32,
    pub facing: FacingMode,
    /// Ideal frame rate, `None` to let the device decide
    pub frame_rate: Option<u32>,
}

impl StreamConstraints {
    /// Constraints every source is expected to satisfy
    pub fn basic() -> Self {
        Self {
            width: 640,
            height: 480,
            facing: FacingMode::User,
            frame_rate: None,
        }
    }

    pub fn geometry(&self) -> Geometry {
        Geometry::new(self.width, self.height)
    }
}

impl Default for StreamConstraints {
    fn default() -> Self {
        Self {
            frame_rate: Some(30),
            ..Self::basic()
        }
    }
}

/// Trait for video stream implementations
///
/// Implementations are driven from the frame loop thread only.
pub trait VideoSource: Send {
    /// Opens the stream, returning the geometry it will deliver
    fn open(&mut self, constraints: &StreamConstraints) -> Result<Geometry, CameraError>;

    /// Reads the current frame into `frame`, reshaping it when needed
    fn read_frame(&mut self, frame: &mut Frame) -> Result<(), CameraError>;

    /// Checks if the stream is currently open
    fn is_open(&self) -> bool;

    /// Stops the stream and releases the device
    fn close(&mut self);
}

impl<T: VideoSource + ?Sized> VideoSource for Box<T> {
    fn open(&mut self, constraints: &StreamConstraints) -> Result<Geometry, CameraError> {
        (**self).open(constraints)
    }

    fn read_frame(&mut self, frame: &mut Frame) -> Result<(), CameraError> {
        (**self).read_frame(frame)
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// Replays a single decoded image as a stream
pub struct StillImageSource {
    path: PathBuf,
    image: Option<Frame>,
}

impl StillImageSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            image: None,
        }
    }

    /// Source over an already decoded frame
    pub fn from_frame(frame: Frame) -> Self {
        Self {
            path: PathBuf::new(),
            image: Some(frame),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VideoSource for StillImageSource {
    fn open(&mut self, _constraints: &StreamConstraints) -> Result<Geometry, CameraError> {
        if let Some(frame) = &self.image {
            return Ok(frame.geometry());
        }

        if !self.path.is_file() {
            return Err(CameraError::DeviceNotFound(self.path.display().to_string()));
        }

        let decoded = image::open(&self.path)
            .map_err(|e| CameraError::ReadFailed(format!("{}: {}", self.path.display(), e)))?
            .to_rgba8();
        let frame = Frame::new(decoded);
        let geometry = frame.geometry();

        tracing::info!(path = %self.path.display(), %geometry, "Still image source opened");
        self.image = Some(frame);
        Ok(geometry)
    }

    fn read_frame(&mut self, frame: &mut Frame) -> Result<(), CameraError> {
        let image = self
            .image
            .as_ref()
            .ok_or_else(|| CameraError::ReadFailed("stream not open".to_string()))?;
        frame.copy_from(image);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.image.is_some()
    }

    fn close(&mut self) {
        if self.image.take().is_some() {
            tracing::debug!(path = %self.path.display(), "Still image source closed");
        }
    }
}

/// Animated synthetic stream: a slowly cycling hue, moving diagonal stripes
/// and per-pixel sensor grain
pub struct TestPatternSource {
    geometry: Option<Geometry>,
    max_geometry: Option<Geometry>,
    frame_limit: Option<u64>,
    grain: u8,
    seed: u64,
    rng: SmallRng,
    tick: u64,
}

impl TestPatternSource {
    pub fn new() -> Self {
        Self::with_seed(0x5EED)
    }

    /// Deterministic grain for a given seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            geometry: None,
            max_geometry: None,
            frame_limit: None,
            grain: 6,
            seed,
            rng: SmallRng::seed_from_u64(seed),
            tick: 0,
        }
    }

    /// Reject constraints larger than this geometry as over-constrained
    pub fn with_max_geometry(mut self, geometry: Geometry) -> Self {
        self.max_geometry = Some(geometry);
        self
    }

    /// Report the stream as revoked after `frames` reads
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }

    /// Grain amplitude per channel, 0 disables it
    pub fn with_grain(mut self, amplitude: u8) -> Self {
        self.grain = amplitude;
        self
    }

    pub fn frames_read(&self) -> u64 {
        self.tick
    }

    fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [u8; 3] {
        let c = v * s;
        let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
        let m = v - c;

        let (r, g, b) = if h < 60.0 {
            (c, x, 0.0)
        } else if h < 120.0 {
            (x, c, 0.0)
        } else if h < 180.0 {
            (0.0, c, x)
        } else if h < 240.0 {
            (0.0, x, c)
        } else if h < 300.0 {
            (x, 0.0, c)
        } else {
            (c, 0.0, x)
        };

        [
            ((r + m) * 255.0) as u8,
            ((g + m) * 255.0) as u8,
            ((b + m) * 255.0) as u8,
        ]
    }
}

impl Default for TestPatternSource {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoSource for TestPatternSource {
    fn open(&mut self, constraints: &StreamConstraints) -> Result<Geometry, CameraError> {
        let requested = constraints.geometry();
        if requested.pixel_count() == 0 {
            return Err(CameraError::OverConstrained(format!("empty geometry {requested}")));
        }
        if let Some(max) = self.max_geometry {
            if requested.width > max.width || requested.height > max.height {
                return Err(CameraError::OverConstrained(format!(
                    "{requested} exceeds {max}"
                )));
            }
        }

        self.geometry = Some(requested);
        self.rng = SmallRng::seed_from_u64(self.seed);
        self.tick = 0;
        tracing::info!(geometry = %requested, "Test pattern source opened");
        Ok(requested)
    }

    fn read_frame(&mut self, frame: &mut Frame) -> Result<(), CameraError> {
        let geometry = self
            .geometry
            .ok_or_else(|| CameraError::ReadFailed("stream not open".to_string()))?;
        if self.frame_limit.is_some_and(|limit| self.tick >= limit) {
            return Err(CameraError::Revoked);
        }

        let hue = (self.tick as f32 * 2.0) % 360.0;
        let base = Self::hsv_to_rgb(hue, 0.6, 0.8);
        let offset = self.tick as usize;
        let width = geometry.width as usize;
        let grain = self.grain as i16;

        frame.reshape(geometry.width, geometry.height);
        for (index, pixel) in frame.as_raw_mut().chunks_exact_mut(CHANNELS).enumerate() {
            let (x, y) = (index % width, index / width);
            if (x + y + offset) % 20 < 2 {
                pixel.copy_from_slice(&[255, 255, 255, 255]);
                continue;
            }

            for (channel, value) in pixel[..3].iter_mut().zip(base) {
                let noise = if grain > 0 { self.rng.gen_range(-grain..=grain) } else { 0 };
                *channel = (value as i16 + noise).clamp(0, 255) as u8;
            }
            pixel[3] = 255;
        }

        self.tick += 1;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.geometry.is_some()
    }

    fn close(&mut self) {
        if self.geometry.take().is_some() {
            tracing::debug!(frames = self.tick, "Test pattern source closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_lifecycle() {
        let mut source = TestPatternSource::new();
        let mut frame = Frame::new_blank(1, 1);

        assert!(!source.is_open());
        assert!(matches!(
            source.read_frame(&mut frame),
            Err(CameraError::ReadFailed(_))
        ));

        let geometry = source.open(&StreamConstraints::default()).unwrap();
        assert_eq!(geometry, Geometry::new(640, 480));
        assert!(source.is_open());

        source.read_frame(&mut frame).unwrap();
        assert_eq!(frame.geometry(), geometry);
        assert!(frame.as_raw().chunks_exact(CHANNELS).all(|p| p[3] == 255));

        source.close();
        assert!(!source.is_open());
    }

    #[test]
    fn test_pattern_is_deterministic_per_seed() {
        let constraints = StreamConstraints::basic();
        let mut a = TestPatternSource::with_seed(7);
        let mut b = TestPatternSource::with_seed(7);
        a.open(&constraints).unwrap();
        b.open(&constraints).unwrap();

        let mut fa = Frame::new_blank(1, 1);
        let mut fb = Frame::new_blank(1, 1);
        a.read_frame(&mut fa).unwrap();
        b.read_frame(&mut fb).unwrap();
        assert_eq!(fa, fb);
    }

    #[test]
    fn test_pattern_limits() {
        let mut source = TestPatternSource::new()
            .with_max_geometry(Geometry::new(320, 240))
            .with_frame_limit(1);

        assert!(matches!(
            source.open(&StreamConstraints::default()),
            Err(CameraError::OverConstrained(_))
        ));

        let small = StreamConstraints {
            width: 320,
            height: 240,
            ..StreamConstraints::basic()
        };
        source.open(&small).unwrap();

        let mut frame = Frame::new_blank(1, 1);
        source.read_frame(&mut frame).unwrap();
        assert_eq!(source.read_frame(&mut frame), Err(CameraError::Revoked));
    }

    #[test]
    fn test_still_image_replays_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("still.png");
        Frame::new_filled(5, 4, [10, 20, 30, 255]).save_png(&path).unwrap();

        let mut source = StillImageSource::new(&path);
        let geometry = source.open(&StreamConstraints::default()).unwrap();
        assert_eq!(geometry, Geometry::new(5, 4));

        let mut frame = Frame::new_blank(640, 480);
        source.read_frame(&mut frame).unwrap();
        assert_eq!(frame, Frame::new_filled(5, 4, [10, 20, 30, 255]));
    }

    #[test]
    fn test_still_image_missing_file() {
        let mut source = StillImageSource::new("/definitely/not/here.png");
        assert!(matches!(
            source.open(&StreamConstraints::default()),
            Err(CameraError::DeviceNotFound(_))
        ));
    }
}
