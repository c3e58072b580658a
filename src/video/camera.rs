//! Hardware camera source backed by `nokhwa`.

use nokhwa::{
    pixel_format::RgbFormat,
    utils::{CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution},
    Camera,
};

use crate::error::CameraError;
use crate::video::source::{StreamConstraints, VideoSource};
use crate::video::{Frame, Geometry};

/// A webcam opened through the platform's native capture backend
pub struct NokhwaSource {
    index: u32,
    camera: Option<Camera>,
    rgb: Vec<u8>,
}

impl NokhwaSource {
    pub fn new(index: u32) -> Self {
        Self {
            index,
            camera: None,
            rgb: Vec::new(),
        }
    }
}

impl VideoSource for NokhwaSource {
    fn open(&mut self, constraints: &StreamConstraints) -> Result<Geometry, CameraError> {
        self.close();

        // Facing mode has no meaning for indexed devices
        tracing::debug!(index = self.index, facing = ?constraints.facing, "Opening camera");

        let request = match constraints.frame_rate {
            Some(fps) => RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
                CameraFormat::new(
                    Resolution::new(constraints.width, constraints.height),
                    FrameFormat::MJPEG,
                    fps,
                ),
            )),
            None => RequestedFormat::new::<RgbFormat>(RequestedFormatType::HighestResolution(
                Resolution::new(constraints.width, constraints.height),
            )),
        };

        let index = self.index;
        let mut camera = Camera::new(CameraIndex::Index(index), request).map_err(|e| {
            CameraError::from_backend_message(
                format!("camera {index}: {e}"),
                CameraError::DeviceNotFound,
            )
        })?;

        camera.open_stream().map_err(|e| {
            CameraError::from_backend_message(format!("open stream: {e}"), CameraError::Aborted)
        })?;

        let resolution = camera.resolution();
        let geometry = Geometry::new(resolution.width(), resolution.height());
        if geometry.pixel_count() == 0 {
            let _ = camera.stop_stream();
            return Err(CameraError::OverConstrained(format!(
                "camera {} negotiated an empty stream",
                self.index
            )));
        }

        tracing::info!(index = self.index, %geometry, "Camera stream opened");
        self.camera = Some(camera);
        Ok(geometry)
    }

    fn read_frame(&mut self, frame: &mut Frame) -> Result<(), CameraError> {
        let camera = self
            .camera
            .as_mut()
            .ok_or_else(|| CameraError::ReadFailed("stream not open".to_string()))?;

        let buffer = camera
            .frame()
            .map_err(|e| CameraError::ReadFailed(format!("fetch frame: {e}")))?;

        let resolution = buffer.resolution();
        let (width, height) = (resolution.width(), resolution.height());
        self.rgb.resize(Geometry::new(width, height).pixel_count() * 3, 0);
        buffer
            .decode_image_to_buffer::<RgbFormat>(&mut self.rgb)
            .map_err(|e| CameraError::ReadFailed(format!("decode RGB: {e}")))?;

        frame
            .write_rgb(width, height, &self.rgb)
            .map_err(|e| CameraError::ReadFailed(e.to_string()))
    }

    fn is_open(&self) -> bool {
        self.camera.is_some()
    }

    fn close(&mut self) {
        if let Some(mut camera) = self.camera.take() {
            if let Err(e) = camera.stop_stream() {
                tracing::warn!(index = self.index, "Failed to stop camera stream: {}", e);
            }
            tracing::info!(index = self.index, "Camera stream closed");
        }
    }
}

impl Drop for NokhwaSource {
    fn drop(&mut self) {
        self.close();
    }
}
