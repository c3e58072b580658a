use std::sync::Arc;

use chrono::{DateTime, Utc};
use image::codecs::jpeg::JpegEncoder;

use crate::error::CaptureError;
use crate::pipeline::selection::ActiveFilter;
use crate::pipeline::surface::Surface;
use crate::pipeline::upload::{PhotoStore, PhotoUpload, UploadTask};
use crate::video::Frame;

/// Default JPEG quality for captured photos
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// A single snapshot of the presented surface
#[derive(Debug, Clone)]
pub struct CapturedPhoto {
    image: Frame,
    filter_id: String,
    description: Option<String>,
    captured_at: DateTime<Utc>,
}

impl CapturedPhoto {
    pub fn image(&self) -> &Frame {
        &self.image
    }

    pub fn filter_id(&self) -> &str {
        &self.filter_id
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// Drop alpha and encode as JPEG
    pub fn encode_jpeg(&self, quality: u8) -> Result<Vec<u8>, CaptureError> {
        if self.image.is_empty() {
            return Err(CaptureError::EncodingFailed {
                reason: "snapshot has no pixels".to_string(),
            });
        }

        let rgb = self.image.to_rgb_image();
        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100))
            .encode_image(&rgb)
            .map_err(|e| CaptureError::EncodingFailed {
                reason: e.to_string(),
            })?;
        Ok(bytes)
    }

    /// Encode and package for a [`PhotoStore`]
    pub fn into_upload(self, quality: u8) -> Result<PhotoUpload, CaptureError> {
        let image = self.encode_jpeg(quality)?;
        Ok(PhotoUpload {
            image,
            filter_id: self.filter_id,
            description: self.description,
            captured_at: self.captured_at,
        })
    }
}

/// Takes photos of whatever the frame loop last presented
pub struct CaptureController {
    surface: Arc<Surface>,
    selection: Arc<ActiveFilter>,
    jpeg_quality: u8,
}

impl CaptureController {
    pub fn new(surface: Arc<Surface>, selection: Arc<ActiveFilter>) -> Self {
        Self {
            surface,
            selection,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    /// Snapshot the presented surface
    ///
    /// The loop keeps running; the snapshot is taken under the surface lock so
    /// it is always one whole frame, paired with the filter that rendered it.
    /// Blank descriptions are treated as absent.
    pub fn capture(&self, description: Option<&str>) -> Result<CapturedPhoto, CaptureError> {
        let Some((image, rendered_with)) = self.surface.snapshot_with_selection() else {
            // Say which precondition is missing when both are
            return Err(match self.selection.filter_id() {
                None => CaptureError::NoFilterSelected,
                Some(_) => CaptureError::NothingPresented,
            });
        };
        let filter_id = rendered_with
            .filter_id
            .as_deref()
            .map(str::to_string)
            .ok_or(CaptureError::NoFilterSelected)?;

        let description = description
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string);

        tracing::info!(
            filter_id = %filter_id,
            geometry = %image.geometry(),
            "Photo captured"
        );

        Ok(CapturedPhoto {
            image,
            filter_id,
            description,
            captured_at: Utc::now(),
        })
    }

    /// Encode `photo` and start uploading it on the current Tokio runtime
    pub fn submit<S: PhotoStore>(
        &self,
        store: Arc<S>,
        photo: CapturedPhoto,
    ) -> Result<UploadTask, CaptureError> {
        let upload = photo.into_upload(self.jpeg_quality)?;
        Ok(UploadTask::spawn(store, upload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{EffectKind, EffectRegistry, FilterCatalog};
    use crate::pipeline::selection::Selection;
    use crate::pipeline::upload::{DirectoryPhotoStore, UploadState};

    fn controller() -> (CaptureController, Arc<Surface>, Arc<ActiveFilter>) {
        let surface = Arc::new(Surface::new());
        let selection = Arc::new(ActiveFilter::new(
            EffectRegistry::new().bind(&FilterCatalog::seeded()),
        ));
        let controller = CaptureController::new(Arc::clone(&surface), Arc::clone(&selection));
        (controller, surface, selection)
    }

    #[test]
    fn test_capture_requires_a_filter() {
        let (controller, surface, _) = controller();
        surface.publish(&mut Frame::new_filled(2, 2, [1, 2, 3, 255]), Selection::default());

        assert!(matches!(
            controller.capture(None),
            Err(CaptureError::NoFilterSelected)
        ));
    }

    #[test]
    fn test_capture_requires_a_presented_frame() {
        let (controller, _, selection) = controller();
        selection.select_filter("3");

        assert!(matches!(
            controller.capture(None),
            Err(CaptureError::NothingPresented)
        ));
    }

    #[test]
    fn test_capture_snapshots_presented_frame() {
        let (controller, surface, selection) = controller();
        selection.select_filter("6");
        surface.publish(&mut Frame::new_filled(4, 3, [50, 60, 70, 255]), selection.current());

        let photo = controller.capture(Some("  ")).unwrap();
        assert_eq!(photo.filter_id(), "6");
        assert_eq!(photo.description(), None);
        assert_eq!(photo.image(), &Frame::new_filled(4, 3, [50, 60, 70, 255]));

        // Later frames do not leak into an existing snapshot
        surface.publish(&mut Frame::new_filled(4, 3, [0, 0, 0, 255]), selection.current());
        assert_eq!(photo.image().get_pixel(0, 0), [50, 60, 70, 255]);

        let described = controller.capture(Some(" sunset ")).unwrap();
        assert_eq!(described.description(), Some("sunset"));
    }

    #[test]
    fn test_capture_uses_filter_that_rendered_the_frame() {
        let (controller, surface, selection) = controller();
        selection.select_filter("6");
        surface.publish(&mut Frame::new_filled(2, 2, [7, 7, 7, 255]), selection.current());

        // Switched after the frame was presented but before the capture
        selection.select_filter("2");
        let photo = controller.capture(None).unwrap();
        assert_eq!(photo.filter_id(), "6");

        // A frame rendered without a catalog filter cannot be captured
        selection.select_kind(EffectKind::Neon);
        surface.publish(&mut Frame::new_filled(2, 2, [7, 7, 7, 255]), selection.current());
        selection.select_filter("2");
        assert!(matches!(
            controller.capture(None),
            Err(CaptureError::NoFilterSelected)
        ));
    }

    #[test]
    fn test_encode_jpeg() {
        let (controller, surface, selection) = controller();
        selection.select_filter("1");
        surface.publish(&mut Frame::new_filled(16, 16, [200, 100, 50, 255]), selection.current());

        let bytes = controller.capture(None).unwrap().encode_jpeg(90).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);

        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (16, 16));
        let [r, g, b] = decoded.get_pixel(8, 8).0;
        assert!(r.abs_diff(200) < 8 && g.abs_diff(100) < 8 && b.abs_diff(50) < 8);
    }

    #[tokio::test]
    async fn test_submit_stores_photo() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(DirectoryPhotoStore::new(dir.path(), FilterCatalog::seeded()));
        let (controller, surface, selection) = controller();
        selection.select_filter("15");
        surface.publish(&mut Frame::new_filled(8, 8, [10, 200, 10, 255]), selection.current());

        let photo = controller.capture(Some("neon night")).unwrap();
        let task = controller.submit(store, photo).unwrap();
        let stored = task.wait().await.unwrap();

        assert_eq!(stored.filter_name.as_deref(), Some("Neon"));
        assert_eq!(stored.description.as_deref(), Some("neon night"));
        assert!(stored.image_path.exists());
    }

    #[tokio::test]
    async fn test_upload_state_is_observable() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(DirectoryPhotoStore::new(dir.path(), FilterCatalog::seeded()));
        let (controller, surface, selection) = controller();
        selection.select_filter("4");
        surface.publish(&mut Frame::new_filled(8, 8, [10, 20, 30, 255]), selection.current());

        let task = controller
            .submit(store, controller.capture(None).unwrap())
            .unwrap();
        let mut states = task.subscribe();
        let state = states.wait_for(UploadState::is_finished).await.unwrap().clone();

        assert!(matches!(state, UploadState::Succeeded(ref stored) if stored.filter_id == "4"));
    }
}
