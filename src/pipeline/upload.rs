//! Photo persistence boundary and the asynchronous upload task.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::effects::FilterCatalog;
use crate::error::UploadError;

/// An encoded photo on its way to storage
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoUpload {
    /// JPEG bytes
    pub image: Vec<u8>,
    pub filter_id: String,
    pub description: Option<String>,
    pub captured_at: DateTime<Utc>,
}

/// A photo as recorded by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPhoto {
    pub id: String,
    pub image_path: PathBuf,
    pub filter_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub captured_at: DateTime<Utc>,
    pub stored_at: DateTime<Utc>,
}

/// Where captured photos end up
///
/// Implementations validate the upload themselves; the pipeline never retries
/// a failed upload.
pub trait PhotoStore: Send + Sync + 'static {
    fn upload(
        &self,
        upload: PhotoUpload,
    ) -> impl Future<Output = Result<StoredPhoto, UploadError>> + Send;
}

/// Stores each photo as `<prefix>-<millis>-<seq>.jpg` next to a TOML record
/// of the same name
pub struct DirectoryPhotoStore {
    root: PathBuf,
    prefix: String,
    catalog: FilterCatalog,
    sequence: AtomicU64,
}

impl DirectoryPhotoStore {
    /// Store under `root`, accepting only filters known to `catalog`
    pub fn new<P: AsRef<Path>>(root: P, catalog: FilterCatalog) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            prefix: "photo".to_string(),
            catalog,
            sequence: AtomicU64::new(0),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn validate(&self, upload: &PhotoUpload) -> Result<Option<String>, UploadError> {
        if upload.image.is_empty() {
            return Err(UploadError::MissingField { field: "image" });
        }
        if upload.filter_id.trim().is_empty() {
            return Err(UploadError::MissingField { field: "filter_id" });
        }

        let filter = self
            .catalog
            .get(&upload.filter_id)
            .ok_or_else(|| UploadError::UnknownFilter {
                id: upload.filter_id.clone(),
            })?;
        Ok(Some(filter.name.clone()))
    }
}

impl PhotoStore for DirectoryPhotoStore {
    async fn upload(&self, upload: PhotoUpload) -> Result<StoredPhoto, UploadError> {
        let filter_name = self.validate(&upload)?;

        tokio::fs::create_dir_all(&self.root).await?;

        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let id = format!(
            "{}-{}-{}",
            self.prefix,
            upload.captured_at.timestamp_millis(),
            sequence
        );
        let image_path = self.root.join(format!("{id}.jpg"));
        let record_path = self.root.join(format!("{id}.toml"));

        tokio::fs::write(&image_path, &upload.image).await?;

        let stored = StoredPhoto {
            id,
            image_path: image_path.clone(),
            filter_id: upload.filter_id,
            filter_name,
            description: upload.description,
            captured_at: upload.captured_at,
            stored_at: Utc::now(),
        };

        let written = match toml::to_string_pretty(&stored) {
            Ok(record) => tokio::fs::write(&record_path, record).await,
            Err(e) => Err(io::Error::new(io::ErrorKind::InvalidData, e)),
        };

        // No orphaned image without a record
        if let Err(e) = written {
            if let Err(cleanup) = tokio::fs::remove_file(&image_path).await {
                tracing::warn!(path = %image_path.display(), "Failed to remove orphaned photo: {}", cleanup);
            }
            return Err(e.into());
        }

        tracing::info!(id = %stored.id, filter_id = %stored.filter_id, "Photo stored");
        Ok(stored)
    }
}

/// Observable progress of an upload
#[derive(Debug, Clone, PartialEq)]
pub enum UploadState {
    Pending,
    Succeeded(StoredPhoto),
    Failed(String),
    Cancelled,
}

impl UploadState {
    pub fn is_finished(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// A running upload
///
/// Cancellation is best effort: a store that already wrote the photo keeps it.
pub struct UploadTask {
    state: Arc<watch::Sender<UploadState>>,
    handle: JoinHandle<Result<StoredPhoto, UploadError>>,
}

impl UploadTask {
    /// Start uploading on the current Tokio runtime
    pub fn spawn<S: PhotoStore>(store: Arc<S>, upload: PhotoUpload) -> Self {
        let (tx, _rx) = watch::channel(UploadState::Pending);
        let state = Arc::new(tx);
        let task_state = Arc::clone(&state);

        let handle = tokio::spawn(async move {
            let result = store.upload(upload).await;

            let next = match &result {
                Ok(stored) => UploadState::Succeeded(stored.clone()),
                Err(e) => {
                    tracing::warn!(error = %e, "Photo upload failed");
                    UploadState::Failed(e.to_string())
                }
            };
            task_state.send_if_modified(|current| {
                if current.is_finished() {
                    return false;
                }
                *current = next;
                true
            });

            result
        });

        Self { state, handle }
    }

    /// Current state
    pub fn state(&self) -> UploadState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every state change
    pub fn subscribe(&self) -> watch::Receiver<UploadState> {
        self.state.subscribe()
    }

    /// Abort the upload if it has not finished yet
    pub fn cancel(&self) {
        let cancelled = self.state.send_if_modified(|current| {
            if current.is_finished() {
                return false;
            }
            *current = UploadState::Cancelled;
            true
        });
        if cancelled {
            tracing::debug!("Photo upload cancelled");
            self.handle.abort();
        }
    }

    /// Wait for the outcome
    pub async fn wait(self) -> Result<StoredPhoto, UploadError> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(UploadError::Cancelled),
            Err(e) => Err(UploadError::Io(io::Error::other(e.to_string()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use chrono::TimeZone;

    fn upload(filter_id: &str) -> PhotoUpload {
        PhotoUpload {
            image: vec![0xFF, 0xD8, 0xFF, 0xD9],
            filter_id: filter_id.to_string(),
            description: Some("at the beach".to_string()),
            captured_at: Utc.with_ymd_and_hms(2024, 5, 17, 12, 30, 0).unwrap(),
        }
    }

    /// Never finishes, so cancellation can be observed
    struct StalledStore;

    impl PhotoStore for StalledStore {
        async fn upload(&self, _upload: PhotoUpload) -> Result<StoredPhoto, UploadError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(UploadError::Cancelled)
        }
    }

    #[tokio::test]
    async fn test_directory_store_writes_photo_and_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryPhotoStore::new(dir.path().join("photos"), FilterCatalog::seeded());

        let stored = store.upload(upload("9")).await.unwrap();

        assert_eq!(stored.filter_name.as_deref(), Some("Vintage"));
        assert!(stored.id.starts_with("photo-1715949000000-"));
        assert_eq!(std::fs::read(&stored.image_path).unwrap(), vec![0xFF, 0xD8, 0xFF, 0xD9]);

        let record = std::fs::read_to_string(stored.image_path.with_extension("toml")).unwrap();
        let parsed: StoredPhoto = toml::from_str(&record).unwrap();
        assert_eq!(parsed, stored);
    }

    #[tokio::test]
    async fn test_directory_store_validates() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryPhotoStore::new(dir.path(), FilterCatalog::seeded());

        let mut empty = upload("1");
        empty.image.clear();
        assert!(matches!(
            store.upload(empty).await,
            Err(UploadError::MissingField { field: "image" })
        ));
        assert!(matches!(
            store.upload(upload("")).await,
            Err(UploadError::MissingField { field: "filter_id" })
        ));
        assert!(matches!(
            store.upload(upload("99")).await,
            Err(UploadError::UnknownFilter { id }) if id == "99"
        ));

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_upload_task_reports_success() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(DirectoryPhotoStore::new(dir.path(), FilterCatalog::seeded()));

        let task = UploadTask::spawn(store, upload("2"));
        let mut states = task.subscribe();
        states.wait_for(UploadState::is_finished).await.unwrap();
        assert!(matches!(task.state(), UploadState::Succeeded(_)));

        let stored = task.wait().await.unwrap();
        assert_eq!(stored.filter_name.as_deref(), Some("Black & White"));
    }

    #[tokio::test]
    async fn test_upload_task_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(DirectoryPhotoStore::new(dir.path(), FilterCatalog::seeded()));

        let task = UploadTask::spawn(store, upload("404"));
        let mut states = task.subscribe();
        states.wait_for(UploadState::is_finished).await.unwrap();

        assert_eq!(task.state(), UploadState::Failed("filter not found: 404".to_string()));
        assert!(matches!(task.wait().await, Err(UploadError::UnknownFilter { .. })));
    }

    #[tokio::test]
    async fn test_upload_task_cancel() {
        let task = UploadTask::spawn(Arc::new(StalledStore), upload("1"));
        assert_eq!(task.state(), UploadState::Pending);

        task.cancel();
        assert_eq!(task.state(), UploadState::Cancelled);
        assert!(matches!(task.wait().await, Err(UploadError::Cancelled)));
    }
}
