use thiserror::Error;

/// Main error type for the Filter Booth library
#[derive(Error, Debug)]
pub enum BoothError {
    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),

    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Video source acquisition and streaming errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    #[error("camera permission denied")]
    PermissionDenied,

    #[error("no camera device found: {0}")]
    DeviceNotFound(String),

    #[error("camera is busy: {0}")]
    DeviceBusy(String),

    #[error("camera initialization aborted: {0}")]
    Aborted(String),

    #[error("requested stream constraints cannot be satisfied: {0}")]
    OverConstrained(String),

    #[error("video stream was revoked")]
    Revoked,

    #[error("failed to read frame: {0}")]
    ReadFailed(String),
}

impl CameraError {
    /// Only abort-class failures are worth another acquisition attempt
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Aborted(_))
    }

    /// Classify a capture backend failure from its message
    ///
    /// Backends report permission and busy conditions only as OS error text,
    /// so those are recognised by keyword; anything else becomes `fallback`.
    pub fn from_backend_message(
        message: impl Into<String>,
        fallback: impl FnOnce(String) -> CameraError,
    ) -> CameraError {
        let message = message.into();
        let lower = message.to_lowercase();
        let mentions = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

        if mentions(&[
            "permission",
            "denied",
            "eacces",
            "eperm",
            "os error 13",
            "not authorized",
            "unauthorized",
        ]) {
            CameraError::PermissionDenied
        } else if mentions(&["busy", "ebusy", "os error 16", "in use", "0xc00d3704"]) {
            CameraError::DeviceBusy(message)
        } else if mentions(&[
            "no such device",
            "no such file",
            "not found",
            "enodev",
            "enoent",
            "os error 2)",
            "os error 19",
        ]) {
            CameraError::DeviceNotFound(message)
        } else {
            fallback(message)
        }
    }

    /// Human-readable category shown to the person in front of the camera
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::PermissionDenied => {
                "Camera access denied. Please allow camera access and try again."
            }
            Self::DeviceNotFound(_) => {
                "No camera found. Please make sure your device has a working camera."
            }
            Self::DeviceBusy(_) => {
                "Camera is in use by another application. Please close other apps using the camera."
            }
            Self::Aborted(_) => {
                "Unable to access camera. Please try again or use a different device."
            }
            Self::OverConstrained(_) => "The camera does not support the requested video format.",
            Self::Revoked => "The camera was disconnected.",
            Self::ReadFailed(_) => "The camera stopped delivering frames.",
        }
    }
}

/// Pixel buffer errors
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("buffer of {actual} bytes does not match {width}x{height} RGBA ({expected} bytes)")]
    DimensionMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("image codec failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Snapshot capture errors
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("no filter selected")]
    NoFilterSelected,

    #[error("no frame has been presented yet")]
    NothingPresented,

    #[error("failed to encode snapshot: {reason}")]
    EncodingFailed { reason: String },
}

/// Photo upload errors
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("filter not found: {id}")]
    UnknownFilter { id: String },

    #[error("storage failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("upload cancelled")]
    Cancelled,
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using BoothError
pub type Result<T> = std::result::Result<T, BoothError>;

impl BoothError {
    /// Create a generic error with a custom message
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// Check if this error is recoverable (the user may simply try again)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Io(_) => true,
            Self::Camera(e) => e.is_retryable(),
            // A failed capture or upload never affects the running frame loop
            Self::Capture(_) | Self::Upload(_) => true,
            _ => false,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Camera(e) => e.user_message().to_string(),
            Self::Upload(UploadError::UnknownFilter { id }) => {
                format!("Filter '{}' does not exist. Pick another filter and try again.", id)
            }
            Self::Upload(_) => "Failed to save photo. Please try again.".to_string(),
            Self::Capture(CaptureError::NoFilterSelected) => {
                "Choose a filter before taking a photo.".to_string()
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_aborted_is_retryable() {
        assert!(CameraError::Aborted("timeout".into()).is_retryable());
        assert!(!CameraError::PermissionDenied.is_retryable());
        assert!(!CameraError::DeviceNotFound("video0".into()).is_retryable());
        assert!(!CameraError::DeviceBusy("video0".into()).is_retryable());
    }

    #[test]
    fn test_capture_failures_are_recoverable() {
        let err: BoothError = CaptureError::NothingPresented.into();
        assert!(err.is_recoverable());

        let err: BoothError = UploadError::Cancelled.into();
        assert!(err.is_recoverable());

        let err: BoothError = CameraError::PermissionDenied.into();
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_permission_and_missing_device_messages_differ() {
        let denied: BoothError = CameraError::PermissionDenied.into();
        let missing: BoothError = CameraError::DeviceNotFound("video0".into()).into();
        assert_ne!(denied.user_message(), missing.user_message());
        assert!(denied.user_message().contains("denied"));
    }

    #[test]
    fn test_backend_messages_are_classified() {
        let aborted = CameraError::Aborted;

        let denied = CameraError::from_backend_message(
            "Could not open device /dev/video0: Permission denied (os error 13)",
            aborted,
        );
        assert_eq!(denied, CameraError::PermissionDenied);
        assert!(!denied.is_retryable());

        let busy = CameraError::from_backend_message(
            "Failed to start stream: Device or resource busy (os error 16)",
            aborted,
        );
        assert!(matches!(busy, CameraError::DeviceBusy(_)));
        assert!(!busy.is_retryable());

        let missing = CameraError::from_backend_message(
            "Could not open device 3: No such file or directory (os error 2)",
            aborted,
        );
        assert!(matches!(missing, CameraError::DeviceNotFound(_)));

        let other = CameraError::from_backend_message("select timeout", aborted);
        assert_eq!(other, CameraError::Aborted("select timeout".to_string()));
        assert!(other.is_retryable());
    }
}
