use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    effects::{EffectParams, FilterCatalog, FilterDescriptor},
    error::{ConfigError, Result},
    pipeline::{LoopConfig, RetryPolicy},
    video::StreamConstraints,
};

/// Main configuration for the Filter Booth
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Video stream acquisition settings
    pub camera: CameraConfig,

    /// Frame loop settings
    pub pipeline: PipelineConfig,

    /// Snapshot and storage settings
    pub capture: CaptureConfig,

    /// Numeric constants of the effect catalog
    pub effects: EffectParams,

    /// Filter catalog; empty means the built-in seeded catalog
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<FilterDescriptor>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            tracing::debug!(path = %path.display(), "TOML error: {}", e);
            ConfigError::ParseFailed { path: path.display().to_string() }
        })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidValue {
            key: "config".to_string(),
            value: e.to_string(),
        })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.camera.validate()?;
        self.pipeline.validate()?;
        self.capture.validate()?;
        self.effects.validate()?;

        if self.filters.iter().any(|f| f.id.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                key: "filters.id".to_string(),
                value: String::new(),
            }
            .into());
        }
        Ok(())
    }

    /// The configured filter catalog, or the seeded one
    pub fn catalog(&self) -> FilterCatalog {
        if self.filters.is_empty() {
            FilterCatalog::seeded()
        } else {
            FilterCatalog::from_descriptors(self.filters.clone())
        }
    }

    /// Frame loop settings assembled from the camera and pipeline sections
    pub fn loop_config(&self) -> LoopConfig {
        LoopConfig {
            constraints: self.camera.constraints.clone(),
            refresh_rate_hz: self.pipeline.refresh_rate_hz,
            retry: RetryPolicy {
                max_retries: self.camera.max_retries,
                backoff: Duration::from_millis(self.camera.retry_backoff_ms),
            },
            max_consecutive_read_errors: self.pipeline.max_consecutive_read_errors,
            max_frames: None,
        }
    }
}

/// Video stream acquisition configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Preferred stream shape
    #[serde(flatten)]
    pub constraints: StreamConstraints,

    /// Device index for hardware cameras
    pub device_index: u32,

    /// Retries after an aborted acquisition
    pub max_retries: u32,

    /// Delay between acquisition attempts (milliseconds)
    pub retry_backoff_ms: u64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            constraints: StreamConstraints::default(),
            device_index: 0,
            max_retries: 3,
            retry_backoff_ms: 1000,
        }
    }
}

impl CameraConfig {
    fn validate(&self) -> Result<()> {
        if self.constraints.width == 0 || self.constraints.height == 0 {
            return Err(ConfigError::InvalidValue {
                key: "camera.resolution".to_string(),
                value: format!("{}x{}", self.constraints.width, self.constraints.height),
            }
            .into());
        }

        if self.constraints.frame_rate == Some(0) {
            return Err(ConfigError::InvalidValue {
                key: "camera.frame_rate".to_string(),
                value: "0".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Frame loop configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Display refresh rate the loop is paced at (Hz)
    pub refresh_rate_hz: u32,

    /// Consecutive failed reads before the loop gives up
    pub max_consecutive_read_errors: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            refresh_rate_hz: 60,
            max_consecutive_read_errors: 30,
        }
    }
}

impl PipelineConfig {
    fn validate(&self) -> Result<()> {
        if !(1..=240).contains(&self.refresh_rate_hz) {
            return Err(ConfigError::InvalidValue {
                key: "pipeline.refresh_rate_hz".to_string(),
                value: self.refresh_rate_hz.to_string(),
            }
            .into());
        }

        if self.max_consecutive_read_errors == 0 {
            return Err(ConfigError::InvalidValue {
                key: "pipeline.max_consecutive_read_errors".to_string(),
                value: "0".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Snapshot and storage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,

    /// Directory photos are stored in
    pub output_dir: PathBuf,

    /// File name prefix of stored photos
    pub file_prefix: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 90,
            output_dir: PathBuf::from("photos"),
            file_prefix: "photo".to_string(),
        }
    }
}

impl CaptureConfig {
    fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::InvalidValue {
                key: "capture.jpeg_quality".to_string(),
                value: self.jpeg_quality.to_string(),
            }
            .into());
        }

        if self.file_prefix.is_empty() || self.file_prefix.contains(['/', '\\']) {
            return Err(ConfigError::InvalidValue {
                key: "capture.file_prefix".to_string(),
                value: self.file_prefix.clone(),
            }
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    use crate::video::FacingMode;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("booth.toml");

        let mut original = Config::default();
        original.filters = vec![FilterDescriptor::new("99", "Black & White").with_category("Basic")];
        original.effects.oil_radius = 2;

        original.save_to_file(&file_path).unwrap();
        let loaded = Config::from_file(&file_path).unwrap();

        assert_eq!(original, loaded);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("booth.toml");
        std::fs::write(
            &file_path,
            r#"
[camera]
width = 1280
height = 720
facing = "environment"

[effects]
pixel_block_size = 16

[[filters]]
id = "a"
name = "Neon"
"#,
        )
        .unwrap();

        let config = Config::from_file(&file_path).unwrap();
        assert_eq!(config.camera.constraints.width, 1280);
        assert_eq!(config.camera.constraints.facing, FacingMode::Environment);
        assert_eq!(config.camera.constraints.frame_rate, Some(30));
        assert_eq!(config.effects.pixel_block_size, 16);
        assert_eq!(config.effects.oil_radius, 3);
        assert_eq!(config.pipeline.refresh_rate_hz, 60);
        assert_eq!(config.catalog().get("a").unwrap().name, "Neon");
    }

    #[test]
    fn test_missing_and_malformed_files() {
        let dir = tempdir().unwrap();

        let missing = Config::from_file(dir.path().join("nope.toml"));
        assert!(matches!(
            missing,
            Err(crate::error::BoothError::Config(ConfigError::FileNotFound { .. }))
        ));

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[camera\nwidth = ").unwrap();
        assert!(matches!(
            Config::from_file(&bad),
            Err(crate::error::BoothError::Config(ConfigError::ParseFailed { .. }))
        ));
    }

    #[test]
    fn test_invalid_values() {
        let mut config = Config::default();
        config.capture.jpeg_quality = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.pipeline.refresh_rate_hz = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.camera.constraints.width = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.capture.file_prefix = "../escape".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_filters_use_seeded_catalog() {
        let config = Config::default();
        assert_eq!(config.catalog(), FilterCatalog::seeded());

        let loop_config = config.loop_config();
        assert_eq!(loop_config.retry, RetryPolicy::default());
        assert_eq!(loop_config.refresh_rate_hz, 60);
    }
}
