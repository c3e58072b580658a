//! # Filter Booth
//!
//! Real-time photo-booth filters for a live video stream.
//!
//! This library reads frames from a video source, runs the selected filter
//! effect on each one at display rate, and lets the user snapshot the filtered
//! result and hand it to a photo store.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use filter_booth::{
//!     config::Config,
//!     pipeline::{ActiveFilter, CaptureController, DirectoryPhotoStore, FrameLoop, Surface},
//!     video::TestPatternSource,
//!     EffectRegistry,
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = Config::default();
//! let catalog = config.catalog();
//! let selection = Arc::new(ActiveFilter::new(EffectRegistry::new().bind(&catalog)));
//! let surface = Arc::new(Surface::new());
//! selection.select_filter("9");
//!
//! let mut frame_loop = FrameLoop::start(
//!     TestPatternSource::new,
//!     config.loop_config(),
//!     config.effects.clone(),
//!     Arc::clone(&selection),
//!     Arc::clone(&surface),
//! )?;
//! while surface.presented() == 0 {
//!     std::thread::sleep(std::time::Duration::from_millis(5));
//! }
//!
//! let capture = CaptureController::new(surface, selection);
//! let photo = capture.capture(Some("sepia selfie"))?;
//! let store = Arc::new(DirectoryPhotoStore::new("photos/", catalog));
//! let stored = capture.submit(store, photo)?.wait().await?;
//!
//! frame_loop.stop();
//! println!("saved {}", stored.image_path.display());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - [`video`] - Frame buffers and video sources
//! - [`effects`] - The filter effect catalog and name-based dispatch
//! - [`pipeline`] - Frame loop, capture and upload
//! - [`config`] - Configuration management
//!
//! ## Border Policy
//!
//! Neighbourhood effects disagree on what lies outside the frame, so each one
//! documents its choice: Gaussian blur and Oil Painting replicate the nearest
//! border pixel, while Sobel-based outlines (Anime) leave the 1-pixel border
//! with its source colour.

pub mod config;
pub mod effects;
pub mod error;
pub mod pipeline;
pub mod video;

// Re-export commonly used types for convenience
pub use crate::{
    config::Config,
    effects::{Effect, EffectKind, EffectParams, EffectRegistry, FilterCatalog},
    error::{BoothError, Result},
    video::Frame,
};
