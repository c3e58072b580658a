//! # Pipeline
//!
//! The live side of the booth: stream acquisition with retry, the paced frame
//! loop, the presented surface it publishes to, single-shot capture and the
//! asynchronous photo upload.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use filter_booth::effects::{EffectParams, EffectRegistry, FilterCatalog};
//! use filter_booth::pipeline::{ActiveFilter, FrameLoop, LoopConfig, Surface};
//! use filter_booth::video::TestPatternSource;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bindings = EffectRegistry::new().bind(&FilterCatalog::seeded());
//! let selection = Arc::new(ActiveFilter::new(bindings));
//! let surface = Arc::new(Surface::new());
//!
//! let mut frame_loop = FrameLoop::start(
//!     TestPatternSource::new,
//!     LoopConfig::default(),
//!     EffectParams::default(),
//!     Arc::clone(&selection),
//!     Arc::clone(&surface),
//! )?;
//!
//! selection.select_filter("2");
//! frame_loop.stop();
//! # Ok(())
//! # }
//! ```

pub mod acquire;
pub mod capture;
pub mod frame_loop;
pub mod selection;
pub mod surface;
pub mod upload;

pub use acquire::{acquire, RetryPolicy};
pub use capture::{CaptureController, CapturedPhoto};
pub use frame_loop::{FrameLoop, LoopConfig, LoopState, LoopStats};
pub use selection::{ActiveFilter, Selection};
pub use surface::Surface;
pub use upload::{DirectoryPhotoStore, PhotoStore, PhotoUpload, StoredPhoto, UploadState, UploadTask};
