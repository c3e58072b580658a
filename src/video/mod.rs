//! # Video Module
//!
//! Frame buffers, the reusable scratch memory effects work in, and the
//! sources that fill frames from a file, a synthetic pattern or a camera.

pub mod source;
pub mod types;

#[cfg(feature = "camera")]
pub mod camera;

pub use source::{FacingMode, StillImageSource, StreamConstraints, TestPatternSource, VideoSource};
pub use types::{Frame, Geometry, Scratch, CHANNELS};

#[cfg(feature = "camera")]
pub use camera::NokhwaSource;
