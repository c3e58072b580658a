//! # Filter Effect System
//!
//! Every filter a user can pick in the booth is an [`Effect`]: a stateless
//! transformation that mutates an RGBA [`Frame`](crate::video::Frame) in place
//! and never changes its geometry.
//!
//! ## Built-in Effects
//!
//! - **Basic**: Normal, Black & White, Brightness, Contrast, Vintage, Rainbow
//! - **Themed**: Disney, Anime, Comic Hero, Pixar
//! - **Artistic**: Pixel Art, Cartoon, Oil Painting, Comic Book, Neon
//!
//! ## Dispatch
//!
//! Persisted filter records carry an id, but the effect that runs is chosen by
//! the record's *name*. The [`EffectRegistry`] resolves catalog names to a
//! stable [`EffectKind`] once, producing [`FilterBindings`] keyed by id; the
//! frame loop then dispatches on the enum without touching strings.
//!
//! ```rust,no_run
//! use filter_booth::effects::{EffectParams, EffectRegistry, FilterCatalog};
//! use filter_booth::video::{Frame, Scratch};
//!
//! let registry = EffectRegistry::new();
//! let bindings = registry.bind(&FilterCatalog::seeded());
//!
//! let mut frame = Frame::new_filled(640, 480, [128, 128, 128, 255]);
//! let mut scratch = Scratch::new();
//! bindings
//!     .resolve("2")
//!     .apply(&mut frame, &EffectParams::default(), &mut scratch);
//! ```

pub mod blur;
pub mod catalog;
pub mod edge;
pub mod kind;
pub mod pixel;
pub mod registry;
pub mod traits;

// Effect implementations
pub mod basic;
pub mod themed;
pub mod artistic;

// Re-exports for convenience
pub use catalog::{FilterBindings, FilterCatalog, FilterDescriptor};
pub use kind::EffectKind;
pub use registry::EffectRegistry;
pub use traits::{Effect, EffectCategory, EffectMetadata, EffectParams};

// Re-export all built-in effects
pub use basic::{
    BlackAndWhiteEffect, BrightnessEffect, ContrastEffect, NormalEffect, RainbowEffect,
    VintageEffect,
};
pub use themed::{AnimeEffect, ComicHeroEffect, DisneyEffect, PixarEffect};
pub use artistic::{CartoonEffect, ComicBookEffect, NeonEffect, OilPaintingEffect, PixelArtEffect};

#[cfg(test)]
mod properties;
