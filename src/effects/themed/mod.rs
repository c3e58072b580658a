//! # Themed Effects
//!
//! Animation-studio looks built from colour grading plus the blur and edge
//! kernels: Disney, Anime, Comic Hero and Pixar.

mod effect;

pub use effect::{AnimeEffect, ComicHeroEffect, DisneyEffect, PixarEffect};

/// Whether an RGB triple falls in the simple skin-tone box used by Disney
#[inline]
pub fn is_skin_tone(r: u8, g: u8, b: u8) -> bool {
    r > 95 && g > 40 && b > 20 && r > g && r > b
}

/// Brightness below which Pixar lifts shadows
pub const PIXAR_SHADOW_LEVEL: f32 = 100.0;

/// Brightness below which a Comic Hero halftone dot is inked black
pub const HALFTONE_INK_LEVEL: f32 = 128.0;
