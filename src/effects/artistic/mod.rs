//! # Artistic Effects
//!
//! Stylised renderings that reshape the image structure rather than just its
//! colours: pixelation, cartoon outlines, oil painting, comic book
//! binarization and neon glow.

mod effect;

pub use effect::{CartoonEffect, ComicBookEffect, NeonEffect, OilPaintingEffect, PixelArtEffect};

/// Largest Oil Painting neighbourhood radius; larger values are clamped
pub const MAX_OIL_RADIUS: u32 = 16;

/// Posterized channel sum at or above which a Comic Book pixel turns white
///
/// Equivalent to an average of 128 over R, G and B.
pub const COMIC_BOOK_WHITE_SUM: u32 = 3 * 128;
