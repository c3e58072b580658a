//! # Basic Effects
//!
//! Per-pixel colour adjustments: identity, greyscale, brightness, contrast,
//! sepia and the rainbow gradient wash.

mod effect;

pub use effect::{
    BlackAndWhiteEffect, BrightnessEffect, ContrastEffect, NormalEffect, RainbowEffect,
    VintageEffect,
};

/// Sepia colour matrix, rows produce R, G, B
pub const SEPIA: [[f32; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

/// Rainbow gradient stops as (offset, colour), left to right
pub const RAINBOW_STOPS: [(f32, [u8; 3]); 6] = [
    (0.0, [255, 0, 0]),
    (0.2, [255, 165, 0]),
    (0.4, [255, 255, 0]),
    (0.6, [0, 128, 0]),
    (0.8, [0, 0, 255]),
    (1.0, [238, 130, 238]),
];
