use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    effects::{artistic::MAX_OIL_RADIUS, blur::MAX_BLUR_RADIUS},
    error::{ConfigError, Result},
    video::{Frame, Scratch},
};

/// Core trait that all filter effects must implement
pub trait Effect: Send + Sync {
    /// Catalog name of this effect. Dispatch matches it exactly, so it is
    /// case- and punctuation-sensitive ("Black & White").
    fn name(&self) -> &'static str;

    /// Returns a human-readable description of this effect
    fn description(&self) -> &'static str;

    /// Catalog grouping
    fn category(&self) -> EffectCategory;

    /// Apply the effect to a frame in place
    ///
    /// # Arguments
    ///
    /// * `frame` - The frame to modify; its geometry is never changed
    /// * `params` - Numeric constants of the catalog
    /// * `scratch` - Reusable working memory for effects that need a second buffer
    fn apply(&self, frame: &mut Frame, params: &EffectParams, scratch: &mut Scratch);

    /// Get effect-specific metadata
    fn metadata(&self) -> EffectMetadata {
        EffectMetadata::default()
    }
}

/// Grouping used by the filter picker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectCategory {
    Basic,
    Themed,
    Artistic,
}

impl EffectCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "Basic",
            Self::Themed => "Themed",
            Self::Artistic => "Artistic",
        }
    }
}

impl fmt::Display for EffectCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric constants of the effect catalog
///
/// Loaded once with the configuration and shared read-only by every frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectParams {
    /// Channel multiplier of the Brightness effect
    pub brightness_factor: f32,

    /// Contrast amount `c` in `259(c+255) / 255(259-c)`
    pub contrast: f32,

    /// Quantization step for cel shading (Anime, Cartoon)
    pub cel_step: u8,

    /// Quantization step for posterization (Comic Book)
    pub poster_step: u8,

    /// Sobel magnitude above which an Anime pixel is an outline
    pub anime_edge_threshold: f32,

    /// Red-channel jump between neighbours that Cartoon treats as an outline
    pub cartoon_edge_threshold: u8,

    /// Side of the square mosaic blocks of Pixel Art
    pub pixel_block_size: u32,

    /// Neighbourhood radius of Oil Painting
    pub oil_radius: u32,

    /// Colour boost of Disney
    pub disney_boost: f32,

    /// Gaussian radius used by Disney
    pub disney_blur_radius: f32,

    /// Gaussian radius used by Pixar
    pub pixar_blur_radius: f32,

    /// Opacity of the Rainbow gradient wash (0.0-1.0)
    pub rainbow_opacity: f32,

    /// Channel multiplier of Neon
    pub neon_boost: f32,

    /// Post-boost brightness above which Neon turns a pixel white
    pub neon_glow_threshold: f32,

    /// Every n-th pixel receives the Comic Hero halftone treatment
    pub halftone_period: usize,
}

impl Default for EffectParams {
    fn default() -> Self {
        Self {
            brightness_factor: 1.5,
            contrast: 1.5,
            cel_step: 32,
            poster_step: 64,
            anime_edge_threshold: 50.0,
            cartoon_edge_threshold: 30,
            pixel_block_size: 10,
            oil_radius: 3,
            disney_boost: 1.2,
            disney_blur_radius: 1.0,
            pixar_blur_radius: 0.5,
            rainbow_opacity: 0.2,
            neon_boost: 1.5,
            neon_glow_threshold: 200.0,
            halftone_period: 4,
        }
    }
}

impl EffectParams {
    /// Validate the parameters
    pub fn validate(&self) -> Result<()> {
        let invalid = |key: &str, value: String| -> Result<()> {
            Err(ConfigError::InvalidValue {
                key: format!("effects.{}", key),
                value,
            }
            .into())
        };

        if self.cel_step == 0 {
            return invalid("cel_step", self.cel_step.to_string());
        }
        if self.poster_step == 0 {
            return invalid("poster_step", self.poster_step.to_string());
        }
        if self.pixel_block_size == 0 {
            return invalid("pixel_block_size", self.pixel_block_size.to_string());
        }
        if self.oil_radius > MAX_OIL_RADIUS {
            return invalid("oil_radius", self.oil_radius.to_string());
        }
        if self.halftone_period == 0 {
            return invalid("halftone_period", self.halftone_period.to_string());
        }
        // 259 is a pole of the contrast factor formula
        if !(-255.0..259.0).contains(&self.contrast) {
            return invalid("contrast", self.contrast.to_string());
        }
        if !(0.0..=1.0).contains(&self.rainbow_opacity) {
            return invalid("rainbow_opacity", self.rainbow_opacity.to_string());
        }
        for (key, radius) in [
            ("disney_blur_radius", self.disney_blur_radius),
            ("pixar_blur_radius", self.pixar_blur_radius),
        ] {
            if !(0.0..=MAX_BLUR_RADIUS).contains(&radius) {
                return invalid(key, radius.to_string());
            }
        }

        Ok(())
    }
}

/// Metadata about an effect's characteristics
#[derive(Debug, Clone, Default)]
pub struct EffectMetadata {
    /// Whether the effect reads neighbouring pixels
    pub samples_neighbors: bool,

    /// Estimated per-frame cost (0.0 = minimal, 1.0 = heavy)
    pub performance_impact: f32,

    /// Parameters of [`EffectParams`] the effect reads, with descriptions
    pub parameters: Vec<(String, String)>,
}

impl EffectMetadata {
    pub(crate) fn per_pixel(performance_impact: f32, parameters: &[(&str, &str)]) -> Self {
        Self {
            samples_neighbors: false,
            performance_impact,
            parameters: parameters
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub(crate) fn neighborhood(performance_impact: f32, parameters: &[(&str, &str)]) -> Self {
        Self {
            samples_neighbors: true,
            ..Self::per_pixel(performance_impact, parameters)
        }
    }
}
