use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    effects::{
        artistic::{CartoonEffect, ComicBookEffect, NeonEffect, OilPaintingEffect, PixelArtEffect},
        basic::{
            BlackAndWhiteEffect, BrightnessEffect, ContrastEffect, NormalEffect, RainbowEffect,
            VintageEffect,
        },
        themed::{AnimeEffect, ComicHeroEffect, DisneyEffect, PixarEffect},
        traits::{Effect, EffectParams},
    },
    video::{Frame, Scratch},
};

/// Stable identifier of a built-in effect
///
/// The discriminant is the position in [`EffectKind::ALL`], which lets the
/// active selection live in a single atomic byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EffectKind {
    #[default]
    Normal = 0,
    BlackAndWhite,
    Brightness,
    Contrast,
    Vintage,
    Rainbow,
    Disney,
    Anime,
    ComicHero,
    Pixar,
    PixelArt,
    Cartoon,
    OilPainting,
    ComicBook,
    Neon,
}

impl EffectKind {
    /// Every built-in effect, in discriminant order
    pub const ALL: [EffectKind; 15] = [
        Self::Normal,
        Self::BlackAndWhite,
        Self::Brightness,
        Self::Contrast,
        Self::Vintage,
        Self::Rainbow,
        Self::Disney,
        Self::Anime,
        Self::ComicHero,
        Self::Pixar,
        Self::PixelArt,
        Self::Cartoon,
        Self::OilPainting,
        Self::ComicBook,
        Self::Neon,
    ];

    /// The stateless implementation behind this kind
    pub fn effect(self) -> &'static dyn Effect {
        match self {
            Self::Normal => &NormalEffect,
            Self::BlackAndWhite => &BlackAndWhiteEffect,
            Self::Brightness => &BrightnessEffect,
            Self::Contrast => &ContrastEffect,
            Self::Vintage => &VintageEffect,
            Self::Rainbow => &RainbowEffect,
            Self::Disney => &DisneyEffect,
            Self::Anime => &AnimeEffect,
            Self::ComicHero => &ComicHeroEffect,
            Self::Pixar => &PixarEffect,
            Self::PixelArt => &PixelArtEffect,
            Self::Cartoon => &CartoonEffect,
            Self::OilPainting => &OilPaintingEffect,
            Self::ComicBook => &ComicBookEffect,
            Self::Neon => &NeonEffect,
        }
    }

    /// Catalog name, e.g. "Black & White"
    pub fn name(self) -> &'static str {
        self.effect().name()
    }

    /// Exact, case-sensitive lookup by catalog name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    #[inline]
    pub fn index(self) -> u8 {
        self as u8
    }

    #[inline]
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Run this effect on a frame
    #[inline]
    pub fn apply(self, frame: &mut Frame, params: &EffectParams, scratch: &mut Scratch) {
        self.effect().apply(frame, params, scratch);
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
