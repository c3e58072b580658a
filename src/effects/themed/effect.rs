use crate::{
    effects::blur::gaussian_blur,
    effects::edge::SobelDetector,
    effects::pixel::{brightness, contrast_factor, quantize, round_channel, scale},
    effects::traits::{Effect, EffectCategory, EffectMetadata, EffectParams},
    video::{Frame, Scratch, CHANNELS},
};

use super::{is_skin_tone, HALFTONE_INK_LEVEL, PIXAR_SHADOW_LEVEL};

/// Saturated colours with softened skin tones and a light blur
pub struct DisneyEffect;

impl Effect for DisneyEffect {
    fn name(&self) -> &'static str {
        "Disney"
    }

    fn description(&self) -> &'static str {
        "Disney-style animation effect"
    }

    fn category(&self) -> EffectCategory {
        EffectCategory::Themed
    }

    fn apply(&self, frame: &mut Frame, params: &EffectParams, scratch: &mut Scratch) {
        let boost = params.disney_boost;

        for pixel in frame.as_raw_mut().chunks_exact_mut(CHANNELS) {
            let (r, g, b) = (pixel[0], pixel[1], pixel[2]);

            if is_skin_tone(r, g, b) {
                // Skin is softened from the input colour instead of boosted
                pixel[0] = scale(r, 0.9);
                pixel[1] = scale(g, 1.1);
                pixel[2] = scale(b, 1.1);
            } else {
                pixel[0] = scale(r, boost);
                pixel[1] = scale(g, boost);
                pixel[2] = scale(b, boost);
            }
        }

        gaussian_blur(frame, params.disney_blur_radius, scratch);
    }

    fn metadata(&self) -> EffectMetadata {
        EffectMetadata::neighborhood(
            0.5,
            &[
                ("disney_boost", "Colour multiplier (default 1.2)"),
                ("disney_blur_radius", "Gaussian blur radius (default 1.0)"),
            ],
        )
    }
}

/// Cel shading: black Sobel outlines over quantized flat colour
///
/// The 1-pixel border has no full neighbourhood and keeps its source colour.
pub struct AnimeEffect;

impl Effect for AnimeEffect {
    fn name(&self) -> &'static str {
        "Anime"
    }

    fn description(&self) -> &'static str {
        "Anime-style effect with bold lines"
    }

    fn category(&self) -> EffectCategory {
        EffectCategory::Themed
    }

    fn apply(&self, frame: &mut Frame, params: &EffectParams, scratch: &mut Scratch) {
        let width = frame.width() as usize;
        let height = frame.height() as usize;
        if width < 3 || height < 3 {
            return;
        }

        let detector = SobelDetector::new(params.anime_edge_threshold);
        let step = params.cel_step;
        let source = scratch.snapshot(frame);
        let output = frame.as_raw_mut();

        for y in 1..height - 1 {
            for x in 1..width - 1 {
                let idx = (y * width + x) * CHANNELS;
                if detector.is_edge(source, width, x, y) {
                    output[idx..idx + 3].fill(0);
                } else {
                    for c in 0..3 {
                        output[idx + c] = quantize(source[idx + c], step);
                    }
                }
            }
        }
    }

    fn metadata(&self) -> EffectMetadata {
        EffectMetadata::neighborhood(
            0.4,
            &[
                ("anime_edge_threshold", "Sobel magnitude treated as an outline (default 50)"),
                ("cel_step", "Quantization step (default 32)"),
            ],
        )
    }
}

/// Punchy contrast with a halftone dot on every n-th pixel
pub struct ComicHeroEffect;

impl Effect for ComicHeroEffect {
    fn name(&self) -> &'static str {
        "Comic Hero"
    }

    fn description(&self) -> &'static str {
        "Comic book superhero style effect"
    }

    fn category(&self) -> EffectCategory {
        EffectCategory::Themed
    }

    fn apply(&self, frame: &mut Frame, params: &EffectParams, _scratch: &mut Scratch) {
        let factor = contrast_factor(params.contrast);
        let period = params.halftone_period.max(1);

        for (index, pixel) in frame.as_raw_mut().chunks_exact_mut(CHANNELS).enumerate() {
            let (r, g, b) = (pixel[0], pixel[1], pixel[2]);

            if index % period == 0 {
                // Halftone dots are judged and tinted from the input colour
                if brightness(r, g, b) < HALFTONE_INK_LEVEL {
                    pixel[..3].fill(0);
                } else {
                    pixel[0] = scale(r, 1.2);
                    pixel[1] = scale(g, 1.2);
                    pixel[2] = scale(b, 1.2);
                }
            } else {
                for channel in &mut pixel[..3] {
                    *channel = round_channel(factor * (*channel as f32 - 128.0) + 128.0);
                }
            }
        }
    }

    fn metadata(&self) -> EffectMetadata {
        EffectMetadata::per_pixel(
            0.2,
            &[
                ("contrast", "Contrast amount c (default 1.5)"),
                ("halftone_period", "Every n-th pixel becomes a halftone dot (default 4)"),
            ],
        )
    }
}

/// Vibrant colour with lifted shadows and a very light blur
pub struct PixarEffect;

impl Effect for PixarEffect {
    fn name(&self) -> &'static str {
        "Pixar"
    }

    fn description(&self) -> &'static str {
        "Pixar-style animation effect"
    }

    fn category(&self) -> EffectCategory {
        EffectCategory::Themed
    }

    fn apply(&self, frame: &mut Frame, params: &EffectParams, scratch: &mut Scratch) {
        for pixel in frame.as_raw_mut().chunks_exact_mut(CHANNELS) {
            let (r, g, b) = (pixel[0], pixel[1], pixel[2]);

            if brightness(r, g, b) < PIXAR_SHADOW_LEVEL {
                pixel[0] = scale(r, 1.2);
                pixel[1] = scale(g, 1.2);
                pixel[2] = scale(b, 1.2);
            } else {
                pixel[0] = scale(r, 1.1);
                pixel[1] = scale(g, 1.15);
                pixel[2] = scale(b, 1.1);
            }
        }

        gaussian_blur(frame, params.pixar_blur_radius, scratch);
    }

    fn metadata(&self) -> EffectMetadata {
        EffectMetadata::neighborhood(
            0.5,
            &[("pixar_blur_radius", "Gaussian blur radius (default 0.5)")],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(effect: &dyn Effect, frame: &mut Frame) {
        effect.apply(frame, &EffectParams::default(), &mut Scratch::new());
    }

    #[test]
    fn test_disney_softens_skin_and_boosts_the_rest() {
        // Uniform frames stay uniform through the blur
        let mut skin = Frame::new_filled(4, 4, [200, 150, 100, 255]);
        run(&DisneyEffect, &mut skin);
        assert_eq!(skin.get_pixel(2, 2), [180, 165, 110, 255]);

        let mut sky = Frame::new_filled(4, 4, [50, 100, 200, 255]);
        run(&DisneyEffect, &mut sky);
        assert_eq!(sky.get_pixel(1, 3), [60, 120, 240, 255]);
    }

    #[test]
    fn test_anime_uniform_has_no_outlines() {
        let mut frame = Frame::new_filled(6, 6, [100, 40, 200, 255]);
        run(&AnimeEffect, &mut frame);

        // Interior is quantized, border keeps the source colour
        assert_eq!(frame.get_pixel(2, 2), [96, 32, 192, 255]);
        assert_eq!(frame.get_pixel(0, 0), [100, 40, 200, 255]);
        assert_eq!(frame.get_pixel(5, 3), [100, 40, 200, 255]);
    }

    #[test]
    fn test_anime_outlines_a_step() {
        let mut frame = Frame::new_filled(6, 4, [20, 20, 20, 255]);
        for y in 0..4 {
            for x in 3..6 {
                frame.set_pixel(x, y, [220, 220, 220, 255]);
            }
        }

        run(&AnimeEffect, &mut frame);

        assert_eq!(frame.get_pixel(2, 1), [0, 0, 0, 255]);
        assert_eq!(frame.get_pixel(3, 2), [0, 0, 0, 255]);
        assert_eq!(frame.get_pixel(1, 1), [32, 32, 32, 255]);
        assert_eq!(frame.get_pixel(4, 2), [224, 224, 224, 255]);
    }

    #[test]
    fn test_comic_hero_halftone_every_fourth_pixel() {
        let mut frame = Frame::new_filled(8, 1, [100, 100, 100, 255]);
        run(&ComicHeroEffect, &mut frame);

        // Dark halftone dots at flat indices 0 and 4, contrast elsewhere
        assert_eq!(frame.get_pixel(0, 0), [0, 0, 0, 255]);
        assert_eq!(frame.get_pixel(4, 0), [0, 0, 0, 255]);
        assert_eq!(frame.get_pixel(1, 0), [100, 100, 100, 255]);

        let mut light = Frame::new_filled(4, 1, [150, 200, 250, 255]);
        run(&ComicHeroEffect, &mut light);
        assert_eq!(light.get_pixel(0, 0), [180, 240, 255, 255]);
        assert_eq!(light.get_pixel(1, 0), [150, 201, 251, 255]);
    }

    #[test]
    fn test_pixar_lifts_shadows() {
        let mut dark = Frame::new_filled(3, 3, [50, 60, 70, 255]);
        run(&PixarEffect, &mut dark);
        assert_eq!(dark.get_pixel(1, 1), [60, 72, 84, 255]);

        let mut light = Frame::new_filled(3, 3, [200, 200, 200, 255]);
        run(&PixarEffect, &mut light);
        assert_eq!(light.get_pixel(1, 1), [220, 230, 220, 255]);
    }
}
