use crate::{
    effects::pixel::{brightness, quantize, scale},
    effects::traits::{Effect, EffectCategory, EffectMetadata, EffectParams},
    video::{Frame, Scratch, CHANNELS},
};

use super::{COMIC_BOOK_WHITE_SUM, MAX_OIL_RADIUS};

/// Blocky mosaic: each N×N block takes its top-left colour
pub struct PixelArtEffect;

impl Effect for PixelArtEffect {
    fn name(&self) -> &'static str {
        "Pixel Art"
    }

    fn description(&self) -> &'static str {
        "Convert image to pixel art style"
    }

    fn category(&self) -> EffectCategory {
        EffectCategory::Artistic
    }

    fn apply(&self, frame: &mut Frame, params: &EffectParams, _scratch: &mut Scratch) {
        let width = frame.width() as usize;
        let height = frame.height() as usize;
        let block = params.pixel_block_size.max(1) as usize;
        let pixels = frame.as_raw_mut();

        for by in (0..height).step_by(block) {
            for bx in (0..width).step_by(block) {
                // The top-left pixel is read before its block is overwritten
                let origin = (by * width + bx) * CHANNELS;
                let colour = [pixels[origin], pixels[origin + 1], pixels[origin + 2], 255];

                for y in by..(by + block).min(height) {
                    let start = (y * width + bx) * CHANNELS;
                    let end = (y * width + (bx + block).min(width)) * CHANNELS;
                    for pixel in pixels[start..end].chunks_exact_mut(CHANNELS) {
                        pixel.copy_from_slice(&colour);
                    }
                }
            }
        }
    }

    fn metadata(&self) -> EffectMetadata {
        EffectMetadata::per_pixel(0.1, &[("pixel_block_size", "Block edge in pixels (default 10)")])
    }
}

/// Flat cel colours with black outlines where red jumps along a row
pub struct CartoonEffect;

impl Effect for CartoonEffect {
    fn name(&self) -> &'static str {
        "Cartoon"
    }

    fn description(&self) -> &'static str {
        "Cartoon-style effect with edge detection"
    }

    fn category(&self) -> EffectCategory {
        EffectCategory::Artistic
    }

    fn apply(&self, frame: &mut Frame, params: &EffectParams, _scratch: &mut Scratch) {
        let width = frame.width() as usize;
        if width == 0 {
            return;
        }
        let step = params.cel_step;
        let threshold = params.cartoon_edge_threshold;

        for row in frame.as_raw_mut().chunks_exact_mut(width * CHANNELS) {
            // Quantized red of the previous pixel, before any outline was drawn
            let mut previous_red: Option<u8> = None;

            for pixel in row.chunks_exact_mut(CHANNELS) {
                for channel in &mut pixel[..3] {
                    *channel = quantize(*channel, step);
                }

                let red = pixel[0];
                if previous_red.is_some_and(|prev| prev.abs_diff(red) > threshold) {
                    pixel[..3].fill(0);
                }
                previous_red = Some(red);
            }
        }
    }

    fn metadata(&self) -> EffectMetadata {
        EffectMetadata::per_pixel(
            0.15,
            &[
                ("cel_step", "Quantization step (default 32)"),
                ("cartoon_edge_threshold", "Red jump that draws an outline (default 30)"),
            ],
        )
    }
}

/// Box-averages colour over a square neighbourhood
///
/// Border pixels read clamped neighbours, so every pixel is painted.
pub struct OilPaintingEffect;

impl Effect for OilPaintingEffect {
    fn name(&self) -> &'static str {
        "Oil Painting"
    }

    fn description(&self) -> &'static str {
        "Convert image to oil painting style"
    }

    fn category(&self) -> EffectCategory {
        EffectCategory::Artistic
    }

    fn apply(&self, frame: &mut Frame, params: &EffectParams, scratch: &mut Scratch) {
        let radius = params.oil_radius.min(MAX_OIL_RADIUS) as isize;
        if radius == 0 || frame.is_empty() {
            return;
        }

        let width = frame.width() as usize;
        let height = frame.height() as usize;
        let count = ((2 * radius + 1) * (2 * radius + 1)) as u64;

        // Horizontal window sums of R, G, B
        let sums = scratch.sums(width * height * 3);
        let source = frame.as_raw();
        for y in 0..height {
            for x in 0..width {
                let mut acc = [0u64; 3];
                for dx in -radius..=radius {
                    let px = (x as isize + dx).clamp(0, width as isize - 1) as usize;
                    let idx = (y * width + px) * CHANNELS;
                    for (c, sum) in acc.iter_mut().enumerate() {
                        *sum += source[idx + c] as u64;
                    }
                }
                sums[(y * width + x) * 3..][..3].copy_from_slice(&acc);
            }
        }

        // Vertical window over the row sums, rounded half up
        let output = frame.as_raw_mut();
        for y in 0..height {
            for x in 0..width {
                let mut acc = [0u64; 3];
                for dy in -radius..=radius {
                    let py = (y as isize + dy).clamp(0, height as isize - 1) as usize;
                    let idx = (py * width + x) * 3;
                    for (c, sum) in acc.iter_mut().enumerate() {
                        *sum += sums[idx + c];
                    }
                }

                let target = (y * width + x) * CHANNELS;
                for (c, sum) in acc.iter().enumerate() {
                    output[target + c] = ((sum + count / 2) / count).min(255) as u8;
                }
            }
        }
    }

    fn metadata(&self) -> EffectMetadata {
        EffectMetadata::neighborhood(0.6, &[("oil_radius", "Neighbourhood radius (default 3)")])
    }
}

/// Posterizes, then binarizes every pixel to black or white
pub struct ComicBookEffect;

impl Effect for ComicBookEffect {
    fn name(&self) -> &'static str {
        "Comic Book"
    }

    fn description(&self) -> &'static str {
        "Comic book style with posterization"
    }

    fn category(&self) -> EffectCategory {
        EffectCategory::Artistic
    }

    fn apply(&self, frame: &mut Frame, params: &EffectParams, _scratch: &mut Scratch) {
        let step = params.poster_step;

        for pixel in frame.as_raw_mut().chunks_exact_mut(CHANNELS) {
            let sum: u32 = pixel[..3].iter().map(|&v| quantize(v, step) as u32).sum();
            let ink = if sum >= COMIC_BOOK_WHITE_SUM { 255 } else { 0 };
            pixel[..3].fill(ink);
        }
    }

    fn metadata(&self) -> EffectMetadata {
        EffectMetadata::per_pixel(0.1, &[("poster_step", "Posterization step (default 64)")])
    }
}

/// Boosted colours with bright areas blown out to white
pub struct NeonEffect;

impl Effect for NeonEffect {
    fn name(&self) -> &'static str {
        "Neon"
    }

    fn description(&self) -> &'static str {
        "Add neon glow effect to image"
    }

    fn category(&self) -> EffectCategory {
        EffectCategory::Artistic
    }

    fn apply(&self, frame: &mut Frame, params: &EffectParams, _scratch: &mut Scratch) {
        let boost = params.neon_boost;
        let glow = params.neon_glow_threshold;

        for pixel in frame.as_raw_mut().chunks_exact_mut(CHANNELS) {
            for channel in &mut pixel[..3] {
                *channel = scale(*channel, boost);
            }
            if brightness(pixel[0], pixel[1], pixel[2]) > glow {
                pixel[..3].fill(255);
            }
        }
    }

    fn metadata(&self) -> EffectMetadata {
        EffectMetadata::per_pixel(
            0.1,
            &[
                ("neon_boost", "Channel multiplier (default 1.5)"),
                ("neon_glow_threshold", "Post-boost brightness that glows white (default 200)"),
            ],
        )
    }
}
