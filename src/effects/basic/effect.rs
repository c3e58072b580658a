use crate::{
    effects::pixel::{brightness, contrast_factor, round_channel, scale},
    effects::traits::{Effect, EffectCategory, EffectMetadata, EffectParams},
    video::{Frame, Scratch, CHANNELS},
};

use super::{RAINBOW_STOPS, SEPIA};

/// Leaves the frame untouched
pub struct NormalEffect;

impl Effect for NormalEffect {
    fn name(&self) -> &'static str {
        "Normal"
    }

    fn description(&self) -> &'static str {
        "No filter effect"
    }

    fn category(&self) -> EffectCategory {
        EffectCategory::Basic
    }

    fn apply(&self, _frame: &mut Frame, _params: &EffectParams, _scratch: &mut Scratch) {}

    fn metadata(&self) -> EffectMetadata {
        EffectMetadata::per_pixel(0.0, &[])
    }
}

/// Replaces R, G and B with their unweighted average
pub struct BlackAndWhiteEffect;

impl Effect for BlackAndWhiteEffect {
    fn name(&self) -> &'static str {
        "Black & White"
    }

    fn description(&self) -> &'static str {
        "Convert image to grayscale"
    }

    fn category(&self) -> EffectCategory {
        EffectCategory::Basic
    }

    fn apply(&self, frame: &mut Frame, _params: &EffectParams, _scratch: &mut Scratch) {
        for pixel in frame.as_raw_mut().chunks_exact_mut(CHANNELS) {
            let avg = round_channel(brightness(pixel[0], pixel[1], pixel[2]));
            pixel[..3].fill(avg);
        }
    }

    fn metadata(&self) -> EffectMetadata {
        EffectMetadata::per_pixel(0.1, &[])
    }
}

/// Multiplies every colour channel, saturating at white
pub struct BrightnessEffect;

impl Effect for BrightnessEffect {
    fn name(&self) -> &'static str {
        "Brightness"
    }

    fn description(&self) -> &'static str {
        "Increase image brightness"
    }

    fn category(&self) -> EffectCategory {
        EffectCategory::Basic
    }

    fn apply(&self, frame: &mut Frame, params: &EffectParams, _scratch: &mut Scratch) {
        let factor = params.brightness_factor;
        for pixel in frame.as_raw_mut().chunks_exact_mut(CHANNELS) {
            for channel in &mut pixel[..3] {
                *channel = scale(*channel, factor);
            }
        }
    }

    fn metadata(&self) -> EffectMetadata {
        EffectMetadata::per_pixel(
            0.1,
            &[("brightness_factor", "Channel multiplier (default 1.5)")],
        )
    }
}

/// Linear contrast stretch around mid-grey
pub struct ContrastEffect;

impl Effect for ContrastEffect {
    fn name(&self) -> &'static str {
        "Contrast"
    }

    fn description(&self) -> &'static str {
        "Enhance image contrast"
    }

    fn category(&self) -> EffectCategory {
        EffectCategory::Basic
    }

    fn apply(&self, frame: &mut Frame, params: &EffectParams, _scratch: &mut Scratch) {
        let factor = contrast_factor(params.contrast);
        for pixel in frame.as_raw_mut().chunks_exact_mut(CHANNELS) {
            for channel in &mut pixel[..3] {
                *channel = round_channel(factor * (*channel as f32 - 128.0) + 128.0);
            }
        }
    }

    fn metadata(&self) -> EffectMetadata {
        EffectMetadata::per_pixel(0.1, &[("contrast", "Contrast amount c (default 1.5)")])
    }
}

/// Classic sepia tone through a fixed colour matrix
pub struct VintageEffect;

impl Effect for VintageEffect {
    fn name(&self) -> &'static str {
        "Vintage"
    }

    fn description(&self) -> &'static str {
        "Classic sepia tone effect"
    }

    fn category(&self) -> EffectCategory {
        EffectCategory::Basic
    }

    fn apply(&self, frame: &mut Frame, _params: &EffectParams, _scratch: &mut Scratch) {
        for pixel in frame.as_raw_mut().chunks_exact_mut(CHANNELS) {
            let (r, g, b) = (pixel[0] as f32, pixel[1] as f32, pixel[2] as f32);
            for (channel, row) in pixel[..3].iter_mut().zip(SEPIA.iter()) {
                *channel = round_channel(r * row[0] + g * row[1] + b * row[2]);
            }
        }
    }

    fn metadata(&self) -> EffectMetadata {
        EffectMetadata::per_pixel(0.15, &[])
    }
}

/// Washes the frame with a translucent left-to-right rainbow
///
/// The gradient depends only on the column, never on pixel content.
pub struct RainbowEffect;

impl RainbowEffect {
    /// Gradient colour at offset `t` in [0, 1]
    fn gradient_at(t: f32) -> [f32; 3] {
        let t = t.clamp(0.0, 1.0);
        let upper = RAINBOW_STOPS
            .iter()
            .position(|(offset, _)| *offset >= t)
            .unwrap_or(RAINBOW_STOPS.len() - 1)
            .max(1);
        let (start, from) = RAINBOW_STOPS[upper - 1];
        let (end, to) = RAINBOW_STOPS[upper];
        let mix = ((t - start) / (end - start)).clamp(0.0, 1.0);

        [0, 1, 2].map(|c| from[c] as f32 + (to[c] as f32 - from[c] as f32) * mix)
    }
}

impl Effect for RainbowEffect {
    fn name(&self) -> &'static str {
        "Rainbow"
    }

    fn description(&self) -> &'static str {
        "Add colorful rainbow gradient overlay"
    }

    fn category(&self) -> EffectCategory {
        EffectCategory::Basic
    }

    fn apply(&self, frame: &mut Frame, params: &EffectParams, _scratch: &mut Scratch) {
        let width = frame.width() as usize;
        if width == 0 {
            return;
        }
        let src_alpha = params.rainbow_opacity.clamp(0.0, 1.0);
        let pixels = frame.as_raw_mut();

        // Source-over compositing of the gradient onto each pixel
        for x in 0..width {
            let t = (x as f32 + 0.5) / width as f32;
            let wash = Self::gradient_at(t);

            for pixel in pixels.chunks_exact_mut(CHANNELS).skip(x).step_by(width) {
                let dst_alpha = pixel[3] as f32 / 255.0;
                let out_alpha = src_alpha + dst_alpha * (1.0 - src_alpha);
                if out_alpha <= 0.0 {
                    continue;
                }
                for c in 0..3 {
                    let blended = (wash[c] * src_alpha
                        + pixel[c] as f32 * dst_alpha * (1.0 - src_alpha))
                        / out_alpha;
                    pixel[c] = round_channel(blended);
                }
                pixel[3] = round_channel(out_alpha * 255.0);
            }
        }
    }

    fn metadata(&self) -> EffectMetadata {
        EffectMetadata::per_pixel(
            0.2,
            &[("rainbow_opacity", "Opacity of the gradient wash (default 0.2)")],
        )
    }
}
