//! Channel arithmetic shared by the effects.
//!
//! Every float-to-byte conversion in the catalog goes through
//! [`round_channel`], which rounds half up and saturates to [0, 255].

/// Round half up and clamp into a channel value
#[inline]
pub fn round_channel(value: f32) -> u8 {
    (value + 0.5).floor().clamp(0.0, 255.0) as u8
}

/// Multiply a channel, saturating at 255
#[inline]
pub fn scale(value: u8, factor: f32) -> u8 {
    round_channel(value as f32 * factor)
}

/// Snap a channel to the nearest multiple of `step`, saturating at 255
#[inline]
pub fn quantize(value: u8, step: u8) -> u8 {
    let step = step.max(1) as u32;
    let snapped = (value as u32 + step / 2) / step * step;
    snapped.min(255) as u8
}

/// Unweighted average of the colour channels
#[inline]
pub fn brightness(r: u8, g: u8, b: u8) -> f32 {
    (r as f32 + g as f32 + b as f32) / 3.0
}

/// Contrast multiplier for a contrast amount `c`
#[inline]
pub fn contrast_factor(c: f32) -> f32 {
    259.0 * (c + 255.0) / (255.0 * (259.0 - c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_channel_rounds_half_up() {
        assert_eq!(round_channel(127.5), 128);
        assert_eq!(round_channel(127.49), 127);
        assert_eq!(round_channel(-3.0), 0);
        assert_eq!(round_channel(300.0), 255);
    }

    #[test]
    fn test_quantize() {
        assert_eq!(quantize(15, 32), 0);
        assert_eq!(quantize(16, 32), 32);
        assert_eq!(quantize(100, 32), 96);
        assert_eq!(quantize(250, 32), 255);
        assert_eq!(quantize(95, 64), 64);
        assert_eq!(quantize(96, 64), 128);
    }

    #[test]
    fn test_contrast_factor_is_slightly_above_one() {
        let factor = contrast_factor(1.5);
        assert!((factor - 1.011_742).abs() < 1e-5);
        assert_eq!(contrast_factor(0.0), 1.0);
    }
}
