//! Buffer-wide properties every effect must hold.

use proptest::prelude::*;

use crate::effects::{EffectKind, EffectParams};
use crate::video::{Frame, Scratch, CHANNELS};

fn arb_frame() -> impl Strategy<Value = Frame> {
    (1u32..24, 1u32..24).prop_flat_map(|(width, height)| {
        let len = (width * height) as usize * CHANNELS;
        proptest::collection::vec(any::<u8>(), len).prop_map(move |bytes| {
            Frame::from_rgba_bytes(width, height, bytes).expect("length matches geometry")
        })
    })
}

fn arb_kind() -> impl Strategy<Value = EffectKind> {
    (0..EffectKind::ALL.len()).prop_map(|i| EffectKind::ALL[i])
}

proptest! {
    #[test]
    fn prop_geometry_is_preserved(frame in arb_frame(), kind in arb_kind()) {
        let mut out = frame.clone();
        kind.apply(&mut out, &EffectParams::default(), &mut Scratch::new());
        prop_assert_eq!(out.geometry(), frame.geometry());
        prop_assert_eq!(out.as_raw().len(), frame.as_raw().len());
    }

    #[test]
    fn prop_black_and_white_has_equal_channels(frame in arb_frame()) {
        let mut out = frame.clone();
        EffectKind::BlackAndWhite.apply(&mut out, &EffectParams::default(), &mut Scratch::new());

        for (after, before) in out.as_raw().chunks_exact(CHANNELS).zip(frame.as_raw().chunks_exact(CHANNELS)) {
            prop_assert_eq!(after[0], after[1]);
            prop_assert_eq!(after[1], after[2]);
            prop_assert_eq!(after[3], before[3]);
        }
    }

    #[test]
    fn prop_normal_is_identity(frame in arb_frame()) {
        let mut out = frame.clone();
        EffectKind::Normal.apply(&mut out, &EffectParams::default(), &mut Scratch::new());
        prop_assert_eq!(out, frame);
    }

    #[test]
    fn prop_uniform_frames_survive_neighbourhood_effects(
        width in 1u32..20,
        height in 1u32..20,
        colour in any::<[u8; 4]>(),
    ) {
        let params = EffectParams::default();
        let mut scratch = Scratch::new();

        for kind in [EffectKind::OilPainting, EffectKind::PixelArt] {
            let mut frame = Frame::new_filled(width, height, [colour[0], colour[1], colour[2], 255]);
            kind.apply(&mut frame, &params, &mut scratch);
            prop_assert_eq!(frame, Frame::new_filled(width, height, [colour[0], colour[1], colour[2], 255]));
        }

        // Blur touches alpha too, so any uniform RGBA survives it
        let mut frame = Frame::new_filled(width, height, colour);
        crate::effects::blur::gaussian_blur(&mut frame, 2.5, &mut scratch);
        prop_assert_eq!(frame, Frame::new_filled(width, height, colour));
    }

    #[test]
    fn prop_comic_book_is_binary(frame in arb_frame()) {
        let mut out = frame;
        EffectKind::ComicBook.apply(&mut out, &EffectParams::default(), &mut Scratch::new());
        for pixel in out.as_raw().chunks_exact(CHANNELS) {
            prop_assert!(pixel[..3] == [0, 0, 0] || pixel[..3] == [255, 255, 255]);
        }
    }
}
