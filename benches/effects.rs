use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use filter_booth::{
    effects::{EffectKind, EffectParams},
    video::{Frame, Scratch, StreamConstraints, TestPatternSource, VideoSource},
};

fn camera_frame() -> Frame {
    let mut source = TestPatternSource::new();
    let mut frame = Frame::new_blank(0, 0);
    source.open(&StreamConstraints::basic()).unwrap();
    source.read_frame(&mut frame).unwrap();
    frame
}

fn bench_effects(c: &mut Criterion) {
    let source = camera_frame();
    let params = EffectParams::default();
    let mut group = c.benchmark_group("effects_640x480");

    for kind in EffectKind::ALL {
        let mut frame = source.clone();
        let mut scratch = Scratch::new();

        group.bench_with_input(BenchmarkId::from_parameter(kind.name()), &kind, |b, kind| {
            b.iter(|| {
                frame.copy_from(&source);
                kind.apply(black_box(&mut frame), &params, &mut scratch);
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_effects);
criterion_main!(benches);
