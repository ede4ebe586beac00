use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Vec2;
use hypno_core::{FrameBuffer, PatternSettings};
use hypno_pattern::{fractal_pattern, rasterize, LayerCompositor, SpectrumAnalyser, PATTERN_VIEWPORT};

fn bench_fractal_depth_4(c: &mut Criterion) {
    let settings = PatternSettings::default();
    c.bench_function("fractal_depth_4", |b| {
        b.iter(|| fractal_pattern(black_box(1.25), &settings, Vec2::ZERO, 150.0, 4));
    });
}

fn bench_compose_default(c: &mut Criterion) {
    let settings = PatternSettings::default();
    let compositor = LayerCompositor::new(PATTERN_VIEWPORT);
    c.bench_function("compose_default", |b| {
        b.iter(|| compositor.compose(black_box(1.25), &settings));
    });
}

fn bench_rasterize_default(c: &mut Criterion) {
    let settings = PatternSettings::default();
    let list = LayerCompositor::new(PATTERN_VIEWPORT).compose(1.25, &settings);
    let mut fb = FrameBuffer::new(PATTERN_VIEWPORT).unwrap();
    c.bench_function("rasterize_600", |b| {
        b.iter(|| rasterize(black_box(&list), &mut fb));
    });
}

fn bench_spectrum(c: &mut Criterion) {
    let mut analyser = SpectrumAnalyser::new(256).unwrap();
    let block: Vec<f32> = (0..256).map(|i| (i as f32 * 0.3).sin()).collect();
    c.bench_function("spectrum_256", |b| {
        b.iter(|| {
            analyser.push_samples(black_box(&block));
            black_box(analyser.analyse()[0]);
        });
    });
}

criterion_group!(
    benches,
    bench_fractal_depth_4,
    bench_compose_default,
    bench_rasterize_default,
    bench_spectrum
);
criterion_main!(benches);
