use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hypno_core::{FrameContext, FrameQueue, PatternSettings, PatternUpdate, Scene, SceneRunner, SettingsStore};

struct NullScene;

impl Scene for NullScene {
    fn update(&mut self, ctx: &FrameContext) {
        black_box(ctx);
    }

    fn render(&mut self, _ctx: &FrameContext) {}

    fn release(&mut self) {}
}

fn bench_runner_1000_frames(c: &mut Criterion) {
    c.bench_function("runner_1000_frames", |b| {
        b.iter(|| {
            let mut host = FrameQueue::new();
            let mut runner = SceneRunner::new(NullScene);
            runner.mount(&mut host);
            let mut ts = 0.0;
            while let Some(token) = host.pop_due() {
                runner.on_frame(&mut host, token, ts);
                ts += 16.0;
                if runner.frames_rendered() >= 1000 {
                    break;
                }
            }
            black_box(runner.time());
        });
    });
}

fn bench_store_drain_100(c: &mut Criterion) {
    c.bench_function("store_drain_100", |b| {
        b.iter(|| {
            let mut store = SettingsStore::new(PatternSettings::default());
            let handle = store.handle();
            for i in 0..100 {
                handle.send(PatternUpdate::BaseSpeed(i as f32 * 0.05));
            }
            black_box(store.drain_pending());
        });
    });
}

criterion_group!(benches, bench_runner_1000_frames, bench_store_drain_100);
criterion_main!(benches);
