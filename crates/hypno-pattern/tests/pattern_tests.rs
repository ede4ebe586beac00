use glam::Vec2;
use hypno_core::{FrameBuffer, FrameQueue, PatternSettings, PatternUpdate, SceneRunner, SettingsStore, Viewport};
use hypno_pattern::{
    analyser_channel, curve_count, fractal_pattern, rasterize, AudioError, FrequencySource, LayerCompositor,
    PatternScene, Shape2, PATTERN_VIEWPORT,
};

// ── Helpers ──────────────────────────────────────────────────────

struct Constant(Vec<f32>);

impl FrequencySource for Constant {
    fn latest(&mut self) -> &[f32] {
        &self.0
    }
}

fn constant(level: f32) -> Result<Box<dyn FrequencySource>, AudioError> {
    Ok(Box::new(Constant(vec![level; 128])))
}

/// Settings for the single-point, single-level scenario. `baseSpeed = 0` lies
/// below the stored range, so it is built directly rather than through a store.
fn scenario_settings() -> PatternSettings {
    PatternSettings {
        layer_count: 1,
        base_speed: 0.0,
        complexity: 1,
        pattern_depth: 1,
        ..PatternSettings::default()
    }
}

fn run(runner: &mut SceneRunner<PatternScene>, host: &mut FrameQueue, frames: usize) {
    let mut ts = 0.0;
    for _ in 0..frames {
        let Some(token) = host.pop_due() else { break };
        runner.on_frame(host, token, ts);
        ts += 16.0;
    }
}

// ── 1. Fractal generator ─────────────────────────────────────────

#[test]
fn curve_counts_per_depth() {
    let settings = PatternSettings::default();
    for (depth, expected) in [(1, 6), (2, 42), (3, 258)] {
        let curves = fractal_pattern(0.7, &settings, Vec2::ZERO, 150.0, depth);
        assert_eq!(curves.len(), expected, "depth {depth}");
        assert_eq!(curve_count(depth), expected);
    }
}

#[test]
fn generator_is_deterministic() {
    let settings = PatternSettings::default();
    let a = fractal_pattern(3.21, &settings, Vec2::new(10.0, -4.0), 150.0, 4);
    let b = fractal_pattern(3.21, &settings, Vec2::new(10.0, -4.0), 150.0, 4);
    assert_eq!(a, b);
}

#[test]
fn different_time_changes_the_pattern() {
    let settings = PatternSettings::default();
    let a = fractal_pattern(1.0, &settings, Vec2::ZERO, 150.0, 2);
    let b = fractal_pattern(1.5, &settings, Vec2::ZERO, 150.0, 2);
    assert_ne!(a, b);
}

// ── 2. Compositor ────────────────────────────────────────────────

#[test]
fn scenario_single_point_and_centered_curves() {
    let settings = scenario_settings();
    let compositor = LayerCompositor::new(PATTERN_VIEWPORT);
    let list = compositor.compose(0.0, &settings);

    let disc = &list.items[0];
    let Shape2::Disc { center, .. } = disc.shape else {
        panic!("first item should be the field point");
    };
    assert!((center - Vec2::new(200.0, 0.0)).length() < 1e-4);
    let on_surface = disc.transform.transform_point2(center);
    assert!((on_surface - Vec2::new(500.0, 300.0)).length() < 1e-3);

    let curves = fractal_pattern(0.0, &settings, Vec2::ZERO, 150.0, settings.pattern_depth);
    assert_eq!(curves.len(), 6);
    for curve in &curves {
        assert!(curve.center().length() < 1e-6);
        assert!(curve.rotation().abs() < 1e-6);
    }
}

#[test]
fn stored_base_speed_is_clamped() {
    let store = SettingsStore::new(scenario_settings());
    assert_eq!(store.get().base_speed, 0.1);
}

#[test]
fn composed_frame_is_deterministic() {
    let compositor = LayerCompositor::new(Viewport::new(200, 200));
    let settings = PatternSettings::default();
    assert_eq!(compositor.compose(2.5, &settings), compositor.compose(2.5, &settings));

    let mut a = FrameBuffer::new(Viewport::new(200, 200)).unwrap();
    let mut b = FrameBuffer::new(Viewport::new(200, 200)).unwrap();
    rasterize(&compositor.compose(2.5, &settings), &mut a);
    rasterize(&compositor.compose(2.5, &settings), &mut b);
    assert_eq!(a.data(), b.data());
}

#[test]
fn field_point_is_visible_and_corners_are_dark() {
    let mut fb = FrameBuffer::new(PATTERN_VIEWPORT).unwrap();
    let list = LayerCompositor::new(PATTERN_VIEWPORT).compose(0.0, &scenario_settings());
    rasterize(&list, &mut fb);

    let [r, g, _, a] = fb.pixel(500, 300).unwrap();
    assert_eq!(a, 255);
    assert!(r > 60 && r > g, "field point should be red-ish, got r={r} g={g}");

    let [r, g, b, _] = fb.pixel(0, 0).unwrap();
    assert!(r < 40 && g < 40 && b < 40);
}

// ── 3. Scene ─────────────────────────────────────────────────────

#[test]
fn runner_draws_frames_into_surface() {
    let mut host = FrameQueue::new();
    let mut runner = SceneRunner::new(PatternScene::with_viewport(PatternSettings::default(), Viewport::new(120, 120)).unwrap());
    runner.mount(&mut host);
    run(&mut runner, &mut host, 3);

    assert_eq!(runner.frames_rendered(), 3);
    // 7 layers × (16 points + 1554 curves) + 2 overlays + vignette
    assert_eq!(runner.scene().last_primitive_count(), 7 * (16 + 1554) + 3);
    let surface = runner.scene().surface().unwrap();
    assert!(surface.data().chunks(4).any(|px| px[0] > 0 || px[1] > 0 || px[2] > 0));
}

#[test]
fn control_surface_updates_are_clamped() {
    let mut host = FrameQueue::new();
    let mut runner = SceneRunner::new(PatternScene::with_viewport(PatternSettings::default(), Viewport::new(32, 32)).unwrap());
    let handle = runner.scene().handle();
    handle.send(PatternUpdate::PatternDepth(-3.0));
    handle.send(PatternUpdate::LayerCount(12.4));
    handle.send(PatternUpdate::ColorIntensity(-5.0));

    runner.mount(&mut host);
    run(&mut runner, &mut host, 1);

    let settings = runner.scene().frame_settings();
    assert_eq!(settings.pattern_depth, 1);
    assert_eq!(settings.layer_count, 10);
    assert_eq!(settings.color_intensity, 0.0);
}

#[test]
fn audio_overrides_do_not_touch_the_store() {
    let mut host = FrameQueue::new();
    let mut runner = SceneRunner::new(PatternScene::with_viewport(PatternSettings::default(), Viewport::new(32, 32)).unwrap());
    assert!(runner.scene_mut().enable_audio(|| constant(1000.0)));

    runner.mount(&mut host);
    run(&mut runner, &mut host, 1);

    let scene = runner.scene();
    assert_eq!(scene.frame_settings().pulse_speed, 5.0);
    assert_eq!(scene.frame_settings().color_intensity, 100.0);
    assert_eq!(scene.store().get().pulse_speed, 2.0);
    assert_eq!(scene.store().get().color_intensity, 70.0);
}

#[test]
fn silent_analyser_clamps_to_minimum() {
    let (pcm, source) = analyser_channel(256).unwrap();
    let mut scene = PatternScene::with_viewport(PatternSettings::default(), Viewport::new(32, 32)).unwrap();
    assert!(scene.enable_audio(move || Ok(Box::new(source) as Box<dyn FrequencySource>)));
    pcm.send(vec![0.0; 256]).unwrap();

    let mut host = FrameQueue::new();
    let mut runner = SceneRunner::new(scene);
    runner.mount(&mut host);
    run(&mut runner, &mut host, 1);

    // Silence is −100 dB in every bin
    assert_eq!(runner.scene().frame_settings().pulse_speed, 0.5);
    assert_eq!(runner.scene().frame_settings().color_intensity, 50.0);
}

#[test]
fn teardown_releases_surface_and_audio() {
    let mut host = FrameQueue::new();
    let mut runner = SceneRunner::new(PatternScene::with_viewport(PatternSettings::default(), Viewport::new(32, 32)).unwrap());
    runner.scene_mut().enable_audio(|| constant(10.0));
    runner.mount(&mut host);
    runner.teardown(&mut host);

    assert!(host.is_idle());
    assert!(runner.scene().surface().is_none());
    assert!(!runner.scene().audio().is_enabled());
}
