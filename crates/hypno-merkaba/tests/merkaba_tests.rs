use glam::Vec3;
use hypno_core::{ColorField, FrameQueue, MerkabaSettings, MerkabaUpdate, ResizeBus, Rgb, SceneRunner, Viewport};
use hypno_merkaba::{GeometryAssembler, MerkabaScene, INITIAL_ORIENTATION};

// ── Helpers ──────────────────────────────────────────────────────

const VIEWPORT: Viewport = Viewport::new(160, 120);

fn run(runner: &mut SceneRunner<MerkabaScene>, host: &mut FrameQueue, frames: usize) {
    let mut ts = 0.0;
    for _ in 0..frames {
        let Some(token) = host.pop_due() else { break };
        runner.on_frame(host, token, ts);
        ts += 16.0;
    }
}

fn mounted(settings: MerkabaSettings) -> (SceneRunner<MerkabaScene>, FrameQueue) {
    let mut host = FrameQueue::new();
    let mut runner = SceneRunner::new(MerkabaScene::new(settings, VIEWPORT).unwrap());
    runner.mount(&mut host);
    (runner, host)
}

// ── 1. Rebuild idempotence ───────────────────────────────────────

#[test]
fn identical_settings_give_identical_vertices() {
    let assembler = GeometryAssembler::new();
    let settings = MerkabaSettings::default();
    let a = assembler.build(&settings, VIEWPORT);
    let b = assembler.build(&settings, VIEWPORT);
    assert_eq!(a.vertex_positions(), b.vertex_positions());
    assert_eq!(a, b);
}

#[test]
fn rebuild_a_b_a_restores_vertices() {
    let assembler = GeometryAssembler::new();
    let a = MerkabaSettings::default();
    let b = MerkabaSettings {
        size: 9.0,
        show_solid_polygons: true,
        ..MerkabaSettings::default()
    };

    let first = assembler.build(&a, VIEWPORT).vertex_positions();
    let other = assembler.build(&b, VIEWPORT).vertex_positions();
    let again = assembler.build(&a, VIEWPORT).vertex_positions();

    assert_ne!(first, other);
    assert_eq!(first, again);
}

#[test]
fn scene_rebuild_round_trip_through_store() {
    let (mut runner, mut host) = mounted(MerkabaSettings::default());
    run(&mut runner, &mut host, 1);
    let original = runner.scene().graph().vertex_positions();

    let handle = runner.scene().handle();
    handle.send(MerkabaUpdate::Size(2.0));
    run(&mut runner, &mut host, 1);
    assert_ne!(runner.scene().graph().vertex_positions(), original);

    handle.send(MerkabaUpdate::Size(5.0));
    run(&mut runner, &mut host, 1);
    assert_eq!(runner.scene().graph().vertex_positions(), original);
    assert_eq!(runner.scene().rebuild_count(), 2);
}

// ── 2. Rotation ──────────────────────────────────────────────────

#[test]
fn rotation_only_change_keeps_vertices() {
    let (mut runner, mut host) = mounted(MerkabaSettings::default());
    run(&mut runner, &mut host, 1);
    let vertices = runner.scene().graph().vertex_positions();
    let orientation = runner.scene().graph().group.rotation;

    runner.scene().handle().send(MerkabaUpdate::RotationSpeed(0.08));
    run(&mut runner, &mut host, 1);

    let graph = runner.scene().graph();
    assert_eq!(graph.vertex_positions(), vertices);
    assert_eq!(runner.scene().rebuild_count(), 0);
    assert!((graph.group.rotation.x - (orientation.x + 0.08)).abs() < 1e-6);
    assert!((graph.group.rotation.y - (orientation.y + 0.08)).abs() < 1e-6);
}

#[test]
fn rotation_advances_per_frame_and_resets_on_rebuild() {
    let (mut runner, mut host) = mounted(MerkabaSettings::default());
    run(&mut runner, &mut host, 10);
    let rotation = runner.scene().graph().group.rotation;
    assert!((rotation.x - (INITIAL_ORIENTATION.x + 0.1)).abs() < 1e-5);

    runner.scene().handle().send(MerkabaUpdate::ShowGrid(true));
    run(&mut runner, &mut host, 1);
    // Fresh graph starts from the initial tilt, then integrates this frame
    let rotation = runner.scene().graph().group.rotation;
    assert!((rotation.x - (INITIAL_ORIENTATION.x + 0.01)).abs() < 1e-5);
    assert!(runner.scene().graph().grid.is_some());
}

#[test]
fn paused_scene_does_not_rotate() {
    let (mut runner, mut host) = mounted(MerkabaSettings::default());
    run(&mut runner, &mut host, 2);
    runner.pause(&mut host);
    let frozen = runner.scene().graph().group.rotation;

    runner.request_redraw(&mut host);
    run(&mut runner, &mut host, 3);
    assert_eq!(runner.scene().graph().group.rotation, frozen);
}

#[test]
fn paused_scene_redraws_once_for_queued_writes() {
    let (mut runner, mut host) = mounted(MerkabaSettings::default());
    run(&mut runner, &mut host, 3);
    runner.pause(&mut host);
    let frozen = runner.scene().graph().group.rotation;
    let frames = runner.frames_rendered();
    assert!(!runner.poll_changes(&mut host));

    runner.scene().handle().send(MerkabaUpdate::ShowSolidPolygons(true));
    assert!(runner.poll_changes(&mut host));
    run(&mut runner, &mut host, 5);

    assert_eq!(runner.frames_rendered(), frames + 1);
    assert_eq!(runner.scene().rebuild_count(), 1);
    assert_eq!(runner.scene().graph().solid_count(), 4);
    // Fresh graph, not rotated while paused
    assert_eq!(runner.scene().graph().group.rotation, INITIAL_ORIENTATION);
    assert_ne!(runner.scene().graph().group.rotation, frozen);
    assert!(host.is_idle());
}

// ── 3. Rendering and lifecycle ───────────────────────────────────

#[test]
fn markers_render_in_sphere_color() {
    let settings = MerkabaSettings {
        sphere_color: Rgb::new(0, 255, 0),
        background_color: Rgb::BLACK,
        ..MerkabaSettings::default()
    };
    let (mut runner, mut host) = mounted(settings);
    run(&mut runner, &mut host, 1);

    let stats = runner.scene().last_stats();
    assert_eq!(stats.markers, 8);
    let surface = runner.scene().surface().unwrap();
    let green = surface
        .data()
        .chunks(4)
        .filter(|px| px[1] > 200 && px[0] < 50 && px[2] < 50)
        .count();
    assert!(green > 0, "expected marker pixels");
}

#[test]
fn color_update_from_control_surface_rebuilds() {
    let (mut runner, mut host) = mounted(MerkabaSettings::default());
    let update = MerkabaUpdate::from_field("solidPolygonColor", "#0000ff").unwrap();
    assert_eq!(update, MerkabaUpdate::Color(ColorField::SolidPolygon, Rgb::new(0, 0, 255)));
    runner.scene().handle().send(update);
    run(&mut runner, &mut host, 1);
    assert_eq!(runner.scene().rebuild_count(), 1);

    // Invalid colors never reach the store
    assert!(MerkabaUpdate::from_field("sphereColor", "#zzzzzz").is_none());
}

#[test]
fn grid_lies_on_ground_plane() {
    let graph = GeometryAssembler::new().build(
        &MerkabaSettings {
            show_grid: true,
            ..MerkabaSettings::default()
        },
        VIEWPORT,
    );
    let grid = graph.grid.unwrap();
    assert!(grid.lines().iter().all(|(a, b, _)| a.y == 0.0 && b.y == 0.0));
    // The grid is not part of the rotating group
    assert!(!graph.vertex_positions().contains(&Vec3::new(-100.0, 0.0, -100.0)));
}

#[test]
fn teardown_releases_surface_and_resize_listener() {
    let bus = ResizeBus::new();
    let mut host = FrameQueue::new();
    let mut scene = MerkabaScene::new(MerkabaSettings::default(), VIEWPORT).unwrap();
    scene.attach_resize(&bus);
    let mut runner = SceneRunner::new(scene);

    runner.mount(&mut host);
    run(&mut runner, &mut host, 2);
    runner.teardown(&mut host);

    assert!(host.is_idle());
    assert_eq!(bus.listener_count(), 0);
    assert!(runner.scene().surface().is_none());
    assert!(!runner.scene().is_listening_for_resize());
}

#[test]
fn host_resize_reaches_the_scene() {
    let bus = ResizeBus::new();
    let mut host = FrameQueue::new();
    let mut scene = MerkabaScene::new(MerkabaSettings::default(), VIEWPORT).unwrap();
    scene.attach_resize(&bus);
    let mut runner = SceneRunner::new(scene);
    runner.mount(&mut host);

    bus.publish(Viewport::new(320, 80));
    run(&mut runner, &mut host, 1);
    assert_eq!(runner.scene().viewport(), Viewport::new(320, 80));
    assert_eq!(runner.scene().graph().camera.aspect, 4.0);
}
