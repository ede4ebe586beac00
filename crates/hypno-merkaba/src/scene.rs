use hypno_core::{
    FrameBuffer, FrameContext, MerkabaSettings, MerkabaUpdate, ResizeBus, ResizeSubscription, Scene, SettingsHandle,
    SettingsStore, SurfaceError, Viewport,
};

use crate::assembler::GeometryAssembler;
use crate::graph::SceneGraph;
use crate::render::{RenderStats, SoftwareRenderer};
use crate::rotation::RotationIntegrator;

/// The 3D interlocking-tetrahedra scene.
pub struct MerkabaScene {
    store: SettingsStore<MerkabaSettings>,
    assembler: GeometryAssembler,
    graph: SceneGraph,
    /// Settings the current graph was built from.
    built_from: MerkabaSettings,
    integrator: RotationIntegrator,
    renderer: Option<SoftwareRenderer>,
    resize: Option<ResizeSubscription>,
    viewport: Viewport,
    rebuilds: u64,
    last_stats: RenderStats,
}

impl MerkabaScene {
    pub fn new(settings: MerkabaSettings, viewport: Viewport) -> Result<Self, SurfaceError> {
        let renderer = SoftwareRenderer::new(viewport)?;
        let store = SettingsStore::new(settings);
        let assembler = GeometryAssembler::new();
        let built_from = store.snapshot();
        let graph = assembler.build(&built_from, viewport);
        Ok(Self {
            store,
            assembler,
            graph,
            built_from,
            integrator: RotationIntegrator::new(),
            renderer: Some(renderer),
            resize: None,
            viewport,
            rebuilds: 0,
            last_stats: RenderStats::default(),
        })
    }

    /// Follow host resize events from `bus` until release.
    pub fn attach_resize(&mut self, bus: &ResizeBus) {
        self.resize = Some(bus.subscribe());
    }

    pub fn handle(&self) -> SettingsHandle<MerkabaUpdate> {
        self.store.handle()
    }

    pub fn store(&self) -> &SettingsStore<MerkabaSettings> {
        &self.store
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    /// Number of rebuilds since construction, excluding the initial build.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn surface(&self) -> Option<&FrameBuffer> {
        self.renderer.as_ref().map(SoftwareRenderer::surface)
    }

    pub fn last_stats(&self) -> RenderStats {
        self.last_stats
    }

    pub fn is_listening_for_resize(&self) -> bool {
        self.resize.is_some()
    }

    /// Replace the graph with a freshly built one. Orientation resets to the initial tilt.
    fn rebuild(&mut self) {
        let settings = self.store.snapshot();
        let graph = self.assembler.build(&settings, self.viewport);
        log::debug!(
            "rebuilt merkaba: {} solids, {} wireframes, {} markers",
            graph.solid_count(),
            graph.wireframe_count(),
            graph.marker_count()
        );
        self.graph = graph;
        self.built_from = settings;
        self.integrator.reset();
        self.rebuilds += 1;
    }

    fn apply_resize(&mut self) {
        let Some(viewport) = self.resize.as_ref().and_then(ResizeSubscription::latest) else {
            return;
        };
        if viewport == self.viewport {
            return;
        }
        if let Some(renderer) = self.renderer.as_mut() {
            match renderer.resize(viewport) {
                Ok(_) => log::debug!("merkaba surface resized to {}x{}", viewport.width, viewport.height),
                Err(e) => {
                    log::debug!("ignoring resize: {e}");
                    return;
                }
            }
        }
        self.viewport = viewport;
        self.graph.camera.set_viewport(viewport);
    }
}

impl Scene for MerkabaScene {
    fn update(&mut self, ctx: &FrameContext) {
        self.store.drain_pending();
        self.apply_resize();

        if self.store.get().requires_rebuild(&self.built_from) {
            self.rebuild();
        } else {
            self.built_from.rotation_speed = self.store.get().rotation_speed;
        }

        let speed = self.store.get().rotation_speed;
        self.integrator.step(&mut self.graph.group, speed, ctx.playing);
    }

    fn render(&mut self, _ctx: &FrameContext) {
        if let Some(renderer) = self.renderer.as_mut() {
            self.last_stats = renderer.render(&self.graph);
        }
    }

    fn has_pending_changes(&self) -> bool {
        self.store.has_pending()
    }

    fn release(&mut self) {
        self.renderer = None;
        // Dropping the subscription unregisters it from the bus
        self.resize = None;
        log::debug!("merkaba scene released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hypno_core::{ColorField, Rgb};

    fn ctx(playing: bool) -> FrameContext {
        FrameContext {
            time: 0.0,
            delta_ms: 16.0,
            playing,
            frame: 0,
        }
    }

    fn scene() -> MerkabaScene {
        MerkabaScene::new(MerkabaSettings::default(), Viewport::new(80, 60)).unwrap()
    }

    #[test]
    fn test_color_change_rebuilds() {
        let mut s = scene();
        s.handle().send(MerkabaUpdate::Color(ColorField::Wireframe, Rgb::new(1, 2, 3)));
        s.update(&ctx(true));
        assert_eq!(s.rebuild_count(), 1);
    }

    #[test]
    fn test_rotation_speed_change_does_not_rebuild() {
        let mut s = scene();
        s.handle().send(MerkabaUpdate::RotationSpeed(0.05));
        s.update(&ctx(true));
        assert_eq!(s.rebuild_count(), 0);
        s.update(&ctx(true));
        assert_eq!(s.rebuild_count(), 0);
    }

    #[test]
    fn test_paused_update_keeps_orientation() {
        let mut s = scene();
        let before = s.graph().group.rotation;
        s.update(&ctx(false));
        assert_eq!(s.graph().group.rotation, before);
    }

    #[test]
    fn test_resize_moves_camera_aspect() {
        let bus = ResizeBus::new();
        let mut s = scene();
        s.attach_resize(&bus);
        bus.publish(Viewport::new(200, 100));
        s.update(&ctx(true));
        assert_eq!(s.viewport(), Viewport::new(200, 100));
        assert_eq!(s.graph().camera.aspect, 2.0);
        assert_eq!(s.surface().map(|f| f.viewport()), Some(Viewport::new(200, 100)));
    }

    #[test]
    fn test_zero_size_resize_is_ignored() {
        let bus = ResizeBus::new();
        let mut s = scene();
        s.attach_resize(&bus);
        bus.publish(Viewport::new(0, 0));
        s.update(&ctx(true));
        assert_eq!(s.viewport(), Viewport::new(80, 60));
    }

    #[test]
    fn test_release_unsubscribes() {
        let bus = ResizeBus::new();
        let mut s = scene();
        s.attach_resize(&bus);
        assert_eq!(bus.listener_count(), 1);
        s.release();
        assert_eq!(bus.listener_count(), 0);
        assert!(s.surface().is_none());
    }
}
