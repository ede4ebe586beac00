use hypno_core::{
    FrameBuffer, FrameContext, PatternSettings, PatternUpdate, Scene, SettingsHandle, SettingsStore, SurfaceError,
    Viewport,
};

use crate::audio::{AudioError, AudioModulator, FrequencySource};
use crate::compositor::LayerCompositor;
use crate::raster::rasterize;

/// Fixed size of the 2D surface.
pub const PATTERN_VIEWPORT: Viewport = Viewport::new(600, 600);

/// The layered 2D pattern scene.
pub struct PatternScene {
    store: SettingsStore<PatternSettings>,
    compositor: LayerCompositor,
    audio: AudioModulator,
    surface: Option<FrameBuffer>,
    /// Stored settings plus this frame's audio overrides.
    frame_settings: PatternSettings,
    last_primitive_count: usize,
}

impl PatternScene {
    pub fn new(settings: PatternSettings) -> Result<Self, SurfaceError> {
        Self::with_viewport(settings, PATTERN_VIEWPORT)
    }

    pub fn with_viewport(settings: PatternSettings, viewport: Viewport) -> Result<Self, SurfaceError> {
        let surface = FrameBuffer::new(viewport)?;
        let store = SettingsStore::new(settings);
        let frame_settings = store.snapshot();
        Ok(Self {
            store,
            compositor: LayerCompositor::new(viewport),
            audio: AudioModulator::new(),
            surface: Some(surface),
            frame_settings,
            last_primitive_count: 0,
        })
    }

    /// Control-surface handle; updates apply at the start of the next frame.
    pub fn handle(&self) -> SettingsHandle<PatternUpdate> {
        self.store.handle()
    }

    pub fn store(&self) -> &SettingsStore<PatternSettings> {
        &self.store
    }

    pub fn enable_audio<F>(&mut self, acquire: F) -> bool
    where
        F: FnOnce() -> Result<Box<dyn FrequencySource>, AudioError>,
    {
        self.audio.enable(acquire)
    }

    pub fn audio(&self) -> &AudioModulator {
        &self.audio
    }

    /// Settings the last frame was drawn with.
    pub fn frame_settings(&self) -> &PatternSettings {
        &self.frame_settings
    }

    pub fn surface(&self) -> Option<&FrameBuffer> {
        self.surface.as_ref()
    }

    pub fn last_primitive_count(&self) -> usize {
        self.last_primitive_count
    }
}

impl Scene for PatternScene {
    fn update(&mut self, _ctx: &FrameContext) {
        self.store.drain_pending();
        self.frame_settings = self.audio.modulate(self.store.get());
    }

    fn render(&mut self, ctx: &FrameContext) {
        let list = self.compositor.compose(ctx.time, &self.frame_settings);
        self.last_primitive_count = list.len();
        // Surface is gone after release
        if let Some(surface) = self.surface.as_mut() {
            rasterize(&list, surface);
        }
    }

    fn has_pending_changes(&self) -> bool {
        self.store.has_pending()
    }

    fn release(&mut self) {
        self.surface = None;
        self.audio.disable();
        log::debug!("pattern scene released");
    }
}
