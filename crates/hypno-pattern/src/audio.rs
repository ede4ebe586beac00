use hypno_core::PatternSettings;
use thiserror::Error;

pub const PULSE_SPEED_MIN: f32 = 0.5;
pub const PULSE_SPEED_MAX: f32 = 5.0;
pub const COLOR_INTENSITY_MIN: f32 = 50.0;
pub const COLOR_INTENSITY_MAX: f32 = 100.0;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio capture permission denied")]
    PermissionDenied,

    #[error("audio analyser disconnected")]
    Disconnected,

    #[error("analysis size must be a power of two of at least 32, got {0}")]
    InvalidFftSize(usize),
}

/// A live frequency-magnitude feed.
pub trait FrequencySource {
    /// Most recent sample, or an empty slice if nothing has arrived yet. Never blocks.
    fn latest(&mut self) -> &[f32];
}

/// Frame-local values derived from one audio sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioOverrides {
    pub pulse_speed: f32,
    pub color_intensity: f32,
}

impl AudioOverrides {
    /// Map a sample's mean onto bounded pulse speed and color intensity.
    /// An empty or NaN-poisoned sample gives no override.
    pub fn from_sample(sample: &[f32]) -> Option<Self> {
        if sample.is_empty() {
            return None;
        }
        let mean = sample.iter().sum::<f32>() / sample.len() as f32;
        if mean.is_nan() {
            return None;
        }
        Some(Self {
            pulse_speed: (mean * 0.1).clamp(PULSE_SPEED_MIN, PULSE_SPEED_MAX),
            color_intensity: (mean * 2.0).clamp(COLOR_INTENSITY_MIN, COLOR_INTENSITY_MAX),
        })
    }

    pub fn apply_to(&self, settings: &PatternSettings) -> PatternSettings {
        PatternSettings {
            pulse_speed: self.pulse_speed,
            color_intensity: self.color_intensity,
            ..settings.clone()
        }
    }
}

/// Optional audio-driven modulation of the 2D scene. Disabled until a source is acquired.
#[derive(Default)]
pub struct AudioModulator {
    source: Option<Box<dyn FrequencySource>>,
    last: Option<AudioOverrides>,
}

impl AudioModulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to acquire a capture source. On failure the modulator logs and stays disabled.
    pub fn enable<F>(&mut self, acquire: F) -> bool
    where
        F: FnOnce() -> Result<Box<dyn FrequencySource>, AudioError>,
    {
        if self.source.is_some() {
            return true;
        }
        match acquire() {
            Ok(source) => {
                log::info!("audio modulation enabled");
                self.source = Some(source);
                true
            }
            Err(e) => {
                log::warn!("audio input not available: {e}");
                false
            }
        }
    }

    /// Drop the capture source.
    pub fn disable(&mut self) {
        if self.source.take().is_some() {
            log::debug!("audio modulation released");
        }
        self.last = None;
    }

    pub fn is_enabled(&self) -> bool {
        self.source.is_some()
    }

    /// Overrides applied to the most recent frame.
    pub fn last_overrides(&self) -> Option<AudioOverrides> {
        self.last
    }

    /// Settings for this frame: the stored values with any audio overrides on top.
    /// The stored settings are never written.
    pub fn modulate(&mut self, settings: &PatternSettings) -> PatternSettings {
        self.last = self
            .source
            .as_mut()
            .and_then(|source| AudioOverrides::from_sample(source.latest()));
        match &self.last {
            Some(overrides) => overrides.apply_to(settings),
            None => settings.clone(),
        }
    }
}
