/// Converts host frame deltas (milliseconds) into animation seconds.
pub const MS_TO_SECONDS: f64 = 0.001;

/// Position of `t·rate` within `[0, period)`.
///
/// The product is reduced in `f64` before narrowing, so phases stay exact
/// for large `t`.
pub fn cycle(t: f64, rate: f32, period: f32) -> f32 {
    (t * rate as f64).rem_euclid(period as f64) as f32
}

/// Global animation time and the play/pause flag.
///
/// Time only moves forward, and only while playing. Pausing freezes `t`
/// without resetting it. `t` is kept in `f64` so a 16 ms step still
/// registers after weeks of play.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClock {
    time: f64,
    playing: bool,
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self { time: 0.0, playing: true }
    }
}

impl AnimationClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clock starting at `time`, playing.
    pub fn starting_at(time: f64) -> Self {
        Self { time: time.max(0.0), playing: true }
    }

    /// Advance by one frame's elapsed host time and return the new `t`.
    /// Negative or non-finite deltas are ignored.
    pub fn tick(&mut self, delta_ms: f64) -> f64 {
        if self.playing && delta_ms.is_finite() && delta_ms > 0.0 {
            self.time += delta_ms * MS_TO_SECONDS;
        }
        self.time
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn resume(&mut self) {
        self.playing = true;
    }

    /// Flip play/pause and return the new playing state.
    pub fn toggle(&mut self) -> bool {
        self.playing = !self.playing;
        self.playing
    }
}
