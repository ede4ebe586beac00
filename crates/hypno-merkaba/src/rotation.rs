use crate::graph::Group;

/// Advances the group orientation by a fixed angle per frame while playing.
#[derive(Debug, Clone, Copy, Default)]
pub struct RotationIntegrator {
    steps: u64,
}

impl RotationIntegrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `speed` radians to the x and y rotation. Does nothing while paused.
    /// Angles are left unwrapped.
    pub fn step(&mut self, group: &mut Group, speed: f32, playing: bool) {
        if !playing {
            return;
        }
        group.rotation.x += speed;
        group.rotation.y += speed;
        self.steps += 1;
    }

    /// Frames integrated since the last reset.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn reset(&mut self) {
        self.steps = 0;
    }
}
