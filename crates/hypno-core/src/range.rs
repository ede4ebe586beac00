/// A closed numeric range used to validate settings writes.
///
/// Writes outside the range are clamped rather than rejected. NaN input
/// collapses to the range minimum so no non-finite value reaches a scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub min: f32,
    pub max: f32,
}

impl ParamRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.min;
        }
        value.clamp(self.min, self.max)
    }

    /// Round to the nearest integer, then clamp. For count-like fields.
    pub fn clamp_int(&self, value: f32) -> u32 {
        self.clamp(value.round()) as u32
    }
}
