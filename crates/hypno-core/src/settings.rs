use serde::{Deserialize, Serialize};
use std::fmt;

use crate::color::{InvalidColor, Rgb};
use crate::range::ParamRange;

pub const LAYER_COUNT_RANGE: ParamRange = ParamRange::new(1.0, 10.0);
pub const BASE_SPEED_RANGE: ParamRange = ParamRange::new(0.1, 5.0);
pub const COMPLEXITY_RANGE: ParamRange = ParamRange::new(1.0, 24.0);
pub const COLOR_INTENSITY_RANGE: ParamRange = ParamRange::new(0.0, 100.0);
pub const PULSE_SPEED_RANGE: ParamRange = ParamRange::new(0.1, 5.0);
pub const PATTERN_DEPTH_RANGE: ParamRange = ParamRange::new(1.0, 6.0);

pub const ROTATION_SPEED_RANGE: ParamRange = ParamRange::new(0.0, 0.1);
pub const SIZE_RANGE: ParamRange = ParamRange::new(0.01, 1000.0);

/// A scene configuration that can be updated field by field.
pub trait Settings: Clone + PartialEq + fmt::Debug + Send + 'static {
    /// One structured field write from the control surface.
    type Update: Clone + fmt::Debug + Send + 'static;

    /// Apply a field write, clamping it into its declared range.
    /// Returns `true` when the stored value actually changed.
    fn apply(&mut self, update: Self::Update) -> bool;

    /// Pull every field back into its declared range.
    fn clamp(&mut self);
}

fn clamp_logged(range: &ParamRange, field: &str, value: f32) -> f32 {
    if range.contains(value) {
        return value;
    }
    let clamped = range.clamp(value);
    log::debug!("{field}: {value} outside [{}, {}], clamped to {clamped}", range.min, range.max);
    clamped
}

fn clamp_int_logged(range: &ParamRange, field: &str, value: f32) -> u32 {
    let clamped = range.clamp_int(value);
    if clamped as f32 != value {
        log::debug!("{field}: {value} clamped to {clamped}");
    }
    clamped
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

// ── 2D pattern scene ─────────────────────────────────────────────

/// Parameters of the layered recursive pattern field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatternSettings {
    /// Number of composited layers. Range: 1..10
    pub layer_count: u32,
    /// Layer rotation speed. Range: 0.1..5
    pub base_speed: f32,
    /// Number of field points per layer. Range: 1..24
    pub complexity: u32,
    /// Color saturation percentage. Range: 0..100
    pub color_intensity: f32,
    /// Vignette pulse rate. Range: 0.1..5
    pub pulse_speed: f32,
    /// Fractal recursion bound. Range: 1..6
    pub pattern_depth: u32,
}

impl Default for PatternSettings {
    fn default() -> Self {
        Self {
            layer_count: 7,
            base_speed: 0.5,
            complexity: 16,
            color_intensity: 70.0,
            pulse_speed: 2.0,
            pattern_depth: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PatternUpdate {
    LayerCount(f32),
    BaseSpeed(f32),
    Complexity(f32),
    ColorIntensity(f32),
    PulseSpeed(f32),
    PatternDepth(f32),
}

impl PatternUpdate {
    /// Build an update from a control-surface field name (camelCase) and slider value.
    pub fn from_field(name: &str, value: f32) -> Option<Self> {
        let update = match name {
            "layerCount" => PatternUpdate::LayerCount(value),
            "baseSpeed" => PatternUpdate::BaseSpeed(value),
            "complexity" => PatternUpdate::Complexity(value),
            "colorIntensity" => PatternUpdate::ColorIntensity(value),
            "pulseSpeed" => PatternUpdate::PulseSpeed(value),
            "patternDepth" => PatternUpdate::PatternDepth(value),
            _ => return None,
        };
        Some(update)
    }
}

impl Settings for PatternSettings {
    type Update = PatternUpdate;

    fn apply(&mut self, update: PatternUpdate) -> bool {
        match update {
            PatternUpdate::LayerCount(v) => {
                replace(&mut self.layer_count, clamp_int_logged(&LAYER_COUNT_RANGE, "layerCount", v))
            }
            PatternUpdate::BaseSpeed(v) => {
                replace(&mut self.base_speed, clamp_logged(&BASE_SPEED_RANGE, "baseSpeed", v))
            }
            PatternUpdate::Complexity(v) => {
                replace(&mut self.complexity, clamp_int_logged(&COMPLEXITY_RANGE, "complexity", v))
            }
            PatternUpdate::ColorIntensity(v) => replace(
                &mut self.color_intensity,
                clamp_logged(&COLOR_INTENSITY_RANGE, "colorIntensity", v),
            ),
            PatternUpdate::PulseSpeed(v) => {
                replace(&mut self.pulse_speed, clamp_logged(&PULSE_SPEED_RANGE, "pulseSpeed", v))
            }
            PatternUpdate::PatternDepth(v) => replace(
                &mut self.pattern_depth,
                clamp_int_logged(&PATTERN_DEPTH_RANGE, "patternDepth", v),
            ),
        }
    }

    fn clamp(&mut self) {
        self.layer_count = LAYER_COUNT_RANGE.clamp_int(self.layer_count as f32);
        self.base_speed = BASE_SPEED_RANGE.clamp(self.base_speed);
        self.complexity = COMPLEXITY_RANGE.clamp_int(self.complexity as f32);
        self.color_intensity = COLOR_INTENSITY_RANGE.clamp(self.color_intensity);
        self.pulse_speed = PULSE_SPEED_RANGE.clamp(self.pulse_speed);
        self.pattern_depth = PATTERN_DEPTH_RANGE.clamp_int(self.pattern_depth as f32);
    }
}

// ── 3D merkaba scene ─────────────────────────────────────────────

/// Parameters of the interlocking-tetrahedra assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MerkabaSettings {
    /// Radians added to the group rotation per frame. Range: 0..0.1
    pub rotation_speed: f32,
    /// Uniform scale of the assembly. Must be > 0
    pub size: f32,
    pub background_color: Rgb,
    pub solid_polygon_color: Rgb,
    pub wireframe_color: Rgb,
    pub sphere_color: Rgb,
    pub show_solid_polygons: bool,
    pub show_grid: bool,
}

impl Default for MerkabaSettings {
    fn default() -> Self {
        Self {
            rotation_speed: 0.01,
            size: 5.0,
            background_color: Rgb::BLACK,
            solid_polygon_color: Rgb::new(255, 0, 0),
            wireframe_color: Rgb::WHITE,
            sphere_color: Rgb::new(0, 255, 0),
            show_solid_polygons: false,
            show_grid: false,
        }
    }
}

impl MerkabaSettings {
    /// Whether moving from `previous` to `self` changes any geometry-affecting field.
    /// Rotation speed is integrated per frame and never forces a rebuild.
    pub fn requires_rebuild(&self, previous: &MerkabaSettings) -> bool {
        self.size != previous.size
            || self.background_color != previous.background_color
            || self.solid_polygon_color != previous.solid_polygon_color
            || self.wireframe_color != previous.wireframe_color
            || self.sphere_color != previous.sphere_color
            || self.show_solid_polygons != previous.show_solid_polygons
            || self.show_grid != previous.show_grid
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorField {
    Background,
    SolidPolygon,
    Wireframe,
    Sphere,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MerkabaUpdate {
    RotationSpeed(f32),
    Size(f32),
    Color(ColorField, Rgb),
    ShowSolidPolygons(bool),
    ShowGrid(bool),
}

impl MerkabaUpdate {
    /// Parse a color write coming from a color picker.
    pub fn color(field: ColorField, hex: &str) -> Result<Self, InvalidColor> {
        Ok(MerkabaUpdate::Color(field, hex.parse()?))
    }

    /// Build an update from a control-surface field name and its raw string value.
    /// Returns `None` for unknown fields or unparseable values.
    pub fn from_field(name: &str, value: &str) -> Option<Self> {
        let color_field = match name {
            "rotationSpeed" => return value.trim().parse().ok().map(MerkabaUpdate::RotationSpeed),
            "size" => return value.trim().parse().ok().map(MerkabaUpdate::Size),
            "showSolidPolygons" => return value.trim().parse().ok().map(MerkabaUpdate::ShowSolidPolygons),
            "showGrid" => return value.trim().parse().ok().map(MerkabaUpdate::ShowGrid),
            "backgroundColor" => ColorField::Background,
            "solidPolygonColor" => ColorField::SolidPolygon,
            "wireframeColor" => ColorField::Wireframe,
            "sphereColor" => ColorField::Sphere,
            _ => return None,
        };
        match MerkabaUpdate::color(color_field, value) {
            Ok(update) => Some(update),
            Err(e) => {
                log::warn!("ignoring {name} update: {e}");
                None
            }
        }
    }
}

impl Settings for MerkabaSettings {
    type Update = MerkabaUpdate;

    fn apply(&mut self, update: MerkabaUpdate) -> bool {
        match update {
            MerkabaUpdate::RotationSpeed(v) => replace(
                &mut self.rotation_speed,
                clamp_logged(&ROTATION_SPEED_RANGE, "rotationSpeed", v),
            ),
            MerkabaUpdate::Size(v) => replace(&mut self.size, clamp_logged(&SIZE_RANGE, "size", v)),
            MerkabaUpdate::Color(field, color) => {
                let slot = match field {
                    ColorField::Background => &mut self.background_color,
                    ColorField::SolidPolygon => &mut self.solid_polygon_color,
                    ColorField::Wireframe => &mut self.wireframe_color,
                    ColorField::Sphere => &mut self.sphere_color,
                };
                replace(slot, color)
            }
            MerkabaUpdate::ShowSolidPolygons(v) => replace(&mut self.show_solid_polygons, v),
            MerkabaUpdate::ShowGrid(v) => replace(&mut self.show_grid, v),
        }
    }

    fn clamp(&mut self) {
        self.rotation_speed = ROTATION_SPEED_RANGE.clamp(self.rotation_speed);
        self.size = SIZE_RANGE.clamp(self.size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_defaults_in_range() {
        let mut s = PatternSettings::default();
        let before = s.clone();
        s.clamp();
        assert_eq!(s, before);
    }

    #[test]
    fn test_pattern_update_clamps() {
        let mut s = PatternSettings::default();
        assert!(s.apply(PatternUpdate::LayerCount(50.0)));
        assert_eq!(s.layer_count, 10);
        assert!(s.apply(PatternUpdate::ColorIntensity(-4.0)));
        assert_eq!(s.color_intensity, 0.0);
        assert!(s.apply(PatternUpdate::PatternDepth(0.0)));
        assert_eq!(s.pattern_depth, 1);
        assert!(s.apply(PatternUpdate::BaseSpeed(f32::NAN)));
        assert_eq!(s.base_speed, 0.1);
    }

    #[test]
    fn test_unchanged_write_reports_false() {
        let mut s = PatternSettings::default();
        assert!(!s.apply(PatternUpdate::Complexity(16.0)));
        assert!(!s.apply(PatternUpdate::Complexity(16.2)));
    }

    #[test]
    fn test_pattern_from_field() {
        assert_eq!(
            PatternUpdate::from_field("pulseSpeed", 3.0),
            Some(PatternUpdate::PulseSpeed(3.0))
        );
        assert_eq!(PatternUpdate::from_field("bogus", 1.0), None);
    }

    #[test]
    fn test_rotation_speed_does_not_require_rebuild() {
        let a = MerkabaSettings::default();
        let mut b = a.clone();
        b.apply(MerkabaUpdate::RotationSpeed(0.07));
        assert!(!b.requires_rebuild(&a));

        b.apply(MerkabaUpdate::Color(ColorField::Sphere, Rgb::new(1, 2, 3)));
        assert!(b.requires_rebuild(&a));
    }

    #[test]
    fn test_merkaba_from_field() {
        assert_eq!(
            MerkabaUpdate::from_field("wireframeColor", "#102030"),
            Some(MerkabaUpdate::Color(ColorField::Wireframe, Rgb::new(0x10, 0x20, 0x30)))
        );
        assert_eq!(
            MerkabaUpdate::from_field("showGrid", "true"),
            Some(MerkabaUpdate::ShowGrid(true))
        );
        assert_eq!(MerkabaUpdate::from_field("sphereColor", "green"), None);
        assert_eq!(MerkabaUpdate::from_field("rotationSpeed", "fast"), None);
    }

    #[test]
    fn test_size_stays_positive() {
        let mut s = MerkabaSettings::default();
        s.apply(MerkabaUpdate::Size(-2.0));
        assert!(s.size > 0.0);
    }

    #[test]
    fn test_serde_camel_case_with_defaults() {
        let s: PatternSettings = serde_json::from_str(r#"{"layerCount": 3}"#).unwrap();
        assert_eq!(s.layer_count, 3);
        assert_eq!(s.pattern_depth, 4);

        let m: MerkabaSettings =
            serde_json::from_str(r##"{"sphereColor": "#0000ff", "showGrid": true}"##).unwrap();
        assert_eq!(m.sphere_color, Rgb::new(0, 0, 255));
        assert!(m.show_grid);
        assert_eq!(m.size, 5.0);
    }
}
