//! Recursive Lissajous pattern.
//!
//! Each level rotates its local space by `t * baseSpeed * depth` and draws
//! six copies of a Lissajous curve, then recurses into six sub-origins
//! spaced 60° apart at distance `size`, shrinking by 0.4 per level.

use glam::{Affine2, Vec2};
use hypno_core::{cycle, Hsla, PatternSettings};
use std::f32::consts::TAU;
use std::sync::Arc;

use crate::primitive::{DrawItem, Paint, Shape2};

/// Angular subdivisions per recursion level.
pub const BRANCHES: usize = 6;
/// Child pattern size relative to its parent.
pub const SIZE_FALLOFF: f32 = 0.4;
/// Curve amplitude relative to the level size.
pub const CURVE_AMPLITUDE: f32 = 0.3;
/// Parameter step when sampling a curve over [0, 2π).
pub const CURVE_STEP: f32 = 0.1;

/// One stroked curve of the pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternCurve {
    /// Curve space to pattern space: the level's origin and accumulated rotation.
    pub transform: Affine2,
    /// Remaining depth at the level that drew this curve.
    pub depth: u32,
    /// Angular subdivision index, 0..6.
    pub branch: usize,
    pub stroke: Hsla,
    pub width: f32,
    /// Sampled curve in local space, shared by every curve of the same level.
    pub points: Arc<[Vec2]>,
}

impl PatternCurve {
    /// Center of the curve's local space in pattern coordinates.
    pub fn center(&self) -> Vec2 {
        self.transform.translation
    }

    /// Net rotation of the curve's local space, in radians.
    pub fn rotation(&self) -> f32 {
        let x_axis = self.transform.matrix2.x_axis;
        x_axis.y.atan2(x_axis.x)
    }

    /// Draw item placed under `parent`.
    pub fn to_draw_item(&self, parent: Affine2) -> DrawItem {
        DrawItem::new(
            parent * self.transform,
            Shape2::Polyline {
                points: Arc::clone(&self.points),
                width: self.width,
            },
            Paint::hsla(self.stroke),
        )
    }
}

/// Sample the Lissajous curve for one level:
/// `x = sin(3θ + t)·size·0.3`, `y = sin(2θ + 1.5t)·size·0.3`.
pub fn lissajous_points(t: f64, size: f32) -> Vec<Vec2> {
    let amplitude = size * CURVE_AMPLITUDE;
    let phase_x = cycle(t, 1.0, TAU);
    let phase_y = cycle(t, 1.5, TAU);
    let mut points = Vec::with_capacity(64);
    let mut theta = 0.0_f32;
    while theta < TAU {
        points.push(Vec2::new(
            (theta * 3.0 + phase_x).sin() * amplitude,
            (theta * 2.0 + phase_y).sin() * amplitude,
        ));
        theta += CURVE_STEP;
    }
    points
}

/// Number of curves drawn for a given depth: 6 + 6² + … + 6^depth.
pub fn curve_count(depth: u32) -> usize {
    (1..=depth).map(|k| BRANCHES.pow(k)).sum()
}

/// Generate the pattern rooted at `origin`. A pure function of its inputs.
pub fn fractal_pattern(
    t: f64,
    settings: &PatternSettings,
    origin: Vec2,
    size: f32,
    depth: u32,
) -> Vec<PatternCurve> {
    // Every curve of a level has the same shape: sample once per level.
    let mut level_size = size;
    let mut levels: Vec<Arc<[Vec2]>> = Vec::with_capacity(depth as usize);
    for _ in 0..depth {
        levels.push(Arc::from(lissajous_points(t, level_size)));
        level_size *= SIZE_FALLOFF;
    }

    let level = Level {
        t,
        settings,
        curves: &levels,
        top: depth,
    };
    let mut curves = Vec::with_capacity(curve_count(depth));
    level.generate(Affine2::IDENTITY, origin, size, depth, &mut curves);
    curves
}

/// Per-call constants shared by the whole recursion.
struct Level<'a> {
    t: f64,
    settings: &'a PatternSettings,
    /// Sampled curve per level, outermost first.
    curves: &'a [Arc<[Vec2]>],
    top: u32,
}

impl Level<'_> {
    fn generate(&self, parent: Affine2, origin: Vec2, size: f32, depth: u32, out: &mut Vec<PatternCurve>) {
        if depth == 0 {
            return;
        }

        let spin = cycle(self.t, self.settings.base_speed * depth as f32, TAU);
        let local = parent * Affine2::from_translation(origin) * Affine2::from_angle(spin);
        let points = &self.curves[(self.top - depth) as usize];
        let alpha = 0.7 / depth as f32;
        let width = 2.0 / depth as f32;
        let base_hue = cycle(self.t, 50.0, 360.0);

        for branch in 0..BRANCHES {
            let sub_angle = branch as f32 / BRANCHES as f32 * TAU;
            let sub_origin = Vec2::new(sub_angle.cos(), sub_angle.sin()) * size;

            let hue = base_hue + depth as f32 * 60.0 + branch as f32 * 30.0;
            out.push(PatternCurve {
                transform: local,
                depth,
                branch,
                stroke: Hsla::new(hue, self.settings.color_intensity, 50.0, alpha),
                width,
                points: Arc::clone(points),
            });

            self.generate(local, sub_origin, size * SIZE_FALLOFF, depth - 1, out);
        }
    }
}
