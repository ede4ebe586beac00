use glam::{Affine2, Vec2};
use hypno_core::{cycle, Hsla, PatternSettings, Rgba, Viewport};
use std::f32::consts::TAU;

use crate::fractal::{fractal_pattern, PatternCurve};
use crate::primitive::{Blend, DisplayList, DrawItem, GradientStop, Paint, Shape2};

/// Size of the pattern drawn at each layer origin.
pub const PATTERN_BASE_SIZE: f32 = 150.0;
/// Radius of each field point.
pub const FIELD_POINT_RADIUS: f32 = 5.0;
pub const FIELD_RING_RADIUS: f32 = 200.0;
pub const FIELD_RING_WOBBLE: f32 = 30.0;
/// Half-width of the moiré overlay square.
pub const MOIRE_HALF_SPAN: f32 = 300.0;
pub const MOIRE_PITCH: f32 = 4.0;
pub const MOIRE_SPIN: f32 = 0.1;

/// One point of the per-layer field, in layer space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldPoint {
    pub position: Vec2,
    pub hue: f32,
}

/// `complexity` points on a ring whose radius breathes with time.
pub fn field_points(t: f64, complexity: u32) -> Vec<FieldPoint> {
    let wobble = cycle(t, 1.5, TAU);
    let base_hue = cycle(t, 50.0, 360.0);
    (0..complexity)
        .map(|i| {
            let fi = i as f32;
            let angle = fi / complexity as f32 * TAU;
            let radius = FIELD_RING_RADIUS + (wobble + fi * 0.5).sin() * FIELD_RING_WOBBLE;
            FieldPoint {
                position: Vec2::new(angle.cos(), angle.sin()) * radius,
                hue: hypno_core::color::wrap_hue(base_hue + fi * 30.0),
            }
        })
        .collect()
}

/// Scale and signed rotation speed of one layer.
pub fn layer_params(layer: u32, base_speed: f32) -> (f32, f32) {
    let scale = 1.0 - layer as f32 * 0.1;
    let direction = if layer % 2 == 0 { 1.0 } else { -1.0 };
    (scale, base_speed * direction)
}

/// Position of the vignette's middle stop.
pub fn vignette_stop(t: f64, pulse_speed: f32) -> f32 {
    let pulse = cycle(t, pulse_speed, TAU).sin() * 0.2 + 0.5;
    if pulse.is_nan() {
        0.5
    } else {
        pulse.clamp(0.0, 1.0)
    }
}

/// Assembles a full 2D frame from layers, overlays and the vignette.
#[derive(Debug, Clone, Copy)]
pub struct LayerCompositor {
    viewport: Viewport,
}

impl LayerCompositor {
    pub fn new(viewport: Viewport) -> Self {
        Self { viewport }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn center(&self) -> Vec2 {
        Vec2::new(self.viewport.width as f32, self.viewport.height as f32) * 0.5
    }

    /// Transform from layer space to surface space.
    pub fn layer_transform(&self, t: f64, layer: u32, settings: &PatternSettings) -> Affine2 {
        let (scale, speed) = layer_params(layer, settings.base_speed);
        Affine2::from_translation(self.center())
            * Affine2::from_angle(cycle(t, speed, TAU))
            * Affine2::from_scale(Vec2::splat(scale))
    }

    pub fn compose(&self, t: f64, settings: &PatternSettings) -> DisplayList {
        let mut list = DisplayList::new(Rgba::BLACK);

        // Layers differ only in their transform
        let points = field_points(t, settings.complexity);
        let curves = fractal_pattern(t, settings, Vec2::ZERO, PATTERN_BASE_SIZE, settings.pattern_depth);
        for layer in 0..settings.layer_count {
            let transform = self.layer_transform(t, layer, settings);
            push_layer(&mut list, settings, transform, &points, &curves);
        }

        self.push_moire(&mut list, t, settings);
        self.push_vignette(&mut list, t, settings);
        list
    }

    /// Two screen-blended passes of vertical lines spinning in opposite directions.
    fn push_moire(&self, list: &mut DisplayList, t: f64, settings: &PatternSettings) {
        let segments = moire_segments();
        let base_hue = cycle(t, 50.0, 360.0);
        let stops = vec![
            GradientStop::new(0.0, Hsla::new(base_hue, settings.color_intensity, 50.0, 0.1).to_rgba()),
            GradientStop::new(1.0, Hsla::new(base_hue + 180.0, settings.color_intensity, 50.0, 0.1).to_rgba()),
        ];

        for pass in 0..2 {
            let spin = if pass == 1 { MOIRE_SPIN } else { -MOIRE_SPIN };
            let transform = Affine2::from_translation(self.center()) * Affine2::from_angle(cycle(t, spin, TAU));
            list.push(
                DrawItem::new(
                    transform,
                    Shape2::Segments {
                        segments: segments.clone(),
                        width: 1.0,
                    },
                    Paint::Linear {
                        start: Vec2::splat(-MOIRE_HALF_SPAN),
                        end: Vec2::splat(MOIRE_HALF_SPAN),
                        stops: stops.clone(),
                    },
                )
                .with_blend(Blend::Screen),
            );
        }
    }

    fn push_vignette(&self, list: &mut DisplayList, t: f64, settings: &PatternSettings) {
        let size = Vec2::new(self.viewport.width as f32, self.viewport.height as f32);
        list.push(DrawItem::new(
            Affine2::IDENTITY,
            Shape2::Rect {
                origin: Vec2::ZERO,
                size,
            },
            Paint::Radial {
                center: self.center(),
                radius: size.x * 0.5,
                stops: vec![
                    GradientStop::new(0.0, Rgba::TRANSPARENT),
                    GradientStop::new(vignette_stop(t, settings.pulse_speed), Rgba::black(0.3)),
                    GradientStop::new(1.0, Rgba::black(0.7)),
                ],
            },
        ));
    }
}

fn push_layer(
    list: &mut DisplayList,
    settings: &PatternSettings,
    transform: Affine2,
    points: &[FieldPoint],
    curves: &[PatternCurve],
) {
    for point in points {
        list.push(DrawItem::new(
            transform,
            Shape2::Disc {
                center: point.position,
                radius: FIELD_POINT_RADIUS,
            },
            Paint::hsla(Hsla::new(point.hue, settings.color_intensity, 50.0, 0.8)),
        ));
    }

    for curve in curves {
        list.push(curve.to_draw_item(transform));
    }
}

/// Vertical lines at 4-unit pitch across the 600-unit overlay square.
pub fn moire_segments() -> Vec<(Vec2, Vec2)> {
    let mut segments = Vec::with_capacity(150);
    let mut x = -MOIRE_HALF_SPAN;
    while x < MOIRE_HALF_SPAN {
        segments.push((Vec2::new(x, -MOIRE_HALF_SPAN), Vec2::new(x, MOIRE_HALF_SPAN)));
        x += MOIRE_PITCH;
    }
    segments
}
