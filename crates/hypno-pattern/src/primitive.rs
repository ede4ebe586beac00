use glam::{Affine2, Vec2};
use hypno_core::{Hsla, Rgba};
use std::sync::Arc;

/// How a primitive combines with what is already on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Blend {
    #[default]
    Normal,
    /// Lightening blend: `1 - (1 - dst)(1 - src)`.
    Screen,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Rgba,
}

impl GradientStop {
    pub fn new(offset: f32, color: Rgba) -> Self {
        Self {
            offset: offset.clamp(0.0, 1.0),
            color,
        }
    }
}

/// Fill or stroke source. Gradient coordinates live in the primitive's local space.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Rgba),
    Linear {
        start: Vec2,
        end: Vec2,
        stops: Vec<GradientStop>,
    },
    Radial {
        center: Vec2,
        radius: f32,
        stops: Vec<GradientStop>,
    },
}

impl Paint {
    pub fn hsla(color: Hsla) -> Self {
        Paint::Solid(color.to_rgba())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape2 {
    /// Open polyline, stroked. Points are shared between items with the same curve.
    Polyline { points: Arc<[Vec2]>, width: f32 },
    /// Independent line segments, stroked.
    Segments { segments: Vec<(Vec2, Vec2)>, width: f32 },
    /// Filled circle.
    Disc { center: Vec2, radius: f32 },
    /// Filled axis-aligned rectangle.
    Rect { origin: Vec2, size: Vec2 },
}

/// One drawable primitive with its local-to-surface transform.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub transform: Affine2,
    pub shape: Shape2,
    pub paint: Paint,
    pub blend: Blend,
}

impl DrawItem {
    pub fn new(transform: Affine2, shape: Shape2, paint: Paint) -> Self {
        Self {
            transform,
            shape,
            paint,
            blend: Blend::Normal,
        }
    }

    pub fn with_blend(mut self, blend: Blend) -> Self {
        self.blend = blend;
        self
    }
}

/// A complete frame: clear color plus primitives in painter's order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DisplayList {
    pub clear: Rgba,
    pub items: Vec<DrawItem>,
}

impl DisplayList {
    pub fn new(clear: Rgba) -> Self {
        Self {
            clear,
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, item: DrawItem) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
