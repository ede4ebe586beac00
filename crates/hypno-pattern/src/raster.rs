use glam::{Affine2, Vec2};
use hypno_core::{skia_color, FrameBuffer};
use tiny_skia::{
    BlendMode, FillRule, LinearGradient, Paint as SkPaint, Path, PathBuilder, Pixmap, Point, RadialGradient, Rect,
    Shader, SpreadMode, Stroke, Transform,
};

use crate::primitive::{Blend, DisplayList, DrawItem, GradientStop, Paint, Shape2};

/// Clear the target and draw every item in order.
pub fn rasterize(list: &DisplayList, target: &mut FrameBuffer) {
    target.clear(list.clear);
    let pixmap = target.pixmap_mut();
    for item in &list.items {
        draw_item(pixmap, item);
    }
}

fn draw_item(pixmap: &mut Pixmap, item: &DrawItem) {
    let Some(shader) = shader(&item.paint) else {
        log::debug!("skipping primitive with an unusable paint");
        return;
    };
    let paint = SkPaint {
        shader,
        blend_mode: blend_mode(item.blend),
        anti_alias: true,
        ..SkPaint::default()
    };
    let transform = to_transform(&item.transform);

    match &item.shape {
        Shape2::Polyline { points, width } => {
            if let Some(path) = polyline(points) {
                pixmap.stroke_path(&path, &paint, &stroke(*width), transform, None);
            }
        }
        Shape2::Segments { segments, width } => {
            if let Some(path) = segment_set(segments) {
                pixmap.stroke_path(&path, &paint, &stroke(*width), transform, None);
            }
        }
        Shape2::Disc { center, radius } => {
            if let Some(path) = PathBuilder::from_circle(center.x, center.y, *radius) {
                pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
            }
        }
        Shape2::Rect { origin, size } => {
            if let Some(rect) = Rect::from_xywh(origin.x, origin.y, size.x, size.y) {
                pixmap.fill_rect(rect, &paint, transform, None);
            }
        }
    }
}

/// glam column-major affine to tiny-skia's row form.
pub fn to_transform(affine: &Affine2) -> Transform {
    let m = affine.matrix2;
    let t = affine.translation;
    Transform::from_row(m.x_axis.x, m.x_axis.y, m.y_axis.x, m.y_axis.y, t.x, t.y)
}

fn blend_mode(blend: Blend) -> BlendMode {
    match blend {
        Blend::Normal => BlendMode::SourceOver,
        Blend::Screen => BlendMode::Screen,
    }
}

fn stroke(width: f32) -> Stroke {
    Stroke {
        width,
        ..Stroke::default()
    }
}

fn point(v: Vec2) -> Point {
    Point::from_xy(v.x, v.y)
}

fn stops(stops: &[GradientStop]) -> Vec<tiny_skia::GradientStop> {
    stops
        .iter()
        .map(|s| tiny_skia::GradientStop::new(s.offset, skia_color(s.color)))
        .collect()
}

fn shader(paint: &Paint) -> Option<Shader<'static>> {
    match paint {
        Paint::Solid(color) => Some(Shader::SolidColor(skia_color(*color))),
        Paint::Linear { start, end, stops: s } => LinearGradient::new(
            point(*start),
            point(*end),
            stops(s),
            SpreadMode::Pad,
            Transform::identity(),
        ),
        Paint::Radial { center, radius, stops: s } => RadialGradient::new(
            point(*center),
            0.0,
            point(*center),
            *radius,
            stops(s),
            SpreadMode::Pad,
            Transform::identity(),
        ),
    }
}

fn polyline(points: &[Vec2]) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.x, first.y);
    for p in rest {
        pb.line_to(p.x, p.y);
    }
    pb.finish()
}

fn segment_set(segments: &[(Vec2, Vec2)]) -> Option<Path> {
    let mut pb = PathBuilder::new();
    for (a, b) in segments {
        pb.move_to(a.x, a.y);
        pb.line_to(b.x, b.y);
    }
    pb.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hypno_core::{Rgba, Viewport};

    fn disc_at(center: Vec2, color: Rgba) -> DrawItem {
        DrawItem::new(
            Affine2::IDENTITY,
            Shape2::Disc { center, radius: 5.0 },
            Paint::Solid(color),
        )
    }

    #[test]
    fn test_transform_maps_like_glam() {
        let affine = Affine2::from_translation(Vec2::new(10.0, 20.0)) * Affine2::from_angle(0.7);
        let ts = to_transform(&affine);
        let mut p = [Point::from_xy(3.0, -2.0)];
        ts.map_points(&mut p);
        let expected = affine.transform_point2(Vec2::new(3.0, -2.0));
        assert!((p[0].x - expected.x).abs() < 1e-4);
        assert!((p[0].y - expected.y).abs() < 1e-4);
    }

    #[test]
    fn test_clear_then_disc() {
        let mut fb = FrameBuffer::new(Viewport::new(40, 40)).unwrap();
        let mut list = DisplayList::new(Rgba::BLACK);
        list.push(disc_at(Vec2::new(20.0, 20.0), Rgba::new(0.0, 1.0, 0.0, 1.0)));
        rasterize(&list, &mut fb);

        assert_eq!(fb.pixel(20, 20), Some([0, 255, 0, 255]));
        assert_eq!(fb.pixel(2, 2), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_screen_blend_lightens() {
        let mut fb = FrameBuffer::new(Viewport::new(20, 20)).unwrap();
        let grey = Rgba::new(0.5, 0.5, 0.5, 1.0);
        let mut list = DisplayList::new(grey);
        list.push(disc_at(Vec2::new(10.0, 10.0), grey).with_blend(Blend::Screen));
        rasterize(&list, &mut fb);

        let [r, _, _, _] = fb.pixel(10, 10).unwrap();
        // 1 - 0.5·0.5 = 0.75
        assert!((185..=195).contains(&r), "screen of two greys gave {r}");
    }

    #[test]
    fn test_empty_polyline_is_skipped() {
        assert!(polyline(&[]).is_none());
        assert!(segment_set(&[]).is_none());
    }
}
