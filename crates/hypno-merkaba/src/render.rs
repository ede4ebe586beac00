use glam::{Mat4, Vec2, Vec3};
use hypno_core::{skia_color, FrameBuffer, Rgb, Rgba, SurfaceError, Viewport};
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::graph::{Camera, Lights, NodeKind, SceneGraph};

/// Primitive counts of one rendered frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub faces: usize,
    pub lines: usize,
    pub markers: usize,
    pub grid_lines: usize,
}

enum DrawOp {
    Triangle([Vec2; 3], Rgba),
    Line(Vec2, Vec2, Rgba),
    Disc(Vec2, f32, Rgba),
}

/// A draw op and its distance from the camera.
struct Queued {
    distance: f32,
    op: DrawOp,
}

/// World → view → screen mapping for one frame.
struct Projector {
    view: Mat4,
    projection: Mat4,
    size: Vec2,
    near: f32,
    /// Pixels per unit at unit distance.
    focal: f32,
}

impl Projector {
    fn new(camera: &Camera, viewport: Viewport) -> Self {
        let size = Vec2::new(viewport.width as f32, viewport.height as f32);
        Self {
            view: camera.view(),
            projection: camera.projection(),
            size,
            near: camera.near,
            focal: size.y * 0.5 / (camera.fov_y.to_radians() * 0.5).tan(),
        }
    }

    fn to_view(&self, world: Vec3) -> Vec3 {
        self.view.transform_point3(world)
    }

    /// Screen position of a view-space point in front of the near plane.
    fn to_screen(&self, p: Vec3) -> Option<Vec2> {
        // Slack for points placed on the plane by clipping
        if p.z > -self.near * 0.999 {
            return None;
        }
        let ndc = self.projection.project_point3(p);
        Some(Vec2::new((ndc.x + 1.0) * 0.5 * self.size.x, (1.0 - ndc.y) * 0.5 * self.size.y))
    }

    /// Clip a view-space segment to the near plane.
    fn clip(&self, a: Vec3, b: Vec3) -> Option<(Vec3, Vec3)> {
        let limit = -self.near;
        match (a.z <= limit, b.z <= limit) {
            (true, true) => Some((a, b)),
            (false, false) => None,
            (a_in, _) => {
                let t = (limit - a.z) / (b.z - a.z);
                let hit = a.lerp(b, t);
                Some(if a_in { (a, hit) } else { (hit, b) })
            }
        }
    }

    fn segment(&self, a: Vec3, b: Vec3) -> Option<(Vec2, Vec2, f32)> {
        let (va, vb) = self.clip(self.to_view(a), self.to_view(b))?;
        let distance = -(va.z + vb.z) * 0.5;
        Some((self.to_screen(va)?, self.to_screen(vb)?, distance))
    }
}

/// Draws scene graphs into an owned raster surface.
pub struct SoftwareRenderer {
    surface: FrameBuffer,
}

impl SoftwareRenderer {
    pub fn new(viewport: Viewport) -> Result<Self, SurfaceError> {
        Ok(Self {
            surface: FrameBuffer::new(viewport)?,
        })
    }

    pub fn viewport(&self) -> Viewport {
        self.surface.viewport()
    }

    pub fn resize(&mut self, viewport: Viewport) -> Result<bool, SurfaceError> {
        self.surface.resize(viewport)
    }

    pub fn surface(&self) -> &FrameBuffer {
        &self.surface
    }

    pub fn render(&mut self, graph: &SceneGraph) -> RenderStats {
        let viewport = self.surface.viewport();
        let projector = Projector::new(&graph.camera, viewport);
        let mut stats = RenderStats::default();

        self.surface.clear(graph.background.to_rgba(1.0));
        let pixmap = self.surface.pixmap_mut();

        if let Some(grid) = &graph.grid {
            for (a, b, is_center) in grid.lines() {
                let color = if is_center { grid.center_color } else { grid.color };
                if let Some((sa, sb, _)) = projector.segment(a, b) {
                    draw(pixmap, &DrawOp::Line(sa, sb, color.to_rgba(1.0)));
                    stats.grid_lines += 1;
                }
            }
        }

        let group = graph.group.matrix();
        let mut queue = Vec::new();
        for node in graph.group.nodes() {
            let model = group * node.transform.matrix();
            match &node.kind {
                NodeKind::Solid { mesh, color } => {
                    for face in &mesh.faces {
                        let world = face.map(|i| model.transform_point3(mesh.vertices[i]));
                        if let Some(q) = shade_face(&projector, &graph.lights, graph.camera.position, world, *color) {
                            queue.push(q);
                            stats.faces += 1;
                        }
                    }
                }
                NodeKind::Outline { mesh, color } => {
                    for [i, j] in mesh.edges() {
                        let a = model.transform_point3(mesh.vertices[i]);
                        let b = model.transform_point3(mesh.vertices[j]);
                        if let Some(q) = line(&projector, a, b, *color) {
                            queue.push(q);
                            stats.lines += 1;
                        }
                    }
                }
                NodeKind::Segments { segments, color } => {
                    for (a, b) in segments {
                        let a = model.transform_point3(*a);
                        let b = model.transform_point3(*b);
                        if let Some(q) = line(&projector, a, b, *color) {
                            queue.push(q);
                            stats.lines += 1;
                        }
                    }
                }
                NodeKind::Marker { radius, color } => {
                    let center = projector.to_view(model.transform_point3(Vec3::ZERO));
                    if let Some(screen) = projector.to_screen(center) {
                        let pixels = radius * projector.focal / -center.z;
                        queue.push(Queued {
                            distance: -center.z,
                            op: DrawOp::Disc(screen, pixels, color.to_rgba(1.0)),
                        });
                        stats.markers += 1;
                    }
                }
            }
        }

        // Painter's order: farthest first
        queue.sort_by(|a, b| b.distance.total_cmp(&a.distance));
        for q in &queue {
            draw(pixmap, &q.op);
        }
        stats
    }
}

fn line(projector: &Projector, a: Vec3, b: Vec3, color: Rgb) -> Option<Queued> {
    let (sa, sb, distance) = projector.segment(a, b)?;
    Some(Queued {
        distance,
        op: DrawOp::Line(sa, sb, color.to_rgba(1.0)),
    })
}

/// Flat, double-sided shading: ambient plus diffuse from the point light.
fn shade_face(projector: &Projector, lights: &Lights, eye: Vec3, world: [Vec3; 3], color: Rgb) -> Option<Queued> {
    let view = world.map(|p| projector.to_view(p));
    let screen = [
        projector.to_screen(view[0])?,
        projector.to_screen(view[1])?,
        projector.to_screen(view[2])?,
    ];
    let area = (screen[1] - screen[0]).perp_dot(screen[2] - screen[0]);
    if area.abs() < 1e-3 {
        return None;
    }

    let centroid = (world[0] + world[1] + world[2]) / 3.0;
    let mut normal = (world[1] - world[0]).cross(world[2] - world[0]).normalize_or_zero();
    if normal.dot(eye - centroid) < 0.0 {
        normal = -normal;
    }
    let to_light = (lights.point_position - centroid).normalize_or_zero();
    let diffuse = normal.dot(to_light).max(0.0) * lights.point_intensity;

    let [r, g, b] = color.to_f32();
    let [ar, ag, ab] = lights.ambient_color.to_f32();
    let [pr, pg, pb] = lights.point_color.to_f32();
    let ambient = lights.ambient_intensity;
    let lit = Rgba::new(
        (r * (ar * ambient + pr * diffuse)).min(1.0),
        (g * (ag * ambient + pg * diffuse)).min(1.0),
        (b * (ab * ambient + pb * diffuse)).min(1.0),
        1.0,
    );

    let distance = -(view[0].z + view[1].z + view[2].z) / 3.0;
    Some(Queued {
        distance,
        op: DrawOp::Triangle(screen, lit),
    })
}

fn draw(pixmap: &mut Pixmap, op: &DrawOp) {
    let mut paint = Paint::default();
    paint.anti_alias = true;
    match op {
        DrawOp::Triangle(pts, color) => {
            paint.set_color(skia_color(*color));
            let mut pb = PathBuilder::new();
            pb.move_to(pts[0].x, pts[0].y);
            pb.line_to(pts[1].x, pts[1].y);
            pb.line_to(pts[2].x, pts[2].y);
            pb.close();
            if let Some(path) = pb.finish() {
                pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
            }
        }
        DrawOp::Line(a, b, color) => {
            paint.set_color(skia_color(*color));
            let mut pb = PathBuilder::new();
            pb.move_to(a.x, a.y);
            pb.line_to(b.x, b.y);
            if let Some(path) = pb.finish() {
                let stroke = Stroke {
                    width: 1.0,
                    ..Stroke::default()
                };
                pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
            }
        }
        DrawOp::Disc(center, radius, color) => {
            paint.set_color(skia_color(*color));
            if let Some(path) = PathBuilder::from_circle(center.x, center.y, radius.max(0.5)) {
                pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
            }
        }
    }
}
