//! Builds the merkaba scene graph from settings.
//!
//! Two interlocking tetrahedra ("up" and "down", the latter turned half a
//! revolution about x and y), their edge outlines, eight vertex markers on
//! the scaled cube corners and the four inner lines joining opposite markers.

use glam::Vec3;
use hypno_core::{MerkabaSettings, Viewport};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, FRAC_PI_6, PI};
use std::sync::Arc;

use crate::geometry::{Mesh, NodeTransform};
use crate::graph::{Camera, Grid, Group, Lights, Node, NodeKind, SceneGraph};

/// Fixed tilt applied to the group after every rebuild: 30° about x, 45° about y.
pub const INITIAL_ORIENTATION: Vec3 = Vec3::new(FRAC_PI_6, FRAC_PI_4, 0.0);

pub const CAMERA_FOV_Y: f32 = 45.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;
/// Camera distance in units of `size`.
pub const CAMERA_DISTANCE: f32 = 5.0;

pub const MARKER_RADIUS: f32 = 0.1;
pub const GRID_SIZE: f32 = 200.0;
pub const GRID_DIVISIONS: u32 = 50;

/// Cube corners shared by the tetrahedron and the marker layout.
pub const CORNERS: [Vec3; 4] = [
    Vec3::new(1.0, 1.0, 1.0),
    Vec3::new(-1.0, -1.0, 1.0),
    Vec3::new(-1.0, 1.0, -1.0),
    Vec3::new(1.0, -1.0, -1.0),
];

const UP_ROTATION: Vec3 = Vec3::new(FRAC_PI_2, 0.0, 0.0);
const DOWN_ROTATION: Vec3 = Vec3::new(-PI, PI, 0.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pointing {
    Up,
    Down,
}

/// Vertical interlock offset: `size / √divisor`.
fn offset(size: f32, divisor: f32) -> f32 {
    size / divisor.sqrt()
}

fn placement(pointing: Pointing, size: f32, y: f32) -> NodeTransform {
    NodeTransform {
        position: Vec3::new(0.0, y, 0.0),
        rotation: match pointing {
            Pointing::Up => UP_ROTATION,
            Pointing::Down => DOWN_ROTATION,
        },
        scale: size,
    }
}

/// Builds fresh scene graphs. Holds the one shared unit tetrahedron.
#[derive(Debug, Clone)]
pub struct GeometryAssembler {
    tetrahedron: Arc<Mesh>,
}

impl Default for GeometryAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometryAssembler {
    pub fn new() -> Self {
        Self {
            tetrahedron: Arc::new(Mesh::tetrahedron(1.0)),
        }
    }

    pub fn tetrahedron(&self) -> &Arc<Mesh> {
        &self.tetrahedron
    }

    /// Build a complete graph. Identical inputs always give identical graphs.
    pub fn build(&self, settings: &MerkabaSettings, viewport: Viewport) -> SceneGraph {
        let size = settings.size;
        let mut group = Group {
            rotation: INITIAL_ORIENTATION,
            solids: Vec::new(),
            wireframes: Vec::new(),
            markers: Vec::new(),
        };

        let base = offset(size, 30000.0);
        self.push_solid(&mut group, settings, placement(Pointing::Up, size, base));
        self.push_solid(&mut group, settings, placement(Pointing::Down, size, -base));
        self.push_outline(&mut group, settings, placement(Pointing::Up, size, base));
        self.push_outline(&mut group, settings, placement(Pointing::Down, size, -base));

        let corner_scale = size / 2.0_f32.sqrt();
        let mut inner = Vec::with_capacity(CORNERS.len());
        for corner in CORNERS {
            let p = corner * corner_scale;
            for position in [p, -p] {
                group.markers.push(Node::new(
                    NodeTransform::at(position),
                    NodeKind::Marker {
                        radius: MARKER_RADIUS * size,
                        color: settings.sphere_color,
                    },
                ));
            }
            inner.push((p, -p));
        }
        group.wireframes.push(Node::new(
            NodeTransform::default(),
            NodeKind::Segments {
                segments: inner,
                color: settings.wireframe_color,
            },
        ));

        if settings.show_solid_polygons {
            self.push_solid(&mut group, settings, placement(Pointing::Up, size, offset(size, 25000.0)));
            self.push_solid(&mut group, settings, placement(Pointing::Down, size, -offset(size, 40000.0)));
            self.push_outline(&mut group, settings, placement(Pointing::Up, size, offset(size, 40000.0)));
            self.push_outline(&mut group, settings, placement(Pointing::Down, size, -offset(size, 25000.0)));
        }

        SceneGraph {
            background: settings.background_color,
            group,
            grid: settings.show_grid.then(|| Grid::new(GRID_SIZE, GRID_DIVISIONS)),
            lights: Lights::default(),
            camera: Camera::perspective(
                CAMERA_FOV_Y,
                viewport,
                CAMERA_NEAR,
                CAMERA_FAR,
                Vec3::new(0.0, 0.0, size * CAMERA_DISTANCE),
            ),
        }
    }

    fn push_solid(&self, group: &mut Group, settings: &MerkabaSettings, transform: NodeTransform) {
        group.solids.push(Node::new(
            transform,
            NodeKind::Solid {
                mesh: Arc::clone(&self.tetrahedron),
                color: settings.solid_polygon_color,
            },
        ));
    }

    fn push_outline(&self, group: &mut Group, settings: &MerkabaSettings, transform: NodeTransform) {
        group.wireframes.push(Node::new(
            transform,
            NodeKind::Outline {
                mesh: Arc::clone(&self.tetrahedron),
                color: settings.wireframe_color,
            },
        ));
    }
}
