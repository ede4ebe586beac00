use glam::{Mat4, Vec3};
use hypno_core::{Rgb, Viewport};
use std::sync::Arc;

use crate::geometry::{euler_xyz, Mesh, NodeTransform};

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Flat-shaded, lit, double-sided triangles.
    Solid { mesh: Arc<Mesh>, color: Rgb },
    /// Outline of a mesh's edges.
    Outline { mesh: Arc<Mesh>, color: Rgb },
    /// Free line segments in node space.
    Segments { segments: Vec<(Vec3, Vec3)>, color: Rgb },
    /// Unlit sphere centered on the node origin.
    Marker { radius: f32, color: Rgb },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub transform: NodeTransform,
    pub kind: NodeKind,
}

impl Node {
    pub fn new(transform: NodeTransform, kind: NodeKind) -> Self {
        Self { transform, kind }
    }

    /// Every geometric point of this node, in the parent's space.
    pub fn points(&self) -> Vec<Vec3> {
        let m = self.transform.matrix();
        match &self.kind {
            NodeKind::Solid { mesh, .. } | NodeKind::Outline { mesh, .. } => {
                mesh.vertices.iter().map(|v| m.transform_point3(*v)).collect()
            }
            NodeKind::Segments { segments, .. } => segments
                .iter()
                .flat_map(|(a, b)| [m.transform_point3(*a), m.transform_point3(*b)])
                .collect(),
            NodeKind::Marker { .. } => vec![m.transform_point3(Vec3::ZERO)],
        }
    }
}

/// The rotating assembly: solids, wireframes and vertex markers.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    /// Euler XYZ orientation, integrated per frame. Unbounded.
    pub rotation: Vec3,
    pub solids: Vec<Node>,
    pub wireframes: Vec<Node>,
    pub markers: Vec<Node>,
}

impl Group {
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_quat(euler_xyz(self.rotation))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.solids.iter().chain(&self.wireframes).chain(&self.markers)
    }

    pub fn node_count(&self) -> usize {
        self.solids.len() + self.wireframes.len() + self.markers.len()
    }
}

/// Square ground-plane grid on xz, centered at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub size: f32,
    pub divisions: u32,
    pub center_color: Rgb,
    pub color: Rgb,
}

impl Grid {
    pub fn new(size: f32, divisions: u32) -> Self {
        Self {
            size,
            divisions,
            center_color: Rgb::new(0x44, 0x44, 0x44),
            color: Rgb::new(0x88, 0x88, 0x88),
        }
    }

    /// Grid lines, with a flag marking the two center lines.
    pub fn lines(&self) -> Vec<(Vec3, Vec3, bool)> {
        let half = self.size / 2.0;
        let step = self.size / self.divisions as f32;
        let center = self.divisions / 2;
        let mut lines = Vec::with_capacity(2 * (self.divisions as usize + 1));
        for i in 0..=self.divisions {
            let k = -half + i as f32 * step;
            let is_center = self.divisions % 2 == 0 && i == center;
            lines.push((Vec3::new(-half, 0.0, k), Vec3::new(half, 0.0, k), is_center));
            lines.push((Vec3::new(k, 0.0, -half), Vec3::new(k, 0.0, half), is_center));
        }
        lines
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lights {
    pub ambient_color: Rgb,
    pub ambient_intensity: f32,
    pub point_color: Rgb,
    pub point_intensity: f32,
    pub point_position: Vec3,
}

impl Default for Lights {
    fn default() -> Self {
        Self {
            ambient_color: Rgb::WHITE,
            ambient_intensity: 0.5,
            point_color: Rgb::WHITE,
            point_intensity: 1.0,
            point_position: Vec3::splat(10.0),
        }
    }
}

/// Perspective camera on +z looking at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
}

impl Camera {
    pub fn perspective(fov_y: f32, viewport: Viewport, near: f32, far: f32, position: Vec3) -> Self {
        Self {
            fov_y,
            aspect: viewport.aspect(),
            near,
            far,
            position,
        }
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.aspect = viewport.aspect();
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, Vec3::ZERO, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y.to_radians(), self.aspect, self.near, self.far)
    }
}

/// Everything the renderer needs for one 3D frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneGraph {
    pub background: Rgb,
    pub group: Group,
    pub grid: Option<Grid>,
    pub lights: Lights,
    pub camera: Camera,
}

impl SceneGraph {
    /// Every vertex, segment endpoint and marker center in group space.
    /// Independent of the group's rotation.
    pub fn vertex_positions(&self) -> Vec<Vec3> {
        self.group.nodes().flat_map(Node::points).collect()
    }

    pub fn solid_count(&self) -> usize {
        self.group.solids.len()
    }

    pub fn wireframe_count(&self) -> usize {
        self.group.wireframes.len()
    }

    pub fn marker_count(&self) -> usize {
        self.group.markers.len()
    }
}
