pub mod assembler;
pub mod geometry;
pub mod graph;
pub mod render;
pub mod rotation;
pub mod scene;

pub use assembler::{GeometryAssembler, INITIAL_ORIENTATION};
pub use geometry::{euler_xyz, Mesh, NodeTransform};
pub use graph::{Camera, Grid, Group, Lights, Node, NodeKind, SceneGraph};
pub use render::{RenderStats, SoftwareRenderer};
pub use rotation::RotationIntegrator;
pub use scene::MerkabaScene;
