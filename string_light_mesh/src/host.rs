// Capability traits for everything the host engine provides.
//
// The generator needs three things from its environment: a physics raycast,
// a world-to-local point conversion for the node that owns the mesh, and a
// place to hand the finished mesh. Each is a small trait so the algorithm in
// `generator.rs` stays host-agnostic; the reference implementations live in
// `scene.rs`, `voxel.rs`, `transform.rs` and `export.rs`.

use crate::mesh::MeshBuffers;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// The nearest surface a ray struck.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RaycastHit {
    /// World-space contact point.
    pub point: Vec3,
    /// Unit surface normal at the contact, facing back toward the ray.
    pub normal: Vec3,
    /// Distance from the ray origin to `point`. Always >= 0.
    pub distance: f32,
}

/// Physics raycast query. Must support casting in any direction; the
/// generator casts forward to find the far anchor and backward to snap the
/// start onto the surface it hangs from.
pub trait Raycaster {
    /// Nearest hit along the ray, or `None` if nothing is struck.
    /// `direction` need not be normalized.
    fn cast(&self, origin: Vec3, direction: Vec3) -> Option<RaycastHit>;
}

/// Converts world-space points into the generator's local space (the inverse
/// of the owning node's world transform).
pub trait LocalSpace {
    fn to_local(&self, world_point: Vec3) -> Vec3;
}

/// Generation runs with world space == local space.
impl LocalSpace for () {
    fn to_local(&self, world_point: Vec3) -> Vec3 {
        world_point
    }
}

/// Accepts finished geometry and builds a renderable mesh from it. A sink owns
/// its mesh and replaces any previous one on each call.
pub trait MeshSink {
    type Error;

    /// Replace the sink's mesh with `mesh`, triangles assigned to `submesh`.
    fn set_mesh(&mut self, mesh: MeshBuffers, submesh: usize) -> Result<(), Self::Error>;
}

impl<R: Raycaster + ?Sized> Raycaster for &R {
    fn cast(&self, origin: Vec3, direction: Vec3) -> Option<RaycastHit> {
        (**self).cast(origin, direction)
    }
}

impl<L: LocalSpace + ?Sized> LocalSpace for &L {
    fn to_local(&self, world_point: Vec3) -> Vec3 {
        (**self).to_local(world_point)
    }
}
