// Analytic collider scene with a physics-engine style raycast.
//
// A `Scene` is a flat list of colliders loaded from JSON:
//
//   Plane: infinite one-sided plane through `point` facing `normal`. Only
//           rays starting strictly in front of it can hit it.
//   Box:   axis-aligned box from `min` to `max`, tested with the slab method.
//
// Matching the convention of common physics engines, a collider whose
// interior (boundary included) contains the ray origin is not reported. That
// is what lets the generator cast backward from a hit point without re-hitting
// the surface it is sitting on, and lets a chained ray that starts inside a
// wall pass out of it.
//
// See also: `host.rs` for the `Raycaster` trait, `voxel.rs` for the grid-based
// alternative.

use crate::host::{RaycastHit, Raycaster};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tolerance for "origin on the surface" and parallel-ray checks.
const EPSILON: f32 = 1e-5;

/// One solid shape in the scene.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Collider {
    Plane { point: Vec3, normal: Vec3 },
    Box { min: Vec3, max: Vec3 },
}

impl Collider {
    /// Hit along a ray with normalized `dir`, ignoring colliders that
    /// contain `origin`.
    fn raycast(&self, origin: Vec3, dir: Vec3) -> Option<RaycastHit> {
        match *self {
            Collider::Plane { point, normal } => raycast_plane(point, normal, origin, dir),
            Collider::Box { min, max } => raycast_box(min, max, origin, dir),
        }
    }
}

fn raycast_plane(point: Vec3, normal: Vec3, origin: Vec3, dir: Vec3) -> Option<RaycastHit> {
    let normal = normal.try_normalize()?;
    let height = (origin - point).dot(normal);
    let approach = dir.dot(normal);
    if height <= EPSILON || approach >= -EPSILON {
        return None;
    }
    let distance = height / -approach;
    Some(RaycastHit {
        point: origin + dir * distance,
        normal,
        distance,
    })
}

fn raycast_box(min: Vec3, max: Vec3, origin: Vec3, dir: Vec3) -> Option<RaycastHit> {
    let lo = min.min(max);
    let hi = min.max(max);
    if origin.cmpge(lo - EPSILON).all() && origin.cmple(hi + EPSILON).all() {
        return None;
    }
    let (distance, axis) = ray_aabb_entry(origin, dir, lo, hi)?;
    let mut normal = Vec3::ZERO;
    normal[axis] = -dir[axis].signum();
    Some(RaycastHit {
        point: origin + dir * distance,
        normal,
        distance,
    })
}

/// Slab test for a ray starting outside the box `[lo, hi]`: the distance at
/// which it enters and the axis whose face it enters through.
pub(crate) fn ray_aabb_entry(origin: Vec3, dir: Vec3, lo: Vec3, hi: Vec3) -> Option<(f32, usize)> {
    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    let mut enter_axis = 0;
    for axis in 0..3 {
        if dir[axis].abs() < EPSILON {
            if origin[axis] < lo[axis] || origin[axis] > hi[axis] {
                return None;
            }
            continue;
        }
        let t0 = (lo[axis] - origin[axis]) / dir[axis];
        let t1 = (hi[axis] - origin[axis]) / dir[axis];
        let (near, far) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };
        if near > t_enter {
            t_enter = near;
            enter_axis = axis;
        }
        t_exit = t_exit.min(far);
    }

    if t_enter > t_exit || t_enter < 0.0 {
        return None;
    }
    Some((t_enter, enter_axis))
}

/// Errors from loading a scene description.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("failed to read scene file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid scene JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A set of colliders queried together.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub colliders: Vec<Collider>,
}

impl Scene {
    pub fn new(colliders: Vec<Collider>) -> Self {
        Self { colliders }
    }

    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, SceneError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

impl Raycaster for Scene {
    fn cast(&self, origin: Vec3, direction: Vec3) -> Option<RaycastHit> {
        let dir = direction.try_normalize()?;
        self.colliders
            .iter()
            .filter_map(|c| c.raycast(origin, dir))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}
