// World transform of the node that owns the generated mesh.
//
// Wraps a `glam::Affine3A` and caches its inverse so `to_local` is a single
// affine multiply per point. The generator only ever reads the transform:
// `position()` is where the first ray starts and `forward()` (local +Z in
// world space) is the direction every ray is cast along.

use crate::host::LocalSpace;
use glam::{Affine3A, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Translation / rotation / scale of a scene node.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "TransformParts", into = "TransformParts")]
pub struct NodeTransform {
    parts: TransformParts,
    world: Affine3A,
    inverse: Affine3A,
}

/// Serialized form of a `NodeTransform`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformParts {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for TransformParts {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl From<TransformParts> for NodeTransform {
    fn from(parts: TransformParts) -> Self {
        let world = Affine3A::from_scale_rotation_translation(
            parts.scale,
            parts.rotation,
            parts.translation,
        );
        Self {
            parts,
            world,
            inverse: world.inverse(),
        }
    }
}

impl From<NodeTransform> for TransformParts {
    fn from(transform: NodeTransform) -> Self {
        transform.parts
    }
}

impl Default for NodeTransform {
    fn default() -> Self {
        TransformParts::default().into()
    }
}

impl NodeTransform {
    pub fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        TransformParts {
            translation,
            rotation,
            scale,
        }
        .into()
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quat::IDENTITY, Vec3::ONE)
    }

    /// A node at `position` whose forward axis points along `forward`, with
    /// +Y kept as close to world up as possible.
    pub fn looking_along(position: Vec3, forward: Vec3) -> Self {
        let forward = forward.normalize_or(Vec3::Z);
        let rotation = Quat::from_rotation_arc(Vec3::Z, forward);
        // Roll about forward so local up stays in the plane of world up.
        let up = rotation * Vec3::Y;
        let wanted_up = (Vec3::Y - forward * forward.dot(Vec3::Y)).normalize_or(up);
        let roll = Quat::from_rotation_arc(up, wanted_up);
        Self::new(position, roll * rotation, Vec3::ONE)
    }

    /// World-space position of the node.
    pub fn position(&self) -> Vec3 {
        self.parts.translation
    }

    /// World-space direction of the node's local +Z axis, normalized.
    pub fn forward(&self) -> Vec3 {
        (self.parts.rotation * Vec3::Z).normalize()
    }

    pub fn to_world(&self, local_point: Vec3) -> Vec3 {
        self.world.transform_point3(local_point)
    }
}

impl LocalSpace for NodeTransform {
    fn to_local(&self, world_point: Vec3) -> Vec3 {
        self.inverse.transform_point3(world_point)
    }
}
