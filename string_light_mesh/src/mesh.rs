// Mesh geometry buffers produced by the generator.
//
// `MeshBuffers` holds four parallel-ish sequences: positions, triangle
// indices, per-vertex colors and per-vertex UVs. Positions, colors and UVs are
// strictly parallel (one entry per vertex); indices come in triples that
// reference positions.
//
// Buffers are only ever appended to while generating; `validate` checks the
// invariants a mesh consumer relies on.
//
// See also: `cable.rs` which writes into these buffers, `export.rs` for the
// sinks that consume them.

use glam::{Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Mesh geometry: local-space positions, triangle list, colors and UVs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshBuffers {
    /// Vertex positions in the generator's local space.
    pub vertices: Vec<Vec3>,
    /// Triangle indices, 3 per triangle, referencing `vertices`.
    pub indices: Vec<u32>,
    /// Per-vertex RGBA. Alpha is not clamped.
    pub colors: Vec<Vec4>,
    /// Per-vertex texture coordinates.
    pub uvs: Vec<Vec2>,
}

/// A violated `MeshBuffers` invariant.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    #[error("{colors} colors and {uvs} uvs for {vertices} vertices")]
    AttributeMismatch {
        vertices: usize,
        colors: usize,
        uvs: usize,
    },

    #[error("index count {0} is not a multiple of 3")]
    PartialTriangle(usize),

    #[error("index {index} at position {position} is out of range for {vertices} vertices")]
    IndexOutOfRange {
        position: usize,
        index: u32,
        vertices: usize,
    },
}

impl MeshBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Index the next pushed vertex will get.
    pub fn next_index(&self) -> u32 {
        self.vertices.len() as u32
    }

    /// Push one vertex with its color and UV.
    pub fn push_vertex(&mut self, position: Vec3, color: Vec4, uv: Vec2) {
        self.vertices.push(position);
        self.colors.push(color);
        self.uvs.push(uv);
    }

    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Check that attributes are parallel to positions and every triangle
    /// references an existing vertex.
    pub fn validate(&self) -> Result<(), MeshError> {
        let vertices = self.vertices.len();
        if self.colors.len() != vertices || self.uvs.len() != vertices {
            return Err(MeshError::AttributeMismatch {
                vertices,
                colors: self.colors.len(),
                uvs: self.uvs.len(),
            });
        }
        if self.indices.len() % 3 != 0 {
            return Err(MeshError::PartialTriangle(self.indices.len()));
        }
        if let Some((position, &index)) = self
            .indices
            .iter()
            .enumerate()
            .find(|&(_, &i)| i as usize >= vertices)
        {
            return Err(MeshError::IndexOutOfRange {
                position,
                index,
                vertices,
            });
        }
        Ok(())
    }

    /// Axis-aligned bounds of all positions, or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.vertices.first()?;
        Some(
            self.vertices
                .iter()
                .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
        )
    }
}
