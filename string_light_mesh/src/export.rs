// Mesh sinks: where finished string-light geometry goes.
//
// - `CapturedMesh` keeps the latest mesh in memory (hosts that upload the
//   buffers themselves, and tests).
// - `ObjSink` writes Wavefront OBJ. Vertex colors use the common `v x y z r g b`
//   extension (alpha is dropped), UVs go to `vt`, and triangles are written as
//   1-based `f v/vt` triples under a `g submesh_N` group.
// - `JsonSink` writes the buffers as pretty JSON via serde.
//
// File sinks validate the mesh before writing so a broken buffer never lands
// on disk half-written.

use crate::host::MeshSink;
use crate::mesh::{MeshBuffers, MeshError};
use serde::Serialize;
use std::convert::Infallible;
use std::io::Write;

/// Errors from writing a mesh out.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("refusing to export invalid mesh: {0}")]
    InvalidMesh(#[from] MeshError),

    #[error("failed to write mesh: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode mesh JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Holds the most recent mesh handed to it.
#[derive(Clone, Debug, Default)]
pub struct CapturedMesh {
    pub mesh: Option<MeshBuffers>,
    pub submesh: usize,
    /// Number of times a mesh was set; each replaces the previous one.
    pub uploads: u32,
}

impl MeshSink for CapturedMesh {
    type Error = Infallible;

    fn set_mesh(&mut self, mesh: MeshBuffers, submesh: usize) -> Result<(), Self::Error> {
        self.mesh = Some(mesh);
        self.submesh = submesh;
        self.uploads += 1;
        Ok(())
    }
}

/// Writes each mesh it receives as a Wavefront OBJ document.
pub struct ObjSink<W: Write> {
    writer: W,
    name: String,
}

impl<W: Write> ObjSink<W> {
    pub fn new(writer: W, name: impl Into<String>) -> Self {
        Self {
            writer,
            name: name.into(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> MeshSink for ObjSink<W> {
    type Error = ExportError;

    fn set_mesh(&mut self, mesh: MeshBuffers, submesh: usize) -> Result<(), Self::Error> {
        mesh.validate()?;
        let w = &mut self.writer;
        writeln!(
            w,
            "# string light: {} vertices, {} triangles",
            mesh.vertex_count(),
            mesh.triangle_count()
        )?;
        writeln!(w, "o {}", self.name)?;
        for (v, c) in mesh.vertices.iter().zip(&mesh.colors) {
            writeln!(w, "v {} {} {} {} {} {}", v.x, v.y, v.z, c.x, c.y, c.z)?;
        }
        for uv in &mesh.uvs {
            writeln!(w, "vt {} {}", uv.x, uv.y)?;
        }
        writeln!(w, "g submesh_{submesh}")?;
        for tri in mesh.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] + 1, tri[1] + 1, tri[2] + 1];
            writeln!(w, "f {a}/{a} {b}/{b} {c}/{c}")?;
        }
        w.flush()?;
        Ok(())
    }
}

#[derive(Serialize)]
struct SubmeshDocument<'a> {
    submesh: usize,
    #[serde(flatten)]
    mesh: &'a MeshBuffers,
}

/// Writes each mesh it receives as a JSON document.
pub struct JsonSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> MeshSink for JsonSink<W> {
    type Error = ExportError;

    fn set_mesh(&mut self, mesh: MeshBuffers, submesh: usize) -> Result<(), Self::Error> {
        mesh.validate()?;
        let doc = SubmeshDocument {
            submesh,
            mesh: &mesh,
        };
        serde_json::to_writer_pretty(&mut self.writer, &doc)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}
