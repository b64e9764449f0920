// string_light_mesh: pure Rust string-light mesh generation.
//
// Builds a drooping cable ribbon with randomly placed hanging bulbs between
// surfaces found by raycasting. Everything the host engine normally provides
// (physics raycasts, the transform hierarchy, mesh upload) comes in through
// the capability traits in `host.rs`, so the generator runs headless and is
// tested without an engine or scene.
//
// Module overview:
// - `config.rs`:    GenerationConfig, all tunable shape parameters, loaded from JSON.
// - `host.rs`:      Raycaster / LocalSpace / MeshSink capability traits + RaycastHit.
// - `mesh.rs`:      MeshBuffers (positions, indices, colors, UVs) and invariant checks.
// - `cable.rs`:     Droop curve, cable strip emission, bulb emission for one span.
// - `generator.rs`: Chaining loop (`generate`) and the `StringLight` component.
// - `transform.rs`: NodeTransform, world/local conversion via glam's Affine3A.
// - `scene.rs`:     Analytic collider scene (planes, boxes) implementing Raycaster.
// - `voxel.rs`:     Dense voxel grid with a 3D DDA raycast implementing Raycaster.
// - `export.rs`:    Mesh sinks: Wavefront OBJ, JSON, in-memory capture.
// - `prng`:         Re-exported from `string_light_prng`: RandomSource + LightRng.
//
// The companion crate `string_light_cli` drives this library from the command
// line. Generation is single-threaded and synchronous; given the same config,
// scene and RNG seed it produces an identical mesh.

pub mod cable;
pub mod config;
pub mod export;
pub mod generator;
pub mod host;
pub mod mesh;
pub use string_light_prng as prng;
pub mod scene;
pub mod transform;
pub mod voxel;
