// End-to-end generation over the bundled raycasters.
//
// Drives `generate_with_stats` and `StringLight::awake` against the analytic
// `Scene` and the `VoxelGrid`, with real seeded randomness, and checks the
// mesh that comes out: segment counts, snapping, local-space conversion, and
// the buffer invariants every sink relies on.

use glam::Vec3;
use string_light_mesh::config::{GenerationConfig, ShortSpanPolicy};
use string_light_mesh::export::{CapturedMesh, ObjSink};
use string_light_mesh::generator::{StopReason, StringLight, generate_with_stats};
use string_light_mesh::prng::LightRng;
use string_light_mesh::scene::{Collider, Scene};
use string_light_mesh::transform::NodeTransform;
use string_light_mesh::voxel::VoxelGrid;

/// Unit-thick walls whose near faces sit at each of `faces` along +Z.
fn walls_at(faces: &[f32]) -> Scene {
    Scene::new(
        faces
            .iter()
            .map(|&z| Collider::Box {
                min: Vec3::new(-5.0, -5.0, z),
                max: Vec3::new(5.0, 5.0, z + 1.0),
            })
            .collect(),
    )
}

/// Near wall ending at z = 0, far walls starting at 10 and 21: two spans of
/// exactly 10 when chaining with the default offset.
fn corridor() -> Scene {
    walls_at(&[-1.0, 10.0, 21.0])
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

#[test]
fn single_span_between_walls() {
    let mut rng = LightRng::new(1);
    let generation = generate_with_stats(
        &GenerationConfig::default(),
        Vec3::new(0.0, 2.0, 0.5),
        Vec3::Z,
        &corridor(),
        &(),
        &mut rng,
    );

    assert_eq!(generation.stats.stop, StopReason::SingleSegment);
    // 50 cross-sections and 5 bulbs.
    assert_eq!(generation.mesh.vertex_count(), 2 * 50 + 4 * 5);
    assert_eq!(generation.mesh.indices.len(), 6 * 49 + 6 * 5);
    // Snapped back onto the near wall, hanging half a line width above.
    assert!(approx(generation.mesh.vertices[0].z, 0.0));
    assert!(approx(generation.mesh.vertices[0].y, 2.25));
    assert!(approx(generation.mesh.vertices[1].y, 1.75));
    assert_eq!(generation.mesh.validate(), Ok(()));
}

#[test]
fn repeated_chain_through_corridor() {
    let config = GenerationConfig {
        repeated: true,
        ..GenerationConfig::default()
    };
    let mut rng = LightRng::new(1);
    let generation = generate_with_stats(
        &config,
        Vec3::new(0.0, 2.0, 0.5),
        Vec3::Z,
        &corridor(),
        &(),
        &mut rng,
    );

    // 0..10, then 11..21, then the cast from inside the last wall misses.
    assert_eq!(generation.stats.segments, 2);
    assert_eq!(generation.stats.stop, StopReason::NoSurface);
    assert_eq!(generation.mesh.vertex_count(), 2 * 120);
    assert_eq!(generation.mesh.validate(), Ok(()));

    // The second strip starts on the far face of the first wall.
    assert!(approx(generation.mesh.vertices[120].z, 11.0));
}

#[test]
fn short_span_yields_empty_mesh() {
    // Walls 0.3 apart: one cross-section only.
    let scene = walls_at(&[-1.0, 0.3]);
    let mut rng = LightRng::new(1);
    let generation = generate_with_stats(
        &GenerationConfig::default(),
        Vec3::new(0.0, 2.0, 0.1),
        Vec3::Z,
        &scene,
        &(),
        &mut rng,
    );
    assert!(generation.mesh.is_empty());
    assert_eq!(generation.mesh.triangle_count(), 0);
    assert!(matches!(generation.stats.stop, StopReason::ShortSpan { .. }));
}

#[test]
fn mesh_invariants_hold_across_configs() {
    let configs = [
        GenerationConfig::default(),
        GenerationConfig {
            repeated: true,
            gravity_strength: 1.5,
            light_density: 0.5,
            ..GenerationConfig::default()
        },
        GenerationConfig {
            repeated: true,
            edge_density: 0.05,
            line_width: 0.0,
            min_light_size: glam::Vec2::new(0.5, 0.2),
            max_light_size: glam::Vec2::new(0.1, 0.1),
            ..GenerationConfig::default()
        },
        GenerationConfig {
            repeated: true,
            light_density: 0.0,
            short_span: ShortSpanPolicy::KeepPrevious,
            ..GenerationConfig::default()
        },
    ];

    for (seed, config) in configs.iter().enumerate() {
        let mut rng = LightRng::new(seed as u64);
        let mesh = generate_with_stats(
            config,
            Vec3::new(1.0, 3.0, 2.0),
            Vec3::Z,
            &corridor(),
            &(),
            &mut rng,
        )
        .mesh;
        assert_eq!(mesh.validate(), Ok(()), "config {seed}");
        assert!(!mesh.is_empty(), "config {seed}");
        for color in &mesh.colors {
            for channel in color.truncate().to_array() {
                assert!((0.0..=1.0).contains(&channel), "config {seed}");
            }
        }
    }
}

#[test]
fn rotated_node_emits_in_local_space() {
    // Walls across X; the node looks along +X from half a unit past the
    // near face.
    let scene = Scene::new(vec![
        Collider::Box {
            min: Vec3::new(-1.0, -5.0, -5.0),
            max: Vec3::new(0.0, 5.0, 5.0),
        },
        Collider::Box {
            min: Vec3::new(10.0, -5.0, -5.0),
            max: Vec3::new(11.0, 5.0, 5.0),
        },
    ]);
    let node = NodeTransform::looking_along(Vec3::new(0.5, 2.0, 0.0), Vec3::X);
    let light = StringLight::new(GenerationConfig::default(), node);

    let mut rng = LightRng::new(3);
    let generation = light.generate(&scene, &mut rng);
    assert_eq!(generation.stats.segments, 1);

    // World X maps to local Z; the cable and its bulbs lie in local x = 0.
    for v in &generation.mesh.vertices {
        assert!(v.x.abs() < 1e-3, "vertex {v} off the local plane");
        assert!(v.z > -0.5 - 1e-3 && v.z < 9.5 + 1e-3, "vertex {v} outside span");
    }
    assert!(approx(generation.mesh.vertices[0].z, -0.5));
}

#[test]
fn voxel_room_end_to_end() {
    let mut grid = VoxelGrid::new(16, 8, 16);
    grid.fill([0, 0, 0], [15, 7, 0]);
    grid.fill([0, 0, 12], [15, 7, 12]);

    let mut rng = LightRng::new(5);
    let generation = generate_with_stats(
        &GenerationConfig::default(),
        Vec3::new(8.5, 4.5, 3.0),
        Vec3::Z,
        &grid,
        &(),
        &mut rng,
    );
    assert_eq!(generation.stats.segments, 1);
    // Snapped to the inner face of the near wall.
    assert!(approx(generation.mesh.vertices[0].z, 1.0));
    assert_eq!(generation.mesh.validate(), Ok(()));
}

#[test]
fn awake_hands_mesh_to_sink() {
    let light = StringLight::new(
        GenerationConfig::default(),
        NodeTransform::from_translation(Vec3::new(0.0, 2.0, 0.5)),
    );
    let mut sink = CapturedMesh::default();
    let stats = light
        .awake(&corridor(), &mut LightRng::new(9), &mut sink)
        .unwrap();

    assert_eq!(sink.uploads, 1);
    assert_eq!(sink.submesh, 0);
    let mesh = sink.mesh.unwrap();
    assert_eq!(mesh.vertex_count(), stats.vertices);
    assert_eq!(mesh.triangle_count(), stats.triangles);
}

#[test]
fn awake_skips_sink_when_aborted() {
    let light = StringLight::new(
        GenerationConfig::default(),
        NodeTransform::from_translation(Vec3::new(0.0, 2.0, 0.1)),
    );
    let mut sink = CapturedMesh::default();
    let stats = light
        .awake(&walls_at(&[-1.0, 0.3]), &mut LightRng::new(9), &mut sink)
        .unwrap();
    assert!(stats.discarded(&light.config));
    assert_eq!(sink.uploads, 0);
    assert!(sink.mesh.is_none());
}

#[test]
fn awake_writes_obj() {
    let light = StringLight::new(
        GenerationConfig::default(),
        NodeTransform::from_translation(Vec3::new(0.0, 2.0, 0.5)),
    );
    let mut sink = ObjSink::new(Vec::new(), "string_light");
    let stats = light
        .awake(&corridor(), &mut LightRng::new(2), &mut sink)
        .unwrap();

    let text = String::from_utf8(sink.into_inner()).unwrap();
    let faces = text.lines().filter(|l| l.starts_with("f ")).count();
    let verts = text.lines().filter(|l| l.starts_with("v ")).count();
    assert_eq!(faces, stats.triangles);
    assert_eq!(verts, stats.vertices);
}
