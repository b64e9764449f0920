// The chaining loop and the `StringLight` component.
//
// `generate()` is the whole algorithm:
//
//   1. Cast forward from the ray start. A miss ends generation.
//   2. Cast backward from the hit to snap the start onto the surface the
//      cable hangs from (the start point need not be on a surface).
//   3. Turn the span into cross-sections and bulbs (`cable.rs`). A span too
//      short for 2 cross-sections aborts the whole call.
//   4. Push the next ray start back along the hit normal by `chain_offset`
//      and repeat if `repeated`, otherwise stop.
//
// Under the default `ShortSpanPolicy::DiscardAll` an abort throws away every
// segment already chained in this call, so a late short span yields an empty
// mesh. `KeepPrevious` keeps them instead.
//
// `StringLight` is the component view: a config plus the owning node's
// transform. `awake()` generates from the node's position along its forward
// axis, in its local space, and hands the mesh to a `MeshSink`.
//
// See also: `cable.rs` for per-span geometry, `host.rs` for the traits
// injected here, `config.rs` for every tunable.

use crate::cable::{self, Span};
use crate::config::{GenerationConfig, ShortSpanPolicy};
use crate::host::{LocalSpace, MeshSink, Raycaster};
use crate::mesh::MeshBuffers;
use crate::prng::RandomSource;
use crate::transform::NodeTransform;
use glam::Vec3;
use tracing::{debug, info};

/// Why generation stopped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StopReason {
    /// A forward cast found no surface.
    NoSurface,
    /// `repeated` is off and one segment was built.
    SingleSegment,
    /// `max_segments` segments were built.
    SegmentLimit,
    /// A span fit fewer than 2 cross-sections.
    ShortSpan { span: f32 },
}

/// Counters describing one generation call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GenerationStats {
    /// Segments present in the returned mesh.
    pub segments: u32,
    pub vertices: usize,
    pub triangles: usize,
    pub stop: StopReason,
}

impl GenerationStats {
    /// True when a short span threw away the whole call's geometry.
    pub fn discarded(&self, config: &GenerationConfig) -> bool {
        matches!(self.stop, StopReason::ShortSpan { .. })
            && config.short_span == ShortSpanPolicy::DiscardAll
    }
}

/// Mesh plus stats from one generation call.
#[derive(Clone, Debug)]
pub struct Generation {
    pub mesh: MeshBuffers,
    pub stats: GenerationStats,
}

/// Generate a string-light mesh starting at `start` and casting along
/// `forward`. Returns the (possibly empty) mesh.
pub fn generate(
    config: &GenerationConfig,
    start: Vec3,
    forward: Vec3,
    raycaster: &impl Raycaster,
    local: &impl LocalSpace,
    rng: &mut impl RandomSource,
) -> MeshBuffers {
    generate_with_stats(config, start, forward, raycaster, local, rng).mesh
}

/// `generate`, also reporting how many segments were built and why it stopped.
pub fn generate_with_stats(
    config: &GenerationConfig,
    start: Vec3,
    forward: Vec3,
    raycaster: &impl Raycaster,
    local: &impl LocalSpace,
    rng: &mut impl RandomSource,
) -> Generation {
    let mut mesh = MeshBuffers::new();
    let mut ray_start = start;
    let mut segments = 0u32;

    let stop = loop {
        if config.max_segments.is_some_and(|max| segments >= max) {
            break StopReason::SegmentLimit;
        }

        let Some(hit) = raycaster.cast(ray_start, forward) else {
            break StopReason::NoSurface;
        };

        let mut distance = hit.distance;
        if let Some(back) = raycaster.cast(hit.point, -forward) {
            ray_start = back.point;
            distance = back.distance;
        }

        let span = Span {
            start: ray_start,
            end: hit.point,
            distance,
        };
        let edge_count = config.edge_count(distance);
        if edge_count < 2 {
            debug!(
                span = distance,
                edge_count,
                kept_segments = segments,
                policy = ?config.short_span,
                "span too short for a cable strip, aborting"
            );
            if config.short_span == ShortSpanPolicy::DiscardAll {
                mesh = MeshBuffers::new();
                segments = 0;
            }
            break StopReason::ShortSpan { span: distance };
        }
        let light_count = config.light_count(distance);

        cable::emit_strip(&mut mesh, config, &span, local, edge_count);
        cable::emit_bulbs(&mut mesh, config, &span, local, light_count, rng);
        segments += 1;
        debug!(
            segment = segments,
            span = distance,
            edge_count,
            light_count,
            "built cable segment"
        );

        ray_start = hit.point - hit.normal * config.chain_offset;
        if !config.repeated {
            break StopReason::SingleSegment;
        }
    };

    let stats = GenerationStats {
        segments,
        vertices: mesh.vertex_count(),
        triangles: mesh.triangle_count(),
        stop,
    };
    Generation { mesh, stats }
}

/// A string-light node: shape config plus the node's world transform.
#[derive(Clone, Debug, Default)]
pub struct StringLight {
    pub config: GenerationConfig,
    pub transform: NodeTransform,
}

impl StringLight {
    pub fn new(config: GenerationConfig, transform: NodeTransform) -> Self {
        Self { config, transform }
    }

    /// Generate from the node's position along its forward axis, with
    /// vertices in the node's local space.
    pub fn generate(
        &self,
        raycaster: &impl Raycaster,
        rng: &mut impl RandomSource,
    ) -> Generation {
        generate_with_stats(
            &self.config,
            self.transform.position(),
            self.transform.forward(),
            raycaster,
            &self.transform,
            rng,
        )
    }

    /// Generate and hand the mesh to `sink` as submesh 0.
    ///
    /// An aborted call (short span under `DiscardAll`) leaves the sink
    /// untouched, the way the component bails out before building a mesh.
    pub fn awake<S: MeshSink>(
        &self,
        raycaster: &impl Raycaster,
        rng: &mut impl RandomSource,
        sink: &mut S,
    ) -> Result<GenerationStats, S::Error> {
        let Generation { mesh, stats } = self.generate(raycaster, rng);
        if stats.discarded(&self.config) {
            info!(stop = ?stats.stop, "string light generation aborted, no mesh built");
            return Ok(stats);
        }
        info!(
            segments = stats.segments,
            vertices = stats.vertices,
            triangles = stats.triangles,
            bounds = ?mesh.bounds(),
            stop = ?stats.stop,
            "string light generated"
        );
        sink.set_mesh(mesh, 0)?;
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::RaycastHit;
    use crate::prng::LightRng;
    use std::cell::RefCell;

    /// Raycaster over a line of infinitely thin walls at the given z values,
    /// all facing -Z and +Z. Records every cast it answers.
    struct Walls {
        z: Vec<f32>,
        casts: RefCell<Vec<(Vec3, Vec3)>>,
    }

    impl Walls {
        fn new(z: &[f32]) -> Self {
            Self {
                z: z.to_vec(),
                casts: RefCell::new(Vec::new()),
            }
        }
    }

    impl Raycaster for Walls {
        fn cast(&self, origin: Vec3, direction: Vec3) -> Option<RaycastHit> {
            self.casts.borrow_mut().push((origin, direction));
            let dz = direction.z.signum();
            self.z
                .iter()
                .map(|&z| (z - origin.z) * dz)
                .filter(|&d| d > 1e-4)
                .min_by(|a, b| a.total_cmp(b))
                .map(|d| RaycastHit {
                    point: Vec3::new(origin.x, origin.y, origin.z + d * dz),
                    normal: Vec3::new(0.0, 0.0, -dz),
                    distance: d,
                })
        }
    }

    fn run(config: &GenerationConfig, walls: &Walls) -> Generation {
        let mut rng = LightRng::new(7);
        generate_with_stats(config, Vec3::new(0.0, 2.0, 0.5), Vec3::Z, walls, &(), &mut rng)
    }

    #[test]
    fn no_surface_gives_empty_mesh() {
        let generation = run(&GenerationConfig::default(), &Walls::new(&[]));
        assert!(generation.mesh.is_empty());
        assert_eq!(generation.stats.stop, StopReason::NoSurface);
        assert_eq!(generation.stats.segments, 0);
    }

    #[test]
    fn single_segment_snaps_start_to_back_surface() {
        // Start at z=0.5 between walls at 0 and 10: back cast snaps to z=0.
        let walls = Walls::new(&[0.0, 10.0, 20.0]);
        let generation = run(&GenerationConfig::default(), &walls);

        assert_eq!(generation.stats.stop, StopReason::SingleSegment);
        assert_eq!(generation.stats.segments, 1);
        // span 10: 50 cross-sections, 5 bulbs.
        assert_eq!(generation.mesh.vertex_count(), 100 + 20);
        assert_eq!(generation.mesh.indices.len(), 6 * 49 + 6 * 5);
        assert_eq!(generation.mesh.vertices[0].z, 0.0);
        // Forward then backward: exactly one iteration.
        assert_eq!(walls.casts.borrow().len(), 2);
    }

    #[test]
    fn repeated_chains_until_forward_miss() {
        let walls = Walls::new(&[0.0, 10.0, 20.0]);
        let config = GenerationConfig {
            repeated: true,
            ..GenerationConfig::default()
        };
        let generation = run(&config, &walls);

        // Segment 0..10, then 10..20, then the cast from 21 misses.
        assert_eq!(generation.stats.segments, 2);
        assert_eq!(generation.stats.stop, StopReason::NoSurface);
        assert_eq!(generation.mesh.vertex_count(), 2 * 120);
        assert_eq!(generation.mesh.validate(), Ok(()));
        // 2 casts per segment plus the final miss.
        assert_eq!(walls.casts.borrow().len(), 5);
    }

    #[test]
    fn late_short_span_discards_everything_by_default() {
        // Second segment starts at 10.1 and spans 10..10.3: one cross-section.
        let walls = Walls::new(&[0.0, 10.0, 10.3]);
        let config = GenerationConfig {
            repeated: true,
            chain_offset: 0.1,
            ..GenerationConfig::default()
        };
        let generation = run(&config, &walls);
        assert!(generation.mesh.is_empty());
        assert_eq!(generation.stats.segments, 0);
        assert!(matches!(generation.stats.stop, StopReason::ShortSpan { .. }));
        assert!(generation.stats.discarded(&config));
    }

    #[test]
    fn keep_previous_policy_retains_built_segments() {
        let walls = Walls::new(&[0.0, 10.0, 10.3]);
        let config = GenerationConfig {
            repeated: true,
            chain_offset: 0.1,
            short_span: ShortSpanPolicy::KeepPrevious,
            ..GenerationConfig::default()
        };
        let generation = run(&config, &walls);
        assert_eq!(generation.stats.segments, 1);
        assert_eq!(generation.mesh.vertex_count(), 120);
        assert!(!generation.stats.discarded(&config));
    }

    #[test]
    fn microscopic_edge_density_aborts_instead_of_allocating() {
        let config = GenerationConfig {
            edge_density: 1e-9,
            ..GenerationConfig::default()
        };
        let generation = run(&config, &Walls::new(&[0.0, 10.0]));
        assert!(generation.mesh.is_empty());
        assert!(matches!(generation.stats.stop, StopReason::ShortSpan { .. }));
    }

    #[test]
    fn segment_limit_stops_chaining() {
        let walls = Walls::new(&[0.0, 10.0, 20.0, 30.0]);
        let config = GenerationConfig {
            repeated: true,
            max_segments: Some(1),
            ..GenerationConfig::default()
        };
        let generation = run(&config, &walls);
        assert_eq!(generation.stats.segments, 1);
        assert_eq!(generation.stats.stop, StopReason::SegmentLimit);
    }

    #[test]
    fn same_seed_same_mesh() {
        let walls = Walls::new(&[0.0, 10.0]);
        let a = run(&GenerationConfig::default(), &walls).mesh;
        let b = run(&GenerationConfig::default(), &walls).mesh;
        assert_eq!(a, b);
    }
}
