// Geometry for one cable span: the droop curve, the ribbon strip, and bulbs.
//
// A span runs from the surface the cable hangs from (`start`) to the surface
// the forward ray struck (`end`). Along it:
//
//   strip: `edge_count` cross-sections, each a vertical top/bottom vertex
//           pair, joined into a quad strip. Flat tinted line: every strip
//           vertex samples the blank texel at UV (0.5, 0.5).
//   bulbs: `light_count` quads hanging just below the cable at random
//           points in the middle 60% of the span, with full 0..1 UVs so they
//           pick up the light texture.
//
// Sag is a parabola rather than a catenary: `droop(t)` is 0 at both anchors
// and `gravity_strength` at the midpoint.
//
// Cross-section `i` uses `t = i * edge_density`, a *distance*, as its lerp
// fraction and its alpha. The lerp clamps to [0, 1] like the host engine's
// vector lerp, so on spans longer than 1 unit the trailing cross-sections all
// pin to the end anchor, and alpha exceeds 1. Both are part of the visual
// output contract and are kept as-is.
//
// Local axes: +Y is up, +Z is the generator's forward (the bulb's lateral
// axis, perpendicular to the droop direction).
//
// See also: `generator.rs` which finds spans and calls into this module,
// `mesh.rs` for the buffers written here.

use crate::config::GenerationConfig;
use crate::host::LocalSpace;
use crate::mesh::MeshBuffers;
use crate::prng::RandomSource;
use glam::{Vec2, Vec3, Vec4};

/// UV of the blank (white) texel the strip samples.
pub const BLANK_UV: Vec2 = Vec2::new(0.5, 0.5);

/// Bulbs never sit closer to an anchor than this fraction of the span.
pub const BULB_T_MIN: f32 = 0.2;
pub const BULB_T_MAX: f32 = 0.8;

/// Bulb quad UVs in push order: tl, tr, br, bl.
const BULB_UVS: [Vec2; 4] = [Vec2::new(0.0, 1.0), Vec2::ONE, Vec2::new(1.0, 0.0), Vec2::ZERO];

/// Downward sag at parameter `t`:
/// `gravity * (1 - |0.5 - clamp01(t)|^2 / 0.25)`.
pub fn droop(gravity_strength: f32, t: f32) -> f32 {
    gravity_strength * (1.0 - (0.5 - t.clamp(0.0, 1.0)).abs().powi(2) / 0.25)
}

/// One anchored stretch of cable, in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Span {
    pub start: Vec3,
    pub end: Vec3,
    /// Measured anchor-to-anchor distance reported by the raycast.
    pub distance: f32,
}

impl Span {
    /// World point at fraction `t`, clamped to the anchors.
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.start.lerp(self.end, t.clamp(0.0, 1.0))
    }
}

/// Emit the cable ribbon for `span` with `edge_count` cross-sections.
///
/// Adds `2 * edge_count` vertices and `6 * (edge_count - 1)` indices. Indices
/// are offset by the buffer's vertex count on entry.
pub fn emit_strip(
    mesh: &mut MeshBuffers,
    config: &GenerationConfig,
    span: &Span,
    local: &impl LocalSpace,
    edge_count: usize,
) {
    let start_index = mesh.next_index();
    let half_width = Vec3::Y * (config.line_width / 2.0);

    for i in 0..edge_count {
        let t = i as f32 * config.edge_density;
        let sag = droop(config.gravity_strength, t);
        let center = local.to_local(span.point_at(t)) + Vec3::NEG_Y * sag;
        let color = config.line_color.truncate().extend(t);

        mesh.push_vertex(center + half_width, color, BLANK_UV);
        mesh.push_vertex(center - half_width, color, BLANK_UV);

        if i + 1 < edge_count {
            let top = start_index + 2 * i as u32;
            let bot = top + 1;
            let next_top = top + 2;
            let next_bot = top + 3;
            mesh.push_triangle(top, next_top, bot);
            mesh.push_triangle(next_top, next_bot, bot);
        }
    }
}

/// A sampled bulb before it is turned into a quad.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bulb {
    /// Placement along the span, in [0.2, 0.8].
    pub t: f32,
    /// RGB from {0, 0.5, 1} per channel, alpha = `t`.
    pub color: Vec4,
    /// Quad (width, height).
    pub size: Vec2,
}

impl Bulb {
    /// Draw one bulb. Sampling order is fixed: placement, R, G, B, width,
    /// height, so a seeded source always yields the same string.
    pub fn sample(config: &GenerationConfig, rng: &mut impl RandomSource) -> Self {
        let t = rng.range_f32(BULB_T_MIN, BULB_T_MAX);
        let mut channel = || rng.range_u32(0, 3) as f32 / 2.0;
        let color = Vec4::new(channel(), channel(), channel(), t);
        let size = Vec2::new(
            rng.range_f32(config.min_light_size.x, config.max_light_size.x),
            rng.range_f32(config.min_light_size.y, config.max_light_size.y),
        );
        Self { t, color, size }
    }
}

/// Emit `light_count` randomly sampled bulbs along `span`.
///
/// Adds `4 * light_count` vertices and `6 * light_count` indices.
pub fn emit_bulbs(
    mesh: &mut MeshBuffers,
    config: &GenerationConfig,
    span: &Span,
    local: &impl LocalSpace,
    light_count: usize,
    rng: &mut impl RandomSource,
) {
    for _ in 0..light_count {
        let bulb = Bulb::sample(config, rng);
        emit_bulb(mesh, config, span, local, &bulb);
    }
}

/// Emit one bulb quad hanging from the cable at `bulb.t`.
///
/// The sag is applied in world space before the local conversion; the
/// half-line-width drop that hangs the bulb under the cable is applied in
/// local space.
pub fn emit_bulb(
    mesh: &mut MeshBuffers,
    config: &GenerationConfig,
    span: &Span,
    local: &impl LocalSpace,
    bulb: &Bulb,
) {
    let sag = droop(config.gravity_strength, bulb.t);
    let center = local.to_local(span.point_at(bulb.t) + Vec3::NEG_Y * sag)
        + Vec3::NEG_Y * (config.line_width / 2.0);

    let half_lateral = Vec3::Z * (bulb.size.x / 2.0);
    let drop = Vec3::NEG_Y * bulb.size.y;
    let tl = center - half_lateral;
    let tr = center + half_lateral;
    let br = tr + drop;
    let bl = tl + drop;

    let base = mesh.next_index();
    for (corner, uv) in [tl, tr, br, bl].into_iter().zip(BULB_UVS) {
        mesh.push_vertex(corner, bulb.color, uv);
    }
    mesh.push_triangle(base, base + 1, base + 2);
    mesh.push_triangle(base, base + 2, base + 3);
}
