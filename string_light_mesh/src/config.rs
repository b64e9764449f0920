// Data-driven generation configuration.
//
// All tunable string-light parameters live in `GenerationConfig`, loaded from
// JSON. The generator never uses magic numbers for shape; it reads them from
// the config. Every field has a default (`#[serde(default)]`), so a config
// file only needs to list the values it changes.
//
// Densities are *distances*: `edge_density` is the spacing between cable
// cross-sections and `light_density` is the spacing per bulb, so a longer span
// gets proportionally more of both.
//
// See also: `generator.rs` which reads the config once per `generate()` call,
// `cable.rs` for how each field shapes the geometry.

use glam::{Vec2, Vec4};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What to do when a detected span is too short to hold a cable strip
/// (fewer than 2 cross-sections).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShortSpanPolicy {
    /// Abort the whole generation call and return an empty mesh, discarding
    /// segments already chained in this call.
    #[default]
    DiscardAll,
    /// Stop chaining but keep every segment built before the short span.
    KeepPrevious,
}

/// Shape parameters for one generation call. Immutable while generating.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Keep chaining new segments from each hit until a forward cast misses.
    pub repeated: bool,
    /// Maximum downward sag at the middle of a span.
    pub gravity_strength: f32,
    /// Distance of cable per bulb.
    pub light_density: f32,
    /// Smallest bulb quad (width, height).
    pub min_light_size: Vec2,
    /// Largest bulb quad (width, height).
    pub max_light_size: Vec2,
    /// Distance between cable cross-sections.
    pub edge_density: f32,
    /// Vertical thickness of the cable ribbon.
    pub line_width: f32,
    /// Cable RGBA. The alpha channel is replaced per cross-section.
    pub line_color: Vec4,
    /// How far the next ray start is pushed back along the hit normal when
    /// chaining, so the next forward cast does not re-hit the same surface.
    pub chain_offset: f32,
    /// Upper bound on chained segments. `None` chains until a cast misses.
    pub max_segments: Option<u32>,
    /// Behavior when a span fits fewer than 2 cross-sections.
    pub short_span: ShortSpanPolicy,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            repeated: false,
            gravity_strength: 0.1,
            light_density: 2.0,
            min_light_size: Vec2::new(0.1, 0.1),
            max_light_size: Vec2::new(0.3, 0.3),
            edge_density: 0.2,
            line_width: 0.5,
            line_color: Vec4::new(0.3, 0.3, 0.3, 1.0),
            chain_offset: 1.0,
            max_segments: None,
            short_span: ShortSpanPolicy::DiscardAll,
        }
    }
}

/// Errors from loading a `GenerationConfig`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl GenerationConfig {
    /// Parse a config from a JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a config from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Number of cable cross-sections that fit in `span`.
    ///
    /// Truncates toward zero; non-positive or NaN ratios give 0.
    pub fn edge_count(&self, span: f32) -> usize {
        count_for(span, self.edge_density)
    }

    /// Number of bulbs hung along `span`.
    pub fn light_count(&self, span: f32) -> usize {
        count_for(span, self.light_density)
    }
}

/// Largest element count a single span may produce. Four vertices per bulb
/// and two per cross-section must stay addressable by `u32` indices.
pub const MAX_SPAN_ELEMENTS: usize = (u32::MAX / 4) as usize;

/// `floor(span / density)` as a count. Negative ratios saturate to 0. A zero
/// density (infinite or NaN ratio) or a ratio past `MAX_SPAN_ELEMENTS`
/// places nothing.
fn count_for(span: f32, density: f32) -> usize {
    let ratio = span / density;
    if !ratio.is_finite() {
        return 0;
    }
    let count = ratio as usize;
    if count > MAX_SPAN_ELEMENTS { 0 } else { count }
}
