use std::sync::OnceLock;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tile_grid::core::Coord;

/// Integer true intensities below this resolve through the lookup table.
pub const SQRT_TABLE_LEN: usize = 64;

static SQRT_TABLE: OnceLock<[f32; SQRT_TABLE_LEN]> = OnceLock::new();

fn sqrt_table() -> &'static [f32; SQRT_TABLE_LEN] {
    SQRT_TABLE.get_or_init(|| std::array::from_fn(|n| (n as f32).sqrt()))
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Euclidean distance between tile centers; round light pools.
    #[default]
    Circular,
    /// Chebyshev distance; square light pools.
    Square,
}

impl DistanceMetric {
    pub fn distance(self, a: Coord, b: Coord) -> f32 {
        let dx = a.x.abs_diff(b.x) as f32;
        let dy = a.y.abs_diff(b.y) as f32;
        match self {
            DistanceMetric::Circular => (dx * dx + dy * dy).sqrt(),
            DistanceMetric::Square => dx.max(dy),
        }
    }
}

/// Square root of a true intensity, using the table for small integers.
pub fn sqrt_intensity(true_intensity: f32) -> f32 {
    if true_intensity <= 0.0 {
        return 0.0;
    }
    if true_intensity.fract() == 0.0 && (true_intensity as usize) < SQRT_TABLE_LEN {
        return sqrt_table()[true_intensity as usize];
    }
    true_intensity.sqrt()
}

/// Cone falloff: full strength at the source, zero at `strength` tiles out.
pub fn falloff(strength: f32, distance: f32) -> f32 {
    strength - distance
}
