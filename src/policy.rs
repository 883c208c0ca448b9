//! Per-category lighting policy.
//!
//! Emitter categories bound how far a single source may reach no matter how
//! much intensity it holds. Tile kinds select opacity, redraw behavior and
//! whether the tile itself glows, through a lookup table indexed by kind.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// Range caps (tiles, square neighborhood):
// - FIXTURE_RANGE_CAP: stationary fixtures, recomputed rarely.
// - MOBILE_RANGE_CAP: moving entities, recomputed on every step.
// - TILE_RANGE_CAP: glowing floor tiles, kept tiny so they cannot cascade.
pub const FIXTURE_RANGE_CAP: u16 = 8;
pub const MOBILE_RANGE_CAP: u16 = 5;
pub const TILE_RANGE_CAP: u16 = 1;

/// Linear intensity ceiling used for display and range purposes only.
pub const MAX_LINEAR_INTENSITY: f32 = 20.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EmitterKind {
    Fixture,
    Mobile,
    Tile,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RangeCaps {
    pub fixture: u16,
    pub mobile: u16,
    pub tile: u16,
}

impl Default for RangeCaps {
    fn default() -> Self {
        Self {
            fixture: FIXTURE_RANGE_CAP,
            mobile: MOBILE_RANGE_CAP,
            tile: TILE_RANGE_CAP,
        }
    }
}

impl RangeCaps {
    pub fn cap(&self, kind: EmitterKind) -> u16 {
        match kind {
            EmitterKind::Fixture => self.fixture,
            EmitterKind::Mobile => self.mobile,
            EmitterKind::Tile => self.tile,
        }
    }

    /// Widest reach of any category; the invalidator scans this far.
    pub fn largest(&self) -> u16 {
        self.fixture.max(self.mobile).max(self.tile)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    Floor,
    Wall,
    Window,
    Space,
    Lava,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TilePolicy {
    pub opaque: bool,
    /// Tracks lumcount but never shades or queues a redraw.
    pub visually_inert: bool,
    /// True (squared) intensity the tile emits by itself.
    pub glow: f32,
}

const TILE_POLICIES: [TilePolicy; 5] = [
    // Floor
    TilePolicy {
        opaque: false,
        visually_inert: false,
        glow: 0.0,
    },
    // Wall
    TilePolicy {
        opaque: true,
        visually_inert: false,
        glow: 0.0,
    },
    // Window
    TilePolicy {
        opaque: false,
        visually_inert: false,
        glow: 0.0,
    },
    // Space
    TilePolicy {
        opaque: false,
        visually_inert: true,
        glow: 0.0,
    },
    // Lava
    TilePolicy {
        opaque: false,
        visually_inert: false,
        glow: 4.0,
    },
];

impl TileKind {
    pub fn policy(self) -> TilePolicy {
        TILE_POLICIES[self as usize]
    }

    pub fn is_opaque(self) -> bool {
        self.policy().opaque
    }

    pub fn is_visually_inert(self) -> bool {
        self.policy().visually_inert
    }
}
