use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::distance::DistanceMetric;
use crate::error::{LightError, Result};
use crate::policy::RangeCaps;

// Redraw tuneables:
// - LUM_CAP: lumcount at which a tile is drawn fully lit.
// - DARKEST_VISIBLE_ALPHA: overlay alpha above which a tile counts as too dark.
// - DEFAULT_TICK_MS: controller tick interval for the demo loop.
pub const LUM_CAP: f32 = 10.0;
pub const DARKEST_VISIBLE_ALPHA: u8 = 250;
pub const DEFAULT_TICK_MS: u64 = 100;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct LightingConfig {
    pub lum_cap: f32,
    pub darkest_visible_alpha: u8,
    pub caps: RangeCaps,
    pub metric: DistanceMetric,
    pub overlay_color: [u8; 3],
    pub tick_interval_ms: u64,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            lum_cap: LUM_CAP,
            darkest_visible_alpha: DARKEST_VISIBLE_ALPHA,
            caps: RangeCaps::default(),
            metric: DistanceMetric::default(),
            overlay_color: [0, 0, 0],
            tick_interval_ms: DEFAULT_TICK_MS,
        }
    }
}

impl LightingConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.lum_cap > 0.0) {
            return Err(LightError::InvalidConfig(format!(
                "lum_cap must be positive, got {}",
                self.lum_cap
            )));
        }
        if self.tick_interval_ms == 0 {
            return Err(LightError::InvalidConfig(
                "tick_interval_ms must be nonzero".to_string(),
            ));
        }
        Ok(())
    }
}
