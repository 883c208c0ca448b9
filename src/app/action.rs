use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::app::state::Direction;

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[action(infer_categories)]
pub enum Action {
    Init,

    Move(Direction),
    ToggleWall,
    PlaceLamp,
    LanternBrighter,
    LanternDimmer,
    CaveIn,

    LightingToggle,
    Tick,

    Quit,
}
