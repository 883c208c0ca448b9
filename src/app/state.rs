use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tile_grid::core::Coord;

use crate::controller::TickReport;
use crate::manifest::SceneRuntime;
use crate::scene::Scene;
use crate::source::EntityId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum AppMode {
    Loading,
    Exploring,
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Counters from the most recent lighting tick, shown in the footer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub skipped: bool,
    pub rebuilt: usize,
    pub removed: usize,
    pub redrawn: usize,
}

impl From<&TickReport> for TickSummary {
    fn from(report: &TickReport) -> Self {
        Self {
            skipped: report.skipped,
            rebuilt: report.rebuilt,
            removed: report.removed,
            redrawn: report.redrawn.len(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppState {
    pub mode: AppMode,
    pub scene_path: Option<String>,
    pub name: String,
    pub scene: Option<Scene>,
    pub player: Option<EntityId>,
    pub facing: Direction,
    pub lantern: f32,
    pub lamps: Vec<EntityId>,
    pub last_tick: TickSummary,
    pub last_status: Option<String>,
}

impl AppState {
    pub fn new(scene_path: Option<String>) -> Self {
        Self {
            mode: AppMode::Loading,
            scene_path,
            name: String::new(),
            scene: None,
            player: None,
            facing: Direction::Right,
            lantern: 0.0,
            lamps: Vec::new(),
            last_tick: TickSummary::default(),
            last_status: None,
        }
    }

    pub fn install(&mut self, runtime: SceneRuntime) {
        self.lantern = runtime
            .scene
            .entity(runtime.player)
            .map_or(0.0, |player| player.luminosity);
        self.name = runtime.name;
        self.scene = Some(runtime.scene);
        self.player = Some(runtime.player);
        self.lamps.clear();
        self.last_tick = TickSummary::default();
        self.mode = AppMode::Exploring;
        self.last_status = Some(format!("Entered {}.", self.name));
    }

    pub fn player_pos(&self) -> Option<Coord> {
        let scene = self.scene.as_ref()?;
        scene.entity(self.player?)?.position
    }

    /// Tile directly in front of the player.
    pub fn ahead(&self) -> Option<Coord> {
        let (dx, dy) = self.facing.delta();
        let target = self.player_pos()?.offset(dx, dy)?;
        let scene = self.scene.as_ref()?;
        scene.size().contains(target).then_some(target)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(None)
    }
}
