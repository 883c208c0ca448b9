use std::path::Path;

use log::info;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tile_grid::core::Coord;
use tile_grid::parse::{Legend, ParseOptions, parse_char_grid};

use crate::config::LightingConfig;
use crate::error::Result;
use crate::policy::TileKind;
use crate::scene::{EntitySpec, Scene};
use crate::source::EntityId;

/// Scene bundled with the binary, used when no `--scene` is given.
pub const DEFAULT_SCENE: &str = include_str!("../scenes/cellar.yaml");

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SceneManifest {
    pub name: String,
    /// Character map, one line per row.
    pub map: String,
    pub legend: Vec<LegendEntry>,
    pub player: PlayerSpec,
    #[serde(default)]
    pub fixtures: Vec<FixtureSpec>,
    #[serde(default)]
    pub blockers: Vec<Point>,
    #[serde(default)]
    pub lighting: LightingConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LegendEntry {
    pub ch: char,
    pub tile: TileKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Point {
    pub x: u16,
    pub y: u16,
}

impl From<Point> for Coord {
    fn from(point: Point) -> Self {
        Coord::new(point.x, point.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PlayerSpec {
    pub x: u16,
    pub y: u16,
    #[serde(default = "default_lantern")]
    pub lantern: f32,
}

fn default_lantern() -> f32 {
    4.0
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FixtureSpec {
    pub x: u16,
    pub y: u16,
    pub luminosity: f32,
}

/// A built scene plus the handles the app needs.
#[derive(Clone, Debug)]
pub struct SceneRuntime {
    pub name: String,
    pub scene: Scene,
    pub player: EntityId,
}

impl SceneManifest {
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    pub fn into_scene(self) -> Result<SceneRuntime> {
        let legend = build_legend(&self.legend)?;
        let kinds = parse_char_grid(
            &self.map,
            &legend,
            &ParseOptions {
                fill_char: ' ',
                fill_tile: TileKind::Space,
            },
        )?;

        let mut scene = Scene::new(kinds, self.lighting)?;
        for fixture in &self.fixtures {
            scene.spawn(EntitySpec::lamp(
                Coord::new(fixture.x, fixture.y),
                fixture.luminosity,
            ))?;
        }
        for blocker in &self.blockers {
            scene.spawn(EntitySpec::blocker((*blocker).into()))?;
        }
        let player = scene.spawn(EntitySpec::carrier(
            Coord::new(self.player.x, self.player.y),
            self.player.lantern,
        ))?;

        scene.log_summary(&self.name);
        Ok(SceneRuntime {
            name: self.name,
            scene,
            player,
        })
    }
}

/// Read a manifest from disk, or the bundled scene when `path` is `None`.
pub fn load_manifest(path: Option<&Path>) -> Result<SceneManifest> {
    match path {
        Some(path) => {
            info!("loading scene from {}", path.display());
            SceneManifest::load(path)
        }
        None => SceneManifest::from_yaml(DEFAULT_SCENE),
    }
}

pub fn load_scene(path: Option<&Path>) -> Result<SceneRuntime> {
    load_manifest(path)?.into_scene()
}

fn build_legend(entries: &[LegendEntry]) -> Result<Legend<TileKind>> {
    let mut legend = Legend::builder();
    for entry in entries {
        legend = legend.entry(entry.ch, entry.tile);
    }
    Ok(legend.build()?)
}
