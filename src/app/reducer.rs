use log::warn;
use tile_grid::core::Coord;
use tui_dispatch::DispatchResult;

use crate::app::action::Action;
use crate::app::effect::Effect;
use crate::app::state::{AppMode, AppState, Direction, TickSummary};
use crate::policy::{MAX_LINEAR_INTENSITY, TileKind};
use crate::scene::EntitySpec;

// Demo tuneables:
// - LANTERN_STEP: linear luminosity added or removed per keypress.
// - LAMP_LUMINOSITY: linear luminosity of a placed lamp.
// - CAVE_IN_RADIUS: ring distance (square) toggled by a cave-in.
const LANTERN_STEP: f32 = 1.0;
const LAMP_LUMINOSITY: f32 = 3.0;
const CAVE_IN_RADIUS: u16 = 2;

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::Init => {
            state.mode = AppMode::Loading;
            state.last_status = Some("Loading scene...".to_string());
            DispatchResult::changed_with(Effect::LoadScene {
                path: state.scene_path.clone(),
            })
        }
        _ if state.mode != AppMode::Exploring => DispatchResult::unchanged(),
        Action::Move(direction) => handle_move(state, direction),
        Action::ToggleWall => toggle_wall(state),
        Action::PlaceLamp => place_lamp(state),
        Action::LanternBrighter => adjust_lantern(state, LANTERN_STEP),
        Action::LanternDimmer => adjust_lantern(state, -LANTERN_STEP),
        Action::CaveIn => cave_in(state),
        Action::LightingToggle => {
            let Some(scene) = state.scene.as_mut() else {
                return DispatchResult::unchanged();
            };
            let running = !scene.is_running();
            scene.set_running(running);
            state.last_status = Some(if running {
                "Lighting resumed.".to_string()
            } else {
                "Lighting paused; changes queue until resumed.".to_string()
            });
            DispatchResult::changed()
        }
        Action::Tick => {
            let Some(scene) = state.scene.as_mut() else {
                return DispatchResult::unchanged();
            };
            let report = scene.tick();
            let summary = TickSummary::from(&report);
            let changed = !report.redrawn.is_empty() || summary != state.last_tick;
            state.last_tick = summary;
            if changed {
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }
        Action::Quit => DispatchResult::unchanged(),
    }
}

fn handle_move(state: &mut AppState, direction: Direction) -> DispatchResult<Effect> {
    state.facing = direction;
    let (Some(target), Some(player)) = (state.ahead(), state.player) else {
        return DispatchResult::changed();
    };
    let Some(scene) = state.scene.as_mut() else {
        return DispatchResult::changed();
    };
    if scene.is_opaque(target) || scene.tile_kind(target) == Some(TileKind::Space) {
        state.last_status = Some("Blocked.".to_string());
        return DispatchResult::changed();
    }
    if let Err(err) = scene.move_entity(player, Some(target)) {
        report_error(state, err);
    }
    DispatchResult::changed()
}

fn toggle_wall(state: &mut AppState) -> DispatchResult<Effect> {
    let Some(target) = state.ahead() else {
        return DispatchResult::unchanged();
    };
    let Some(scene) = state.scene.as_mut() else {
        return DispatchResult::unchanged();
    };
    if !scene.world().occupants(target).is_empty() {
        state.last_status = Some("Something is in the way.".to_string());
        return DispatchResult::changed();
    }
    let next = match scene.tile_kind(target) {
        Some(TileKind::Wall) => TileKind::Floor,
        Some(TileKind::Floor) => TileKind::Wall,
        _ => {
            state.last_status = Some("Nothing to build or dig there.".to_string());
            return DispatchResult::changed();
        }
    };
    match scene.set_tile(target, next) {
        Ok(_) => {
            state.last_status = Some(format!("{next:?} at {target}."));
        }
        Err(err) => report_error(state, err),
    }
    DispatchResult::changed()
}

fn place_lamp(state: &mut AppState) -> DispatchResult<Effect> {
    let Some(target) = state.ahead() else {
        return DispatchResult::unchanged();
    };
    let Some(scene) = state.scene.as_mut() else {
        return DispatchResult::unchanged();
    };
    if scene.tile_kind(target) != Some(TileKind::Floor) || scene.is_opaque(target) {
        state.last_status = Some("A lamp needs open floor.".to_string());
        return DispatchResult::changed();
    }
    match scene.spawn(EntitySpec::lamp(target, LAMP_LUMINOSITY)) {
        Ok(id) => {
            state.lamps.push(id);
            state.last_status = Some(format!("Lamp placed at {target}."));
        }
        Err(err) => report_error(state, err),
    }
    DispatchResult::changed()
}

fn adjust_lantern(state: &mut AppState, step: f32) -> DispatchResult<Effect> {
    let (Some(scene), Some(player)) = (state.scene.as_mut(), state.player) else {
        return DispatchResult::unchanged();
    };
    let lantern = (state.lantern + step).clamp(0.0, MAX_LINEAR_INTENSITY);
    if lantern == state.lantern {
        return DispatchResult::unchanged();
    }
    match scene.set_luminosity(player, lantern) {
        Ok(()) => {
            state.lantern = lantern;
            state.last_status = Some(format!("Lantern {lantern:.0}."));
        }
        Err(err) => report_error(state, err),
    }
    DispatchResult::changed()
}

fn cave_in(state: &mut AppState) -> DispatchResult<Effect> {
    let Some(center) = state.player_pos() else {
        return DispatchResult::unchanged();
    };
    let Some(scene) = state.scene.as_mut() else {
        return DispatchResult::unchanged();
    };

    let ring: Vec<Coord> = scene
        .lum()
        .coords_within(center, CAVE_IN_RADIUS)
        .filter(|coord| coord.chebyshev(center) == CAVE_IN_RADIUS)
        .collect();
    let shifted = scene.batch(|scene| {
        let mut shifted = 0;
        for coord in ring {
            if !scene.world().occupants(coord).is_empty() {
                continue;
            }
            let next = match scene.tile_kind(coord) {
                Some(TileKind::Floor) => TileKind::Wall,
                Some(TileKind::Wall) => TileKind::Floor,
                _ => continue,
            };
            if scene.set_tile(coord, next).is_ok() {
                shifted += 1;
            }
        }
        shifted
    });
    state.last_status = Some(format!("Cave-in! {shifted} tiles shifted."));
    DispatchResult::changed()
}

fn report_error(state: &mut AppState, err: crate::error::LightError) {
    warn!("demo action failed: {err}");
    state.last_status = Some(err.to_string());
}
