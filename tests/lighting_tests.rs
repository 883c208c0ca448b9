//! End-to-end lighting behavior through the public `Scene` surface and the
//! demo reducer.

use pretty_assertions::assert_eq;
use tile_grid::core::{Coord, Grid, MapSize};
use tilelight::app::action::Action;
use tilelight::app::reducer::reducer;
use tilelight::app::state::{AppState, Direction};
use tilelight::luminosity::Lum;
use tilelight::manifest::load_scene;
use tilelight::policy::{FIXTURE_RANGE_CAP, MOBILE_RANGE_CAP, TileKind};
use tilelight::{EntitySpec, LightingConfig, Owner, Scene};
use tui_dispatch::EffectStore;

fn floor_scene(width: u16, height: u16) -> Scene {
    let kinds = Grid::filled(MapSize::new(width, height), TileKind::Floor);
    Scene::new(kinds, LightingConfig::default()).expect("scene")
}

fn snapshot(scene: &Scene) -> Vec<Lum> {
    scene
        .world()
        .kinds()
        .iter()
        .map(|(coord, _)| scene.lum().raw_lumcount(coord).unwrap_or(0))
        .collect()
}

#[test]
fn overlapping_sources_conserve_lumcount() {
    let mut scene = floor_scene(16, 12);
    for (x, y, lum) in [(3, 3, 4.0), (5, 4, 3.0), (8, 6, 5.0), (4, 8, 2.5), (12, 9, 6.0)] {
        scene
            .spawn(EntitySpec::lamp(Coord::new(x, y), lum))
            .expect("spawn");
    }
    scene.tick();
    scene.audit().expect("conservation after build");

    scene
        .set_tile(Coord::new(6, 5), TileKind::Wall)
        .expect("wall");
    scene.tick();
    scene.audit().expect("conservation after wall");
}

#[test]
fn identical_sources_double_the_count() {
    let mut scene = floor_scene(9, 9);
    let at = Coord::new(4, 4);
    scene.spawn(EntitySpec::lamp(at, 3.0)).expect("spawn");
    scene.spawn(EntitySpec::lamp(at, 3.0)).expect("spawn");
    scene.tick();
    assert_eq!(scene.lumcount(at), 6.0);
    assert_eq!(scene.lumcount(Coord::new(7, 4)), 0.0);
}

#[test]
fn clean_tick_changes_nothing() {
    let mut scene = floor_scene(10, 10);
    scene
        .spawn(EntitySpec::lamp(Coord::new(5, 5), 4.0))
        .expect("spawn");
    scene.tick();
    let before = snapshot(&scene);

    let report = scene.tick();
    assert_eq!(report.rebuilt, 0);
    assert!(report.redrawn.is_empty());
    assert_eq!(snapshot(&scene), before);
}

#[test]
fn move_there_and_back_restores_everything() {
    let mut scene = floor_scene(14, 10);
    scene
        .set_tile(Coord::new(7, 2), TileKind::Wall)
        .expect("wall");
    let torch = scene
        .spawn(EntitySpec::carrier(Coord::new(4, 4), 4.0))
        .expect("spawn");
    scene.tick();
    let owner = Owner::Entity(torch);
    let counts = snapshot(&scene);
    let footprint = scene
        .controller()
        .source(owner)
        .map(|s| s.footprint().clone())
        .expect("source");

    scene
        .move_entity(torch, Some(Coord::new(9, 6)))
        .expect("move");
    scene.tick();
    assert_ne!(snapshot(&scene), counts);

    scene
        .move_entity(torch, Some(Coord::new(4, 4)))
        .expect("move back");
    scene.tick();
    assert_eq!(snapshot(&scene), counts);
    assert_eq!(
        scene.controller().source(owner).map(|s| s.footprint().clone()),
        Some(footprint)
    );
}

#[test]
fn footprints_never_exceed_category_caps() {
    let mut scene = floor_scene(40, 40);
    let center = Coord::new(20, 20);
    let lamp = scene
        .spawn(EntitySpec::lamp(center, 18.0))
        .expect("spawn");
    let torch = scene
        .spawn(EntitySpec::carrier(center, 18.0))
        .expect("spawn");
    scene.tick();

    for (id, cap) in [(lamp, FIXTURE_RANGE_CAP), (torch, MOBILE_RANGE_CAP)] {
        let source = scene
            .controller()
            .source(Owner::Entity(id))
            .expect("source");
        let reach = source
            .footprint()
            .keys()
            .map(|coord| coord.chebyshev(center))
            .max();
        assert_eq!(reach, Some(cap));
    }
}

#[test]
fn zero_intensity_is_gone_after_one_tick() {
    let mut scene = floor_scene(9, 9);
    let lamp = scene
        .spawn(EntitySpec::lamp(Coord::new(4, 4), 3.0))
        .expect("spawn");
    scene.tick();
    let lit: Vec<Coord> = scene
        .controller()
        .source(Owner::Entity(lamp))
        .map(|s| s.footprint().keys().copied().collect())
        .expect("source");

    scene.set_luminosity(lamp, 0.0).expect("dim");
    let report = scene.tick();
    assert_eq!(report.removed, 1);
    assert!(scene.controller().source(Owner::Entity(lamp)).is_none());
    for coord in lit {
        assert_eq!(scene.lumcount(coord), 0.0);
        assert_eq!(scene.visual(coord).map(|v| v.alpha), Some(u8::MAX));
    }
}

#[test]
fn wall_blocks_and_removal_relights() {
    let mut scene = floor_scene(12, 5);
    scene
        .spawn(EntitySpec::lamp(Coord::new(2, 2), 6.0))
        .expect("spawn");
    scene.tick();
    let behind = Coord::new(7, 2);
    let lit = scene.lumcount(behind);
    assert!(lit > 0.0);

    scene.batch(|scene| {
        for y in 0..5 {
            scene
                .set_tile(Coord::new(5, y), TileKind::Wall)
                .expect("wall");
        }
    });
    scene.tick();
    assert_eq!(scene.lumcount(behind), 0.0);
    assert!(scene.lumcount(Coord::new(5, 2)) > 0.0);

    for y in 0..5 {
        scene
            .set_tile(Coord::new(5, y), TileKind::Floor)
            .expect("floor");
    }
    scene.tick();
    assert_eq!(scene.lumcount(behind), lit);
    scene.audit().expect("conservation");
}

#[test]
fn paused_scene_queues_then_catches_up() {
    let mut scene = floor_scene(9, 9);
    scene.set_running(false);
    let lamp = scene
        .spawn(EntitySpec::lamp(Coord::new(4, 4), 3.0))
        .expect("spawn");
    scene.move_entity(lamp, Some(Coord::new(1, 1))).expect("move");
    assert!(scene.tick().skipped);
    assert_eq!(scene.lumcount(Coord::new(1, 1)), 0.0);

    scene.set_running(true);
    let report = scene.tick();
    assert_eq!(report.rebuilt, 1);
    assert_eq!(scene.lumcount(Coord::new(1, 1)), 3.0);
    assert_eq!(scene.lumcount(Coord::new(4, 4)), 0.0);
}

#[test]
fn bundled_scene_stays_consistent_under_play() {
    let mut runtime = load_scene(None).expect("bundled scene");
    runtime.scene.tick();
    runtime.scene.audit().expect("initial");

    let player = runtime.player;
    for x in 4..10 {
        runtime
            .scene
            .move_entity(player, Some(Coord::new(x, 2)))
            .expect("walk");
        runtime.scene.tick();
    }
    assert_eq!(
        runtime.scene.entity(player).and_then(|e| e.position),
        Some(Coord::new(9, 2))
    );
    runtime.scene.audit().expect("after walking");
}

#[test]
fn reducer_drives_the_scene_through_the_store() {
    let mut state = AppState::default();
    state.install(load_scene(None).expect("bundled scene"));
    let mut store = EffectStore::new(state, reducer);

    let result = store.dispatch(Action::Tick);
    assert!(result.changed);
    let start = store.state().player_pos().expect("player");
    assert_eq!(
        store.state().scene.as_ref().map(|s| s.lumcount(start)),
        Some(4.0)
    );

    store.dispatch(Action::Move(Direction::Down));
    store.dispatch(Action::Tick);
    let moved = store.state().player_pos().expect("player");
    assert_eq!(moved, Coord::new(start.x, start.y + 1));
    assert_eq!(
        store.state().scene.as_ref().map(|s| s.lumcount(moved)),
        Some(4.0)
    );

    store.dispatch(Action::LightingToggle);
    store.dispatch(Action::Move(Direction::Up));
    store.dispatch(Action::Tick);
    assert!(store.state().last_tick.skipped);
    assert_eq!(store.state().player_pos(), Some(start));
    // The lantern is still drawn one tile below until lighting resumes.
    assert_eq!(
        store.state().scene.as_ref().map(|s| s.lumcount(start)),
        Some(3.0)
    );

    store.dispatch(Action::LightingToggle);
    store.dispatch(Action::Tick);
    assert_eq!(
        store.state().scene.as_ref().map(|s| s.lumcount(start)),
        Some(4.0)
    );
}
