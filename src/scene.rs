//! World state wired to the lighting engine.
//!
//! `Scene` owns the tile grid, the entities standing on it, the per-tile
//! accumulators and the controller, and turns world events (spawn, move,
//! opacity and luminosity changes) into the matching engine calls.

use std::collections::{BTreeMap, HashMap, HashSet};

use log::{debug, info, warn};
use tile_grid::core::{Coord, Grid, MapSize};

use crate::config::LightingConfig;
use crate::controller::{LightingController, TickReport};
use crate::error::{LightError, Result};
use crate::invalidate::invalidate_affecting_lights;
use crate::luminosity::{Lum, LumMap, TileVisual};
use crate::policy::{EmitterKind, TileKind};
use crate::source::{EntityId, LightEnv, Owner, OwnerLocation, OwnerLookup};
use crate::visibility::{OpacityMap, RayCastVisibility};

// Extra controller passes one tick may run to settle smothered tile lights.
const MAX_SETTLE_PASSES: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntitySpec {
    pub position: Option<Coord>,
    pub emitter: EmitterKind,
    /// Linear luminosity; zero means the entity carries no light.
    pub luminosity: f32,
    pub opaque: bool,
}

impl EntitySpec {
    pub fn lamp(position: Coord, luminosity: f32) -> Self {
        Self {
            position: Some(position),
            emitter: EmitterKind::Fixture,
            luminosity,
            opaque: false,
        }
    }

    pub fn carrier(position: Coord, luminosity: f32) -> Self {
        Self {
            position: Some(position),
            emitter: EmitterKind::Mobile,
            luminosity,
            opaque: false,
        }
    }

    pub fn blocker(position: Coord) -> Self {
        Self {
            position: Some(position),
            emitter: EmitterKind::Fixture,
            luminosity: 0.0,
            opaque: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub position: Option<Coord>,
    pub emitter: EmitterKind,
    pub luminosity: f32,
    pub opaque: bool,
}

#[derive(Clone, Debug)]
pub struct World {
    kinds: Grid<TileKind>,
    entities: BTreeMap<EntityId, Entity>,
    occupants: HashMap<Coord, Vec<EntityId>>,
    /// Glowing tiles whose last redraw left them too dark to see. They emit
    /// nothing until a redraw shows them visible again.
    smothered: HashSet<Coord>,
}

impl World {
    pub fn new(kinds: Grid<TileKind>) -> Self {
        Self {
            kinds,
            entities: BTreeMap::new(),
            occupants: HashMap::new(),
            smothered: HashSet::new(),
        }
    }

    pub fn kinds(&self) -> &Grid<TileKind> {
        &self.kinds
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities.iter().map(|(id, entity)| (*id, entity))
    }

    pub fn occupants(&self, coord: Coord) -> &[EntityId] {
        self.occupants.get(&coord).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_smothered(&self, coord: Coord) -> bool {
        self.smothered.contains(&coord)
    }

    fn glow_at(&self, coord: Coord) -> f32 {
        self.kinds.at(coord).map_or(0.0, |kind| kind.policy().glow)
    }

    fn occupy(&mut self, id: EntityId, coord: Coord) {
        self.occupants.entry(coord).or_default().push(id);
    }

    fn vacate(&mut self, id: EntityId, coord: Coord) {
        if let Some(ids) = self.occupants.get_mut(&coord) {
            ids.retain(|other| *other != id);
            if ids.is_empty() {
                self.occupants.remove(&coord);
            }
        }
    }
}

impl OwnerLookup for World {
    fn locate(&self, owner: Owner) -> OwnerLocation {
        match owner {
            Owner::Entity(id) => match self.entities.get(&id) {
                None => OwnerLocation::Gone,
                Some(Entity { position: None, .. }) => OwnerLocation::Nowhere,
                Some(Entity {
                    position: Some(coord),
                    ..
                }) => OwnerLocation::At(*coord),
            },
            // A tile only owns a light while its kind glows.
            Owner::Tile(coord) if self.glow_at(coord) <= 0.0 => OwnerLocation::Gone,
            Owner::Tile(coord) if self.smothered.contains(&coord) => OwnerLocation::Nowhere,
            Owner::Tile(coord) => OwnerLocation::At(coord),
        }
    }

    fn owners_at(&self, coord: Coord) -> Vec<Owner> {
        let mut owners: Vec<Owner> = self
            .occupants(coord)
            .iter()
            .map(|id| Owner::Entity(*id))
            .collect();
        if self.glow_at(coord) > 0.0 {
            owners.push(Owner::Tile(coord));
        }
        owners
    }
}

impl OpacityMap for World {
    fn map_size(&self) -> MapSize {
        self.kinds.size()
    }

    fn is_opaque(&self, coord: Coord) -> bool {
        let Some(kind) = self.kinds.at(coord) else {
            return true;
        };
        kind.is_opaque()
            || self
                .occupants(coord)
                .iter()
                .any(|id| self.entities.get(id).is_some_and(|e| e.opaque))
    }
}

#[derive(Clone, Debug)]
pub struct Scene {
    world: World,
    lum: LumMap,
    controller: LightingController,
    next_entity: u32,
}

impl Scene {
    /// Build a scene over `kinds` and register every glowing tile.
    pub fn new(kinds: Grid<TileKind>, config: LightingConfig) -> Result<Self> {
        let controller = LightingController::new(config)?;
        let lum = LumMap::new(&kinds, controller.config());
        let mut scene = Self {
            world: World::new(kinds),
            lum,
            controller,
            next_entity: 1,
        };

        let glowing: Vec<(Coord, f32)> = scene
            .world
            .kinds
            .iter()
            .map(|(coord, kind)| (coord, kind.policy().glow))
            .filter(|(_, glow)| *glow > 0.0)
            .collect();
        for (coord, glow) in glowing {
            scene.controller.register(
                Owner::Tile(coord),
                EmitterKind::Tile,
                glow,
                true,
                &scene.world,
            )?;
        }
        Ok(scene)
    }

    pub fn size(&self) -> MapSize {
        self.world.kinds.size()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn lum(&self) -> &LumMap {
        &self.lum
    }

    pub fn controller(&self) -> &LightingController {
        &self.controller
    }

    pub fn config(&self) -> &LightingConfig {
        self.controller.config()
    }

    pub fn tile_kind(&self, coord: Coord) -> Option<TileKind> {
        self.world.kinds.at(coord)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.world.entity(id)
    }

    pub fn lumcount(&self, coord: Coord) -> f32 {
        self.lum.lumcount(coord)
    }

    pub fn visual(&self, coord: Coord) -> Option<TileVisual> {
        self.lum.visual(coord)
    }

    pub fn is_opaque(&self, coord: Coord) -> bool {
        self.world.is_opaque(coord)
    }

    pub fn spawn(&mut self, spec: EntitySpec) -> Result<EntityId> {
        if let Some(coord) = spec.position {
            self.check_bounds(coord)?;
        }
        let id = EntityId(self.next_entity);
        self.next_entity += 1;
        self.world.entities.insert(
            id,
            Entity {
                position: spec.position,
                emitter: spec.emitter,
                luminosity: spec.luminosity.max(0.0),
                opaque: spec.opaque,
            },
        );
        if let Some(coord) = spec.position {
            self.world.occupy(id, coord);
            if spec.opaque {
                self.invalidate(coord);
            }
        }
        if spec.luminosity > 0.0 {
            self.controller.register(
                Owner::Entity(id),
                spec.emitter,
                spec.luminosity,
                false,
                &self.world,
            )?;
        }
        Ok(id)
    }

    /// Remove an entity; its light retracts on the next tick.
    pub fn despawn(&mut self, id: EntityId) -> Result<()> {
        let Some(entity) = self.world.entities.remove(&id) else {
            warn!("despawn of unknown entity {id}");
            return Err(LightError::UnknownEntity(id.0));
        };
        if let Some(coord) = entity.position {
            self.world.vacate(id, coord);
            if entity.opaque {
                self.invalidate(coord);
            }
        }
        Ok(())
    }

    /// Move an entity, or take it off the grid with `None`. The entity's own
    /// light notices the move on the next tick.
    pub fn move_entity(&mut self, id: EntityId, to: Option<Coord>) -> Result<()> {
        if let Some(coord) = to {
            self.check_bounds(coord)?;
        }
        let entity = self.entity_mut(id)?;
        let from = entity.position;
        if from == to {
            return Ok(());
        }
        entity.position = to;
        let Entity {
            emitter,
            luminosity,
            opaque,
            ..
        } = *entity;

        if let Some(coord) = from {
            self.world.vacate(id, coord);
        }
        if let Some(coord) = to {
            self.world.occupy(id, coord);
        }
        if opaque {
            for coord in [from, to].into_iter().flatten() {
                self.invalidate(coord);
            }
        }

        // A light dropped while off the grid comes back with its owner.
        let owner = Owner::Entity(id);
        if luminosity > 0.0 && to.is_some() && self.controller.source(owner).is_none() {
            self.controller
                .register(owner, emitter, luminosity, false, &self.world)?;
        }
        Ok(())
    }

    pub fn set_luminosity(&mut self, id: EntityId, luminosity: f32) -> Result<()> {
        let luminosity = luminosity.max(0.0);
        let entity = self.entity_mut(id)?;
        entity.luminosity = luminosity;
        let emitter = entity.emitter;

        let owner = Owner::Entity(id);
        if !self.controller.set_intensity(owner, luminosity, false) && luminosity > 0.0 {
            self.controller
                .register(owner, emitter, luminosity, false, &self.world)?;
        }
        Ok(())
    }

    pub fn set_entity_opacity(&mut self, id: EntityId, opaque: bool) -> Result<()> {
        let entity = self.entity_mut(id)?;
        if entity.opaque == opaque {
            return Ok(());
        }
        entity.opaque = opaque;
        if let Some(coord) = entity.position {
            self.invalidate(coord);
        }
        Ok(())
    }

    /// Change a tile's kind, returning the previous kind.
    pub fn set_tile(&mut self, coord: Coord, kind: TileKind) -> Result<TileKind> {
        self.check_bounds(coord)?;
        let Some(previous) = self.world.kinds.set(coord, kind) else {
            return Err(LightError::OutOfBounds(coord));
        };
        if previous == kind {
            return Ok(previous);
        }

        if previous.is_opaque() != kind.is_opaque() {
            self.invalidate(coord);
        }

        let (old_glow, new_glow) = (previous.policy().glow, kind.policy().glow);
        if old_glow != new_glow {
            self.world.smothered.remove(&coord);
            let owner = Owner::Tile(coord);
            if new_glow > 0.0 {
                self.controller
                    .register(owner, EmitterKind::Tile, new_glow, true, &self.world)?;
            } else {
                self.controller.set_intensity(owner, 0.0, true);
            }
        }

        if previous.is_visually_inert() != kind.is_visually_inert() {
            self.controller.queue_redraw(&mut self.lum, coord);
        }
        Ok(previous)
    }

    pub fn is_running(&self) -> bool {
        self.controller.is_running()
    }

    pub fn set_running(&mut self, running: bool) {
        self.controller.set_running(running);
    }

    /// Apply many changes with the controller paused, so the next tick
    /// rebuilds each affected light once.
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let was_running = self.controller.is_running();
        self.controller.pause();
        let out = f(self);
        self.controller.set_running(was_running);
        out
    }

    /// Run one lighting tick. Glowing tiles that the redraw finds too dark
    /// stop emitting, and smothered tiles that became visible start again;
    /// both settle within the same tick.
    pub fn tick(&mut self) -> TickReport {
        let mut report = self.run_controller_tick();
        for _ in 0..MAX_SETTLE_PASSES {
            if !self.settle_smothered(&report.redrawn) {
                break;
            }
            let follow = self.run_controller_tick();
            report.absorb(follow);
        }
        report
    }

    fn run_controller_tick(&mut self) -> TickReport {
        let visibility = RayCastVisibility::new(&self.world);
        let env = LightEnv {
            owners: &self.world,
            visibility: &visibility,
            kinds: &self.world.kinds,
        };
        self.controller.tick(&mut self.lum, &env)
    }

    /// Returns whether any tile light was switched off or on.
    fn settle_smothered(&mut self, redrawn: &[(Coord, TileVisual)]) -> bool {
        let mut changed = false;
        for &(coord, visual) in redrawn {
            let glow = self.world.glow_at(coord);
            if glow <= 0.0 {
                continue;
            }
            let owner = Owner::Tile(coord);
            if visual.too_dark {
                if self.world.smothered.insert(coord) {
                    debug!("tile light at {coord} smothered");
                    self.controller.mark_dirty(owner);
                    changed = true;
                }
            } else if self.world.smothered.remove(&coord) {
                debug!("tile light at {coord} rekindled");
                match self
                    .controller
                    .register(owner, EmitterKind::Tile, glow, true, &self.world)
                {
                    Ok(_) => changed = true,
                    Err(err) => warn!("tile light at {coord} not restored: {err}"),
                }
            }
        }
        changed
    }

    /// Retract every light. Entities keep their luminosity but carry no
    /// registered light until it is set again.
    pub fn clear_lights(&mut self) {
        let visibility = RayCastVisibility::new(&self.world);
        let env = LightEnv {
            owners: &self.world,
            visibility: &visibility,
            kinds: &self.world.kinds,
        };
        self.controller.teardown(&mut self.lum, &env);
    }

    /// Check that every tile holds exactly the sum of the footprints on it.
    pub fn audit(&self) -> Result<()> {
        let mut expected: HashMap<Coord, Lum> = HashMap::new();
        for source in self.controller.sources() {
            for (coord, delta) in source.footprint() {
                *expected.entry(*coord).or_default() += delta;
            }
        }
        for (coord, _) in self.world.kinds.iter() {
            let want = expected.get(&coord).copied().unwrap_or(0);
            let actual = self.lum.raw_lumcount(coord).unwrap_or(0);
            if want != actual {
                return Err(LightError::Conservation {
                    coord,
                    expected: want,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Log a one-line summary of the loaded scene.
    pub fn log_summary(&self, name: &str) {
        info!(
            "scene '{name}' ready: {} tiles, {} entities, {} lights",
            self.size().tile_count(),
            self.world.entities.len(),
            self.controller.len()
        );
    }

    fn invalidate(&mut self, coord: Coord) -> usize {
        invalidate_affecting_lights(coord, &self.lum, &self.world, &mut self.controller)
    }

    fn check_bounds(&self, coord: Coord) -> Result<()> {
        if self.world.kinds.size().contains(coord) {
            Ok(())
        } else {
            warn!("rejected event outside the grid at {coord}");
            Err(LightError::OutOfBounds(coord))
        }
    }

    fn entity_mut(&mut self, id: EntityId) -> Result<&mut Entity> {
        match self.world.entities.get_mut(&id) {
            Some(entity) => Ok(entity),
            None => {
                warn!("event for unknown entity {id}");
                Err(LightError::UnknownEntity(id.0))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor(width: u16, height: u16) -> Scene {
        let kinds = Grid::filled(MapSize::new(width, height), TileKind::Floor);
        Scene::new(kinds, LightingConfig::default()).expect("scene")
    }

    #[test]
    fn spawn_lamp_lights_after_tick() {
        let mut scene = floor(9, 9);
        scene
            .spawn(EntitySpec::lamp(Coord::new(4, 4), 3.0))
            .expect("spawn");
        assert_eq!(scene.lumcount(Coord::new(4, 4)), 0.0);

        scene.tick();
        assert_eq!(scene.lumcount(Coord::new(4, 4)), 3.0);
        assert!(scene.audit().is_ok());
    }

    #[test]
    fn spawn_outside_grid_is_rejected() {
        let mut scene = floor(3, 3);
        let err = scene
            .spawn(EntitySpec::lamp(Coord::new(5, 5), 2.0))
            .expect_err("out of bounds");
        assert!(matches!(err, LightError::OutOfBounds(_)));
        assert_eq!(scene.controller().len(), 0);
    }

    #[test]
    fn despawn_retracts_on_next_tick() {
        let mut scene = floor(9, 9);
        let lamp = scene
            .spawn(EntitySpec::lamp(Coord::new(4, 4), 3.0))
            .expect("spawn");
        scene.tick();
        scene.despawn(lamp).expect("despawn");

        let report = scene.tick();
        assert_eq!(report.removed, 1);
        assert_eq!(scene.lumcount(Coord::new(4, 4)), 0.0);
        assert!(scene.despawn(lamp).is_err());
    }

    #[test]
    fn opaque_entity_casts_a_shadow() {
        let mut scene = floor(9, 3);
        scene
            .spawn(EntitySpec::lamp(Coord::new(1, 1), 4.0))
            .expect("spawn");
        scene.tick();
        let behind = Coord::new(4, 1);
        assert!(scene.lumcount(behind) > 0.0);

        let crate_id = scene
            .spawn(EntitySpec::blocker(Coord::new(3, 1)))
            .expect("spawn");
        scene.tick();
        assert_eq!(scene.lumcount(behind), 0.0);

        scene
            .set_entity_opacity(crate_id, false)
            .expect("opacity");
        scene.tick();
        assert!(scene.lumcount(behind) > 0.0);
        assert!(scene.audit().is_ok());
    }

    #[test]
    fn carried_off_grid_drops_light_and_returns() {
        let mut scene = floor(9, 9);
        let torch = scene
            .spawn(EntitySpec::carrier(Coord::new(2, 2), 2.0))
            .expect("spawn");
        scene.tick();
        assert_eq!(scene.lumcount(Coord::new(2, 2)), 2.0);

        scene.move_entity(torch, None).expect("stow");
        scene.tick();
        assert_eq!(scene.lumcount(Coord::new(2, 2)), 0.0);
        assert_eq!(scene.controller().len(), 0);

        scene
            .move_entity(torch, Some(Coord::new(6, 6)))
            .expect("drop");
        scene.tick();
        assert_eq!(scene.lumcount(Coord::new(6, 6)), 2.0);
        assert_eq!(scene.controller().len(), 1);
    }

    #[test]
    fn lava_glows_and_cools() {
        let mut kinds = Grid::filled(MapSize::new(5, 5), TileKind::Floor);
        kinds.set(Coord::new(2, 2), TileKind::Lava);
        let mut scene = Scene::new(kinds, LightingConfig::default()).expect("scene");
        assert_eq!(scene.controller().len(), 1);

        scene.tick();
        assert!(scene.lumcount(Coord::new(2, 2)) > 0.0);
        // Tile lights are capped at radius one.
        assert_eq!(scene.lumcount(Coord::new(4, 2)), 0.0);

        let previous = scene
            .set_tile(Coord::new(2, 2), TileKind::Floor)
            .expect("cool");
        assert_eq!(previous, TileKind::Lava);
        scene.tick();
        assert_eq!(scene.controller().len(), 0);
        assert_eq!(scene.lumcount(Coord::new(2, 2)), 0.0);
    }

    fn dim_lava_scene() -> Scene {
        let mut kinds = Grid::filled(MapSize::new(5, 5), TileKind::Floor);
        kinds.set(Coord::new(2, 2), TileKind::Lava);
        // Lava's own glow of 2 lands at alpha 252, past the visible threshold.
        let config = LightingConfig {
            lum_cap: 200.0,
            ..LightingConfig::default()
        };
        Scene::new(kinds, config).expect("scene")
    }

    #[test]
    fn too_dark_lava_stops_glowing() {
        let mut scene = dim_lava_scene();
        let lava = Coord::new(2, 2);

        let report = scene.tick();
        assert_eq!(report.removed, 1);
        assert!(scene.world().is_smothered(lava));
        assert!(scene.controller().source(Owner::Tile(lava)).is_none());
        assert_eq!(scene.lumcount(lava), 0.0);
        assert_eq!(scene.lumcount(Coord::new(3, 2)), 0.0);
        assert_eq!(scene.visual(lava).map(|v| v.too_dark), Some(true));
        assert!(scene.audit().is_ok());

        let report = scene.tick();
        assert_eq!(report.rebuilt, 0);
        assert!(report.redrawn.is_empty());
    }

    #[test]
    fn smothered_lava_rekindles_once_lit() {
        let mut scene = dim_lava_scene();
        let lava = Coord::new(2, 2);
        scene.tick();

        scene.spawn(EntitySpec::lamp(lava, 15.0)).expect("spawn");
        scene.tick();
        assert!(!scene.world().is_smothered(lava));
        assert!(scene.controller().source(Owner::Tile(lava)).is_some());
        // Lamp 15 plus the lava's own 2.
        assert_eq!(scene.lumcount(lava), 17.0);
        assert!(scene.audit().is_ok());
    }

    #[test]
    fn walling_beside_lava_wakes_the_tile_light() {
        let mut kinds = Grid::filled(MapSize::new(5, 5), TileKind::Floor);
        kinds.set(Coord::new(1, 2), TileKind::Lava);
        let mut scene = Scene::new(kinds, LightingConfig::default()).expect("scene");
        let lava = Owner::Tile(Coord::new(1, 2));
        let wall = Coord::new(2, 2);
        scene.tick();
        assert_eq!(scene.lumcount(wall), 1.0);
        let dirty = |scene: &Scene| scene.controller().source(lava).map(|s| s.is_dirty());
        assert_eq!(dirty(&scene), Some(false));

        scene.set_tile(wall, TileKind::Wall).expect("wall");
        assert_eq!(dirty(&scene), Some(true));

        let report = scene.tick();
        assert_eq!(report.rebuilt, 1);
        assert_eq!(dirty(&scene), Some(false));
        // The wall stops the ray but is lit itself.
        assert_eq!(scene.lumcount(wall), 1.0);
        assert!(scene.audit().is_ok());
    }

    #[test]
    fn space_tile_is_always_lit() {
        let mut scene = floor(5, 5);
        scene
            .set_tile(Coord::new(0, 0), TileKind::Space)
            .expect("space");
        let report = scene.tick();
        assert_eq!(
            report.redrawn,
            vec![(Coord::new(0, 0), TileVisual::lit(scene.config().overlay_color))]
        );

        scene
            .spawn(EntitySpec::lamp(Coord::new(1, 1), 3.0))
            .expect("spawn");
        let report = scene.tick();
        assert!(report.redrawn.iter().all(|(c, _)| *c != Coord::new(0, 0)));
        assert!(scene.lumcount(Coord::new(0, 0)) > 0.0);
        assert_eq!(scene.visual(Coord::new(0, 0)).map(|v| v.alpha), Some(0));
    }

    #[test]
    fn batch_defers_until_it_returns() {
        let mut scene = floor(9, 9);
        let lamp = scene
            .spawn(EntitySpec::lamp(Coord::new(4, 4), 3.0))
            .expect("spawn");
        scene.tick();

        let rebuilt = scene.batch(|scene| {
            for x in 2..7 {
                scene
                    .set_tile(Coord::new(x, 2), TileKind::Wall)
                    .expect("wall");
            }
            scene.set_luminosity(lamp, 2.0).expect("dim");
            scene.tick().rebuilt
        });
        assert_eq!(rebuilt, 0);
        assert!(scene.is_running());

        let report = scene.tick();
        assert_eq!(report.rebuilt, 1);
        assert_eq!(scene.lumcount(Coord::new(4, 4)), 2.0);
    }

    #[test]
    fn unknown_entity_events_fail() {
        let mut scene = floor(3, 3);
        assert!(matches!(
            scene.set_luminosity(EntityId(42), 1.0),
            Err(LightError::UnknownEntity(42))
        ));
        assert!(scene.move_entity(EntityId(42), None).is_err());
        assert!(scene.set_entity_opacity(EntityId(42), true).is_err());
    }

    #[test]
    fn clear_lights_leaves_everything_dark() {
        let mut scene = floor(6, 6);
        scene
            .spawn(EntitySpec::lamp(Coord::new(1, 1), 3.0))
            .expect("spawn");
        scene
            .spawn(EntitySpec::carrier(Coord::new(4, 4), 2.0))
            .expect("spawn");
        scene.tick();

        scene.clear_lights();
        assert_eq!(scene.controller().len(), 0);
        for (coord, _) in scene.world().kinds().iter() {
            assert_eq!(scene.lumcount(coord), 0.0);
        }
        assert!(scene.audit().is_ok());
    }
}
