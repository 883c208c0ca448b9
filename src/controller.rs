//! Lighting controller: source registry, redraw queue and the tick.

use std::collections::{BTreeMap, HashMap};

use log::{debug, info};
use tile_grid::core::Coord;

use crate::config::LightingConfig;
use crate::error::Result;
use crate::luminosity::{LumMap, LumWriter, PendingTiles, TileVisual};
use crate::policy::{EmitterKind, TileKind};
use crate::source::{LightEnv, LightSource, Owner, OwnerLookup, SourceStatus};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceId(u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControllerState {
    /// Nothing dirty; a tick would do no work.
    Idle,
    Running,
    /// Gate closed; events still queue but ticks are skipped.
    Paused,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControllerStats {
    pub ticks: u64,
    pub skipped_ticks: u64,
    pub rebuilds: u64,
    pub removals: u64,
    pub redraws: u64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    pub skipped: bool,
    pub rebuilt: usize,
    pub removed: usize,
    pub redrawn: Vec<(Coord, TileVisual)>,
}

impl TickReport {
    /// Fold a follow-up pass into this report. A tile redrawn twice keeps
    /// its latest visual.
    pub fn absorb(&mut self, later: TickReport) {
        self.skipped &= later.skipped;
        self.rebuilt += later.rebuilt;
        self.removed += later.removed;
        self.redrawn
            .retain(|(coord, _)| !later.redrawn.iter().any(|(other, _)| other == coord));
        self.redrawn.extend(later.redrawn);
    }
}

#[derive(Clone, Debug)]
pub struct LightingController {
    config: LightingConfig,
    sources: BTreeMap<SourceId, LightSource>,
    by_owner: HashMap<Owner, SourceId>,
    pending: PendingTiles,
    running: bool,
    next_id: u32,
    stats: ControllerStats,
}

impl LightingController {
    pub fn new(config: LightingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            sources: BTreeMap::new(),
            by_owner: HashMap::new(),
            pending: PendingTiles::new(),
            running: true,
            next_id: 0,
            stats: ControllerStats::default(),
        })
    }

    pub fn config(&self) -> &LightingConfig {
        &self.config
    }

    pub fn stats(&self) -> ControllerStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn sources(&self) -> impl Iterator<Item = &LightSource> {
        self.sources.values()
    }

    pub fn source(&self, owner: Owner) -> Option<&LightSource> {
        let id = self.by_owner.get(&owner)?;
        self.sources.get(id)
    }

    pub fn state(&self) -> ControllerState {
        if !self.running {
            ControllerState::Paused
        } else if self.pending.is_empty() && self.sources.values().all(|s| !s.is_dirty()) {
            ControllerState::Idle
        } else {
            ControllerState::Running
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn set_running(&mut self, running: bool) {
        if self.running != running {
            info!("lighting {}", if running { "resumed" } else { "paused" });
        }
        self.running = running;
    }

    pub fn pause(&mut self) {
        self.set_running(false);
    }

    pub fn resume(&mut self) {
        self.set_running(true);
    }

    /// Create the owner's light, or update the one it already has.
    pub fn register(
        &mut self,
        owner: Owner,
        kind: EmitterKind,
        value: f32,
        is_already_squared: bool,
        owners: &dyn OwnerLookup,
    ) -> Result<SourceId> {
        if let Some(&id) = self.by_owner.get(&owner) {
            if let Some(source) = self.sources.get_mut(&id) {
                source.set_kind(kind);
                source.set_intensity(value, is_already_squared);
                return Ok(id);
            }
        }

        let source = LightSource::new(owner, kind, value, is_already_squared, owners)?;
        let id = SourceId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.sources.insert(id, source);
        self.by_owner.insert(owner, id);
        Ok(id)
    }

    /// Route an intensity change to the owner's light. Returns false when the
    /// owner has no registered light.
    pub fn set_intensity(&mut self, owner: Owner, value: f32, is_already_squared: bool) -> bool {
        match self.source_mut(owner) {
            Some(source) => {
                source.set_intensity(value, is_already_squared);
                true
            }
            None => false,
        }
    }

    pub fn mark_dirty(&mut self, owner: Owner) -> bool {
        match self.source_mut(owner) {
            Some(source) => {
                source.mark_dirty();
                true
            }
            None => false,
        }
    }

    /// Queue a tile for redraw outside of any light change.
    pub fn queue_redraw(&mut self, lum: &mut LumMap, coord: Coord) {
        lum.mark_redraw(coord, &mut self.pending);
    }

    pub fn tick(&mut self, lum: &mut LumMap, env: &LightEnv<'_>) -> TickReport {
        if !self.running {
            self.stats.skipped_ticks += 1;
            return TickReport {
                skipped: true,
                ..TickReport::default()
            };
        }
        self.stats.ticks += 1;

        let mut rebuilt = 0;
        let mut inert = Vec::new();
        {
            let mut out = LumWriter::new(lum, &mut self.pending, env.kinds);
            for (id, source) in self.sources.iter_mut() {
                let revision = source.revision();
                if source.recompute(&mut out, env, &self.config) == SourceStatus::Inert {
                    inert.push(*id);
                }
                if source.revision() != revision {
                    rebuilt += 1;
                }
            }
        }
        for id in &inert {
            self.remove(*id);
        }

        let pending = std::mem::take(&mut self.pending);
        let mut redrawn = Vec::with_capacity(pending.len());
        for coord in pending {
            let kind = env.kinds.at(coord).unwrap_or(TileKind::Wall);
            if let Some(visual) = lum.redraw(coord, kind, &self.config) {
                redrawn.push((coord, visual));
            }
        }

        self.stats.rebuilds += rebuilt as u64;
        self.stats.removals += inert.len() as u64;
        self.stats.redraws += redrawn.len() as u64;
        if rebuilt > 0 || !inert.is_empty() || !redrawn.is_empty() {
            debug!(
                "lighting tick: {} rebuilt, {} removed, {} redrawn, {} live",
                rebuilt,
                inert.len(),
                redrawn.len(),
                self.sources.len()
            );
        }

        TickReport {
            skipped: false,
            rebuilt,
            removed: inert.len(),
            redrawn,
        }
    }

    /// Retract every light and empty the registry and redraw queue.
    pub fn teardown(&mut self, lum: &mut LumMap, env: &LightEnv<'_>) {
        {
            let mut out = LumWriter::new(lum, &mut self.pending, env.kinds);
            for source in self.sources.values_mut() {
                source.retract(&mut out);
            }
        }
        let removed = self.sources.len();
        self.sources.clear();
        self.by_owner.clear();
        for coord in std::mem::take(&mut self.pending) {
            let kind = env.kinds.at(coord).unwrap_or(TileKind::Wall);
            lum.redraw(coord, kind, &self.config);
        }
        info!("lighting torn down, {removed} lights retracted");
    }

    fn source_mut(&mut self, owner: Owner) -> Option<&mut LightSource> {
        let id = self.by_owner.get(&owner)?;
        self.sources.get_mut(id)
    }

    fn remove(&mut self, id: SourceId) {
        let Some(source) = self.sources.remove(&id) else {
            return;
        };
        if self.by_owner.get(&source.owner()) == Some(&id) {
            self.by_owner.remove(&source.owner());
        }
    }
}
