//! Light sources and their footprints.
//!
//! A source caches exactly what it adds to each tile. Rebuilding always
//! retracts the old footprint first, so the per-tile totals stay equal to the
//! sum of all live footprints.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;

use log::trace;
use tile_grid::core::{Coord, Grid};

use crate::config::LightingConfig;
use crate::distance::{falloff, sqrt_intensity};
use crate::error::{LightError, Result};
use crate::luminosity::{Lum, LumWriter, to_lum};
use crate::policy::{EmitterKind, MAX_LINEAR_INTENSITY, RangeCaps, TileKind};
use crate::visibility::VisibilityService;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Weak handle to whatever emits the light.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Owner {
    Entity(EntityId),
    Tile(Coord),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OwnerLocation {
    /// The owner no longer exists.
    Gone,
    /// The owner exists but is not on the grid (carried, stored, ...).
    Nowhere,
    At(Coord),
}

pub trait OwnerLookup {
    fn locate(&self, owner: Owner) -> OwnerLocation;

    /// Owners standing on (or being) `coord` that may carry a light.
    fn owners_at(&self, coord: Coord) -> Vec<Owner>;
}

/// Read-only collaborators a recompute consults.
pub struct LightEnv<'a> {
    pub owners: &'a dyn OwnerLookup,
    pub visibility: &'a dyn VisibilityService,
    pub kinds: &'a Grid<TileKind>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceStatus {
    Live,
    /// Footprint is empty and the source may be dropped from the registry.
    Inert,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LightSource {
    owner: Owner,
    kind: EmitterKind,
    true_intensity: f32,
    intensity: f32,
    position: Option<Coord>,
    footprint: HashMap<Coord, Lum>,
    dirty: bool,
    revision: u64,
}

impl LightSource {
    /// Fails if the owner does not resolve; a light must start attached.
    pub fn new(
        owner: Owner,
        kind: EmitterKind,
        value: f32,
        is_already_squared: bool,
        owners: &dyn OwnerLookup,
    ) -> Result<Self> {
        if owners.locate(owner) == OwnerLocation::Gone {
            return Err(LightError::MissingOwner(owner));
        }
        let mut source = Self {
            owner,
            kind,
            true_intensity: 0.0,
            intensity: 0.0,
            position: None,
            footprint: HashMap::new(),
            dirty: true,
            revision: 0,
        };
        source.set_intensity(value, is_already_squared);
        source.dirty = true;
        Ok(source)
    }

    pub fn owner(&self) -> Owner {
        self.owner
    }

    pub fn kind(&self) -> EmitterKind {
        self.kind
    }

    pub fn true_intensity(&self) -> f32 {
        self.true_intensity
    }

    /// Linear intensity, as shown to players.
    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn position(&self) -> Option<Coord> {
        self.position
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Bumped on every footprint rebuild.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn footprint(&self) -> &HashMap<Coord, Lum> {
        &self.footprint
    }

    pub fn contribution_at(&self, coord: Coord) -> f32 {
        self.footprint
            .get(&coord)
            .map_or(0.0, |lum| crate::luminosity::from_lum(*lum))
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Strength at distance zero; zero when the true intensity is below 1.
    pub fn effective_intensity(&self) -> f32 {
        if self.true_intensity < 1.0 {
            return 0.0;
        }
        sqrt_intensity(self.true_intensity)
    }

    pub fn effective_radius(&self, caps: &RangeCaps) -> u16 {
        (self.intensity.floor() as u16).min(caps.cap(self.kind))
    }

    /// Returns whether the stored value changed. Recompute waits for the next tick.
    pub fn set_intensity(&mut self, value: f32, is_already_squared: bool) -> bool {
        let value = value.max(0.0);
        let true_intensity = if is_already_squared {
            value
        } else {
            value * value
        };
        if true_intensity == self.true_intensity {
            return false;
        }

        self.true_intensity = true_intensity;
        self.intensity = if true_intensity < 1.0 {
            0.0
        } else {
            sqrt_intensity(true_intensity.min(MAX_LINEAR_INTENSITY * MAX_LINEAR_INTENSITY))
        };
        self.dirty = true;
        true
    }

    pub fn set_kind(&mut self, kind: EmitterKind) {
        if self.kind != kind {
            self.kind = kind;
            self.dirty = true;
        }
    }

    pub fn recompute(
        &mut self,
        out: &mut LumWriter<'_>,
        env: &LightEnv<'_>,
        config: &LightingConfig,
    ) -> SourceStatus {
        let current = match env.owners.locate(self.owner) {
            OwnerLocation::Gone => {
                self.retract(out);
                self.position = None;
                return SourceStatus::Inert;
            }
            OwnerLocation::Nowhere => None,
            OwnerLocation::At(coord) => Some(coord),
        };
        if current != self.position {
            self.position = current;
            self.dirty = true;
        }
        if !self.dirty {
            return self.status();
        }

        self.retract(out);
        self.dirty = false;
        self.revision += 1;

        let Some(origin) = self.position else {
            return SourceStatus::Inert;
        };
        let strength = self.effective_intensity();
        if strength <= 0.0 {
            return SourceStatus::Inert;
        }

        let radius = self.effective_radius(&config.caps);
        for coord in env.visibility.visible_tiles(origin, radius) {
            if coord.chebyshev(origin) > radius {
                continue;
            }
            let delta = to_lum(falloff(strength, config.metric.distance(coord, origin)));
            if delta <= 0 {
                continue;
            }
            if let Entry::Vacant(slot) = self.footprint.entry(coord) {
                slot.insert(delta);
                out.apply(coord, delta);
            }
        }
        trace!(
            "light {:?} rebuilt at {origin}: radius {radius}, {} tiles",
            self.owner,
            self.footprint.len()
        );
        SourceStatus::Live
    }

    /// Subtract every contribution and forget the footprint.
    pub fn retract(&mut self, out: &mut LumWriter<'_>) {
        for (coord, delta) in self.footprint.drain() {
            out.apply(coord, -delta);
        }
    }

    fn status(&self) -> SourceStatus {
        if self.position.is_none() || self.effective_intensity() <= 0.0 {
            SourceStatus::Inert
        } else {
            SourceStatus::Live
        }
    }
}
