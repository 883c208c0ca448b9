//! Per-tile luminosity accumulators and the redraw mapping.
//!
//! Contributions are fixed-point (`LUM_SCALE` units per lumen) so a retract
//! always cancels the matching apply exactly.

use std::collections::BTreeSet;

use tile_grid::core::{Coord, Grid, MapSize};

use crate::config::LightingConfig;
use crate::policy::TileKind;

pub type Lum = i64;

pub const LUM_SCALE: f32 = 1000.0;

/// Tiles waiting for the redraw pass.
pub type PendingTiles = BTreeSet<Coord>;

pub fn to_lum(value: f32) -> Lum {
    (value * LUM_SCALE).round() as Lum
}

pub fn from_lum(value: Lum) -> f32 {
    value as f32 / LUM_SCALE
}

/// Target overlay handed to the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileVisual {
    /// Darkness overlay opacity, 255 fully dark, 0 fully lit.
    pub alpha: u8,
    pub color: [u8; 3],
    /// Observers cannot see into the tile.
    pub too_dark: bool,
}

impl TileVisual {
    pub const fn dark(color: [u8; 3]) -> Self {
        Self {
            alpha: u8::MAX,
            color,
            too_dark: true,
        }
    }

    pub const fn lit(color: [u8; 3]) -> Self {
        Self {
            alpha: 0,
            color,
            too_dark: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileLight {
    lumcount: Lum,
    redraw_dirty: bool,
    visual: TileVisual,
}

impl TileLight {
    pub fn lumcount(&self) -> f32 {
        from_lum(self.lumcount)
    }

    pub fn raw_lumcount(&self) -> Lum {
        self.lumcount
    }

    pub fn is_redraw_dirty(&self) -> bool {
        self.redraw_dirty
    }

    pub fn visual(&self) -> TileVisual {
        self.visual
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LumMap {
    tiles: Grid<TileLight>,
}

impl LumMap {
    /// Every tile starts unlit; visually inert kinds start in their fixed state.
    pub fn new(kinds: &Grid<TileKind>, config: &LightingConfig) -> Self {
        let dark = TileLight {
            lumcount: 0,
            redraw_dirty: false,
            visual: TileVisual::dark(config.overlay_color),
        };
        let mut tiles = Grid::filled(kinds.size(), dark);
        for (coord, kind) in kinds.iter() {
            if kind.is_visually_inert() {
                tiles.set(
                    coord,
                    TileLight {
                        visual: TileVisual::lit(config.overlay_color),
                        ..dark
                    },
                );
            }
        }
        Self { tiles }
    }

    pub fn size(&self) -> MapSize {
        self.tiles.size()
    }

    pub fn tile(&self, coord: Coord) -> Option<&TileLight> {
        self.tiles.get(coord)
    }

    pub fn lumcount(&self, coord: Coord) -> f32 {
        self.tiles.get(coord).map_or(0.0, TileLight::lumcount)
    }

    pub fn raw_lumcount(&self, coord: Coord) -> Option<Lum> {
        self.tiles.get(coord).map(|tile| tile.lumcount)
    }

    pub fn visual(&self, coord: Coord) -> Option<TileVisual> {
        self.tiles.get(coord).map(|tile| tile.visual)
    }

    pub fn coords_within(&self, center: Coord, radius: u16) -> impl Iterator<Item = Coord> {
        self.tiles.coords_within(center, radius)
    }

    pub fn update_lumcount(
        &mut self,
        coord: Coord,
        delta: Lum,
        kind: TileKind,
        pending: &mut PendingTiles,
    ) {
        let Some(tile) = self.tiles.get_mut(coord) else {
            return;
        };
        tile.lumcount += delta;
        debug_assert!(tile.lumcount >= 0, "negative lumcount at {coord}");
        if kind.is_visually_inert() {
            return;
        }
        if !tile.redraw_dirty {
            tile.redraw_dirty = true;
            pending.insert(coord);
        }
    }

    /// Queue a redraw without touching the count, e.g. after a kind change.
    pub fn mark_redraw(&mut self, coord: Coord, pending: &mut PendingTiles) {
        if let Some(tile) = self.tiles.get_mut(coord) {
            tile.redraw_dirty = true;
            pending.insert(coord);
        }
    }

    pub fn redraw(
        &mut self,
        coord: Coord,
        kind: TileKind,
        config: &LightingConfig,
    ) -> Option<TileVisual> {
        let tile = self.tiles.get_mut(coord)?;
        tile.visual = target_visual(tile.lumcount(), kind, config);
        tile.redraw_dirty = false;
        Some(tile.visual)
    }
}

pub fn target_visual(lumcount: f32, kind: TileKind, config: &LightingConfig) -> TileVisual {
    let color = config.overlay_color;
    if kind.is_visually_inert() {
        return TileVisual::lit(color);
    }
    if lumcount <= 0.0 {
        return TileVisual::dark(color);
    }
    if lumcount >= config.lum_cap {
        return TileVisual::lit(color);
    }

    let lit_fraction = lumcount / config.lum_cap;
    let alpha = (255.0 * (1.0 - lit_fraction)).round().clamp(0.0, 255.0) as u8;
    TileVisual {
        alpha,
        color,
        too_dark: alpha > config.darkest_visible_alpha,
    }
}

/// Write access a light source uses to apply and retract contributions.
pub struct LumWriter<'a> {
    lum: &'a mut LumMap,
    pending: &'a mut PendingTiles,
    kinds: &'a Grid<TileKind>,
}

impl<'a> LumWriter<'a> {
    pub fn new(
        lum: &'a mut LumMap,
        pending: &'a mut PendingTiles,
        kinds: &'a Grid<TileKind>,
    ) -> Self {
        Self {
            lum,
            pending,
            kinds,
        }
    }

    pub fn apply(&mut self, coord: Coord, delta: Lum) {
        let kind = self.kinds.at(coord).unwrap_or(TileKind::Wall);
        self.lum.update_lumcount(coord, delta, kind, self.pending);
    }
}
