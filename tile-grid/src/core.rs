use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub struct Coord {
    pub x: u16,
    pub y: u16,
}

impl Coord {
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Offset by a signed delta, `None` if the result leaves the `u16` range.
    pub fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        let x = u16::try_from(self.x as i32 + dx).ok()?;
        let y = u16::try_from(self.y as i32 + dy).ok()?;
        Some(Self { x, y })
    }

    pub fn chebyshev(self, other: Coord) -> u16 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }
}

impl From<(u16, u16)> for Coord {
    fn from((x, y): (u16, u16)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MapSize {
    pub width: u16,
    pub height: u16,
}

impl MapSize {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    pub fn tile_count(self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn contains(self, coord: Coord) -> bool {
        coord.x < self.width && coord.y < self.height
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CoreError {
    TileCountMismatch { expected: usize, actual: usize },
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::TileCountMismatch { expected, actual } => {
                write!(f, "tile count mismatch: expected {}, got {}", expected, actual)
            }
        }
    }
}

impl std::error::Error for CoreError {}

/// Dense row-major storage, one `T` per tile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid<T> {
    size: MapSize,
    cells: Vec<T>,
}

impl<T> Grid<T> {
    pub fn from_vec(size: MapSize, cells: Vec<T>) -> Result<Self, CoreError> {
        let expected = size.tile_count();
        let actual = cells.len();
        if expected != actual {
            return Err(CoreError::TileCountMismatch { expected, actual });
        }
        Ok(Self { size, cells })
    }

    pub fn size(&self) -> MapSize {
        self.size
    }

    pub fn index(&self, coord: Coord) -> Option<usize> {
        if !self.size.contains(coord) {
            return None;
        }
        Some(coord.y as usize * self.size.width as usize + coord.x as usize)
    }

    pub fn get(&self, coord: Coord) -> Option<&T> {
        let idx = self.index(coord)?;
        self.cells.get(idx)
    }

    pub fn get_mut(&mut self, coord: Coord) -> Option<&mut T> {
        let idx = self.index(coord)?;
        self.cells.get_mut(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Coord, &T)> {
        let width = self.size.width as usize;
        self.cells.iter().enumerate().map(move |(idx, cell)| {
            let coord = Coord::new((idx % width) as u16, (idx / width) as u16);
            (coord, cell)
        })
    }

    /// Coordinates inside the grid within `radius` (square) of `center`.
    pub fn coords_within(&self, center: Coord, radius: u16) -> impl Iterator<Item = Coord> {
        let size = self.size;
        let r = radius as i32;
        let min_x = (center.x as i32 - r).max(0);
        let min_y = (center.y as i32 - r).max(0);
        let max_x = (center.x as i32 + r).min(size.width as i32 - 1);
        let max_y = (center.y as i32 + r).min(size.height as i32 - 1);
        (min_y..=max_y).flat_map(move |y| {
            (min_x..=max_x).map(move |x| Coord::new(x as u16, y as u16))
        })
    }
}

impl<T: Clone> Grid<T> {
    pub fn filled(size: MapSize, value: T) -> Self {
        Self {
            size,
            cells: vec![value; size.tile_count()],
        }
    }
}

impl<T: Copy> Grid<T> {
    pub fn at(&self, coord: Coord) -> Option<T> {
        self.get(coord).copied()
    }

    /// Replace the value at `coord`, returning the previous one.
    pub fn set(&mut self, coord: Coord, value: T) -> Option<T> {
        let cell = self.get_mut(coord)?;
        Some(std::mem::replace(cell, value))
    }
}

pub fn viewport_centered(
    focus_x: u16,
    focus_y: u16,
    map: MapSize,
    view_cols: u16,
    view_rows: u16,
) -> (u16, u16) {
    if map.width == 0 || map.height == 0 || view_cols == 0 || view_rows == 0 {
        return (0, 0);
    }

    let half_cols = view_cols / 2;
    let half_rows = view_rows / 2;
    let max_x = map.width.saturating_sub(view_cols);
    let max_y = map.height.saturating_sub(view_rows);
    let start_x = focus_x.saturating_sub(half_cols).min(max_x);
    let start_y = focus_y.saturating_sub(half_rows).min(max_y);
    (start_x, start_y)
}
