//! Character-map parsing. Each map line is a row; a legend maps characters
//! to tile values. Trailing whitespace is dropped, leading whitespace is kept
//! so indented maps stay aligned.

use std::collections::HashMap;
use std::fmt;

use crate::core::{CoreError, Grid, MapSize};

/// How short rows are padded out to the widest row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseOptions<T> {
    pub fill_char: char,
    pub fill_tile: T,
}

#[derive(Clone, Debug)]
pub struct Legend<T> {
    map: HashMap<char, T>,
}

impl<T: Copy> Legend<T> {
    pub fn builder() -> LegendBuilder<T> {
        LegendBuilder {
            entries: HashMap::new(),
            duplicate: None,
        }
    }

    pub fn get(&self, ch: char) -> Option<T> {
        self.map.get(&ch).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct LegendBuilder<T> {
    entries: HashMap<char, T>,
    duplicate: Option<char>,
}

impl<T: Copy> LegendBuilder<T> {
    pub fn entry(mut self, ch: char, tile: T) -> Self {
        if self.entries.insert(ch, tile).is_some() && self.duplicate.is_none() {
            self.duplicate = Some(ch);
        }
        self
    }

    pub fn build(self) -> Result<Legend<T>, ParseError> {
        if let Some(ch) = self.duplicate {
            return Err(ParseError::DuplicateKey(ch));
        }
        if self.entries.is_empty() {
            return Err(ParseError::EmptyLegend);
        }
        if self.entries.keys().any(|ch| ch.is_control()) {
            return Err(ParseError::InvalidLegendChar);
        }
        Ok(Legend { map: self.entries })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    EmptyLegend,
    InvalidLegendChar,
    DuplicateKey(char),
    UnknownKey { ch: char, x: usize, y: usize },
    TooLarge { width: usize, height: usize },
    Shape(CoreError),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::EmptyLegend => write!(f, "legend has no entries"),
            ParseError::InvalidLegendChar => write!(f, "legend maps a control character"),
            ParseError::DuplicateKey(ch) => write!(f, "legend maps {ch:?} twice"),
            ParseError::UnknownKey { ch, x, y } => {
                write!(f, "map character {ch:?} at ({x}, {y}) is not in the legend")
            }
            ParseError::TooLarge { width, height } => {
                write!(f, "map of {width}x{height} tiles exceeds the u16 range")
            }
            ParseError::Shape(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<CoreError> for ParseError {
    fn from(err: CoreError) -> Self {
        ParseError::Shape(err)
    }
}

/// Parse `text` into a grid. Blank lines are skipped. Short rows are padded
/// with `options.fill_char`, which resolves through the legend first and
/// falls back to `options.fill_tile`.
pub fn parse_char_grid<T: Copy>(
    text: &str,
    legend: &Legend<T>,
    options: &ParseOptions<T>,
) -> Result<Grid<T>, ParseError> {
    let rows: Vec<Vec<char>> = text
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(|line| line.chars().collect())
        .collect();

    let height = rows.len();
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let (Ok(w), Ok(h)) = (u16::try_from(width), u16::try_from(height)) else {
        return Err(ParseError::TooLarge { width, height });
    };

    let resolve = |ch: char, x: usize, y: usize| match legend.get(ch) {
        Some(tile) => Ok(tile),
        None if ch == options.fill_char => Ok(options.fill_tile),
        None => Err(ParseError::UnknownKey { ch, x, y }),
    };

    let mut tiles = Vec::with_capacity(width * height);
    for (y, row) in rows.iter().enumerate() {
        for x in 0..width {
            let ch = row.get(x).copied().unwrap_or(options.fill_char);
            tiles.push(resolve(ch, x, y)?);
        }
    }

    Ok(Grid::from_vec(MapSize::new(w, h), tiles)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Coord;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Cell {
        Open,
        Rock,
        Void,
    }

    fn legend() -> Legend<Cell> {
        Legend::builder()
            .entry('.', Cell::Open)
            .entry('#', Cell::Rock)
            .build()
            .expect("legend")
    }

    const VOID_FILL: ParseOptions<Cell> = ParseOptions {
        fill_char: ' ',
        fill_tile: Cell::Void,
    };

    #[test]
    fn short_rows_are_padded_with_the_fill_tile() {
        let grid = parse_char_grid("\n###\n#.\n#\n", &legend(), &VOID_FILL).expect("map");

        assert_eq!(grid.size(), MapSize::new(3, 3));
        assert_eq!(grid.at(Coord::new(1, 1)), Some(Cell::Open));
        assert_eq!(grid.at(Coord::new(2, 1)), Some(Cell::Void));
        assert_eq!(grid.at(Coord::new(1, 2)), Some(Cell::Void));
    }

    #[test]
    fn leading_whitespace_is_significant() {
        let grid = parse_char_grid("  #   \n#", &legend(), &VOID_FILL).expect("map");

        assert_eq!(grid.size(), MapSize::new(3, 2));
        assert_eq!(grid.at(Coord::new(0, 0)), Some(Cell::Void));
        assert_eq!(grid.at(Coord::new(2, 0)), Some(Cell::Rock));
    }

    #[test]
    fn unknown_character_reports_its_position() {
        let err = parse_char_grid("..\n.?", &legend(), &VOID_FILL).expect_err("should fail");

        assert_eq!(err, ParseError::UnknownKey { ch: '?', x: 1, y: 1 });
    }

    #[test]
    fn legend_rejects_empty_and_duplicate_entries() {
        let empty = Legend::<Cell>::builder().build().expect_err("empty");
        assert_eq!(empty, ParseError::EmptyLegend);

        let dup = Legend::builder()
            .entry('#', Cell::Rock)
            .entry('#', Cell::Open)
            .build()
            .expect_err("duplicate");
        assert_eq!(dup, ParseError::DuplicateKey('#'));
    }

    #[test]
    fn empty_text_is_an_empty_grid() {
        let grid = parse_char_grid("\n\n", &legend(), &VOID_FILL).expect("map");
        assert_eq!(grid.size(), MapSize::new(0, 0));
    }
}
