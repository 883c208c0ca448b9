pub use crate::core::{viewport_centered, Coord, CoreError, Grid, MapSize};
pub use crate::parse::{parse_char_grid, Legend, LegendBuilder, ParseError, ParseOptions};
