use tile_grid::core::Coord;
use tile_grid::parse::ParseError;

use crate::source::Owner;

#[derive(thiserror::Error, Debug)]
pub enum LightError {
    #[error("light owner {0:?} does not exist")]
    MissingOwner(Owner),
    #[error("unknown entity {0}")]
    UnknownEntity(u32),
    #[error("tile {0} is outside the grid")]
    OutOfBounds(Coord),
    #[error("invalid lighting config: {0}")]
    InvalidConfig(String),
    #[error("lumcount drift at {coord}: footprints sum to {expected}, tile holds {actual}")]
    Conservation {
        coord: Coord,
        expected: i64,
        actual: i64,
    },
    #[error("scene manifest error: {0}")]
    Manifest(#[from] serde_yaml::Error),
    #[error("map parse error: {0}")]
    Map(#[from] ParseError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = LightError> = std::result::Result<T, E>;
