//! Tile grid storage shared by the lighting engine and its demo.

pub mod core;
pub mod parse;
pub mod prelude;
