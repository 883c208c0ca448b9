//! Incremental per-tile lighting.
//!
//! Light sources cache the exact contribution they add to each tile, so a
//! move, an opacity change or a despawn only retracts and reapplies the
//! affected footprints instead of relighting the whole grid.

pub mod app;
pub mod config;
pub mod controller;
pub mod distance;
pub mod error;
pub mod invalidate;
pub mod luminosity;
pub mod manifest;
pub mod policy;
pub mod scene;
pub mod source;
pub mod visibility;

pub use config::LightingConfig;
pub use controller::{ControllerState, LightingController, TickReport};
pub use error::{LightError, Result};
pub use scene::{EntitySpec, Scene};
pub use source::{EntityId, Owner};
