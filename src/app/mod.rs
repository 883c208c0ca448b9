//! Terminal demo: walk a lantern through a scene and watch the lighting
//! engine relight only what changed.

pub mod action;
pub mod effect;
pub mod reducer;
pub mod state;
pub mod ui;
