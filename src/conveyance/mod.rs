//! Conveyance module: interactable state, UI-state conveyance and trigger behaviors.
pub mod behavior;
pub mod callbacks;
pub mod config;
pub mod errors;
pub mod events;
pub mod interactable;
pub mod plugin;
pub mod query;
pub mod registry;
pub mod systems;
pub mod telemetry;
pub mod ui_state;

pub use plugin::{ConveyancePlugin, ConveyanceSet};
