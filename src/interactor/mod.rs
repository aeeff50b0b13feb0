//! Interactor module: per-agent candidate/focus tracking and discovery.
pub mod components;
pub mod discovery;
pub mod plugin;
pub mod systems;
pub mod tracker;

pub use plugin::InteractorPlugin;
