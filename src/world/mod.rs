//! World module housing the demo scene and camera controls.
pub mod components;
pub mod plugin;
pub mod systems;

pub use plugin::WorldPlugin;
