//! Player module: keyboard interaction input and the interaction HUD.

pub mod components;
pub mod plugin;
pub mod systems;

pub use plugin::PlayerPlugin;
