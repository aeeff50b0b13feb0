//! Components for the player's interaction HUD.
use bevy::prelude::*;

/// Marker for the text node listing candidate, focus and role.
#[derive(Component, Debug)]
pub struct InteractionHud;
