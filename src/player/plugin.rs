//! Player plugin wiring interaction input and HUD systems.
use bevy::prelude::*;
use interaction_conveyance::conveyance::ConveyanceSet;

use crate::player::systems::{
    handle_interaction_keys, spawn_interaction_hud, update_interaction_hud,
};

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_interaction_hud).add_systems(
            Update,
            (
                handle_interaction_keys.in_set(ConveyanceSet::Input),
                update_interaction_hud.after(ConveyanceSet::Present),
            ),
        );
    }
}
