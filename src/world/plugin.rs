//! WorldPlugin sets up the demo scene, camera controls and interactable presentation.
use bevy::prelude::*;
use interaction_conveyance::conveyance::ConveyanceSet;

use crate::world::systems::{
    drain_replication_outbox, fly_camera_mouse_look, fly_camera_translate, paint_conveyed_state,
    spawn_interactables, spawn_world_environment, swing_doors, update_cursor_grab,
};

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, (spawn_world_environment, spawn_interactables))
            .add_systems(
                Update,
                (
                    (
                        update_cursor_grab,
                        fly_camera_mouse_look.after(update_cursor_grab),
                        fly_camera_translate,
                    )
                        .before(ConveyanceSet::Discovery),
                    swing_doors,
                    paint_conveyed_state.after(ConveyanceSet::Present),
                    drain_replication_outbox.after(ConveyanceSet::Requests),
                ),
            );
    }
}
