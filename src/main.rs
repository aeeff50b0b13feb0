use bevy::prelude::*;
use interaction_conveyance::ConveyancePlugin;

mod player;
mod world;

use crate::{player::PlayerPlugin, world::WorldPlugin};

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins,
            ConveyancePlugin,
            WorldPlugin,
            PlayerPlugin,
        ))
        .run();
}
