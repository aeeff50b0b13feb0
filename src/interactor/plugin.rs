//! InteractorPlugin wires discovery and interactor lifecycle systems.
use bevy::prelude::*;

use crate::conveyance::{config::DiscoverySettings, ConveyanceSet};

#[cfg(feature = "conveyance_debug")]
use super::systems::{log_local_interactor, DebugTickTimer};
use super::{
    discovery::{
        discover_by_cursor, discover_by_overlap, discover_by_raycast, discovery_mode_is,
        DiscoveryMode,
    },
    systems::release_destroyed_interactables,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct InteractorPlugin {
    discovery: DiscoverySettings,
}

impl InteractorPlugin {
    pub const fn with_discovery(discovery: DiscoverySettings) -> Self {
        Self { discovery }
    }
}

impl Plugin for InteractorPlugin {
    fn build(&self, app: &mut App) {
        info!(
            "Interactor discovery: {:?} (range {:.2})",
            self.discovery.mode, self.discovery.raycast_range
        );

        app.insert_resource(self.discovery)
            .add_systems(
                Update,
                release_destroyed_interactables.in_set(ConveyanceSet::Lifecycle),
            )
            .add_systems(
                Update,
                (
                    discover_by_raycast.run_if(discovery_mode_is(DiscoveryMode::Raycast)),
                    discover_by_cursor.run_if(discovery_mode_is(DiscoveryMode::Cursor)),
                    discover_by_overlap.run_if(discovery_mode_is(DiscoveryMode::Overlap)),
                )
                    .in_set(ConveyanceSet::Discovery),
            );

        #[cfg(feature = "conveyance_debug")]
        {
            app.init_resource::<DebugTickTimer>()
                .add_systems(Update, log_local_interactor.after(ConveyanceSet::Discovery));
        }
    }
}
