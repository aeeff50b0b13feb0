//! ConveyancePlugin loads settings and wires the registry, presentation and telemetry.
use bevy::prelude::*;

use crate::{interactor::InteractorPlugin, replication::ReplicationPlugin};

use super::{
    config::ConveyanceSettings,
    registry::Interactables,
    systems::{sync_conveyed_state, sync_local_pawn},
    telemetry::{
        flush_interaction_telemetry_log, record_interaction_telemetry, InteractionTelemetry,
        InteractionTelemetryLog,
    },
};

/// Frame phases of the interaction pipeline, run in declaration order.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConveyanceSet {
    /// Destroyed interactables are released and the local pawn is resolved.
    Lifecycle,
    /// Candidates are discovered for the local agent.
    Discovery,
    /// Gameplay input turns into interaction and disabled requests.
    Input,
    /// Requests are executed on the authority or forwarded to it.
    Requests,
    /// UI state is mirrored onto owners and recorded.
    Present,
}

pub struct ConveyancePlugin;

impl Plugin for ConveyancePlugin {
    fn build(&self, app: &mut App) {
        let settings = ConveyanceSettings::load_or_default();
        info!(
            "Conveyance configured: role {}, discovery {:?}, telemetry -> {}",
            settings.role, settings.discovery.mode, settings.telemetry.log_path
        );

        app.configure_sets(
            Update,
            (
                ConveyanceSet::Lifecycle,
                ConveyanceSet::Discovery,
                ConveyanceSet::Input,
                ConveyanceSet::Requests,
                ConveyanceSet::Present,
            )
                .chain(),
        )
        .insert_resource(Interactables::new(settings.role))
        .insert_resource(InteractionTelemetry::new(settings.telemetry.capacity))
        .insert_resource(InteractionTelemetryLog::new(
            settings.telemetry.log_path.clone(),
        ))
        .add_plugins((
            ReplicationPlugin,
            InteractorPlugin::with_discovery(settings.discovery),
        ))
        .add_systems(
            Update,
            (
                sync_local_pawn
                    .in_set(ConveyanceSet::Lifecycle)
                    .after(crate::interactor::systems::release_destroyed_interactables),
                (sync_conveyed_state, record_interaction_telemetry).in_set(ConveyanceSet::Present),
            ),
        )
        .add_systems(Last, flush_interaction_telemetry_log)
        .insert_resource(settings);
    }
}
