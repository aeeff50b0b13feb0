//! ReplicationPlugin registers the outbox, the request messages and authority routing.
use bevy::prelude::*;

use crate::conveyance::{
    events::{
        DisabledChanged, InboundPacket, InteractionResolved, SetDisabledRequest,
        TryInteractRequest,
    },
    registry::Interactables,
    ConveyanceSet,
};

use super::{
    packets::ReplicationOutbox,
    systems::{apply_inbound_packets, apply_set_disabled_requests, route_try_interact_requests},
};

/// Authority routing on top of the registry. The peer role is read from `Interactables`,
/// which must be inserted before this plugin's systems run.
pub struct ReplicationPlugin;

impl Plugin for ReplicationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ReplicationOutbox>()
            .add_message::<TryInteractRequest>()
            .add_message::<SetDisabledRequest>()
            .add_message::<InboundPacket>()
            .add_message::<InteractionResolved>()
            .add_message::<DisabledChanged>()
            .add_systems(Startup, log_startup_role)
            .add_systems(
                Update,
                (
                    apply_inbound_packets,
                    apply_set_disabled_requests,
                    route_try_interact_requests,
                )
                    .chain()
                    .in_set(ConveyanceSet::Requests),
            );
    }
}

fn log_startup_role(interactables: Res<Interactables>) {
    info!("ReplicationPlugin initialised as {}", interactables.role());
}
