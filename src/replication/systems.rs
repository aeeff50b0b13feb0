//! Authority routing for interaction attempts and the disabled flag.
use bevy::prelude::*;

use crate::{
    conveyance::{
        behavior::InputAction,
        events::{
            DisabledChanged, InboundPacket, InteractionResolved, SetDisabledRequest,
            TryInteractRequest,
        },
        registry::{InteractableId, Interactables},
    },
    interactor::{components::LocalPlayer, tracker::Interactor},
};

use super::packets::{ReplicationOutbox, ReplicationPacket};

/// Runs local attempts on the authority, forwards them from observers.
pub fn route_try_interact_requests(
    mut requests: MessageReader<TryInteractRequest>,
    interactables: Res<Interactables>,
    mut outbox: ResMut<ReplicationOutbox>,
    mut resolved: MessageWriter<InteractionResolved>,
) {
    for request in requests.read() {
        if interactables.role().is_authority() {
            resolve_attempt(
                &interactables,
                &request.interactable,
                request.interactor,
                request.action.as_ref(),
                &mut resolved,
            );
        } else {
            debug!(
                "Forwarding interaction with {} to the authority",
                request.interactable
            );
            outbox.push(ReplicationPacket::try_interact(
                request.interactable.clone(),
                request.interactor,
                request.action.clone(),
            ));
        }
    }
}

/// Performs authoritative disabled writes and queues them for observers.
pub fn apply_set_disabled_requests(
    mut requests: MessageReader<SetDisabledRequest>,
    mut interactables: ResMut<Interactables>,
    local: Query<&Interactor, With<LocalPlayer>>,
    mut outbox: ResMut<ReplicationOutbox>,
    mut changed: MessageWriter<DisabledChanged>,
) {
    let local = local.single().ok();
    for request in requests.read() {
        match interactables.request_set_disabled(&request.interactable, request.disabled, local) {
            Ok(true) => {
                outbox.push(ReplicationPacket::DisabledChanged {
                    interactable: request.interactable.clone(),
                    disabled: request.disabled,
                });
                changed.write(DisabledChanged {
                    interactable: request.interactable.clone(),
                    disabled: request.disabled,
                });
            }
            Ok(false) => {}
            Err(err) => warn!("Rejected disabled change: {}", err),
        }
    }
}

/// Applies packets delivered by the transport.
pub fn apply_inbound_packets(
    mut inbound: MessageReader<InboundPacket>,
    mut interactables: ResMut<Interactables>,
    local: Query<&Interactor, With<LocalPlayer>>,
    mut resolved: MessageWriter<InteractionResolved>,
    mut changed: MessageWriter<DisabledChanged>,
) {
    let local = local.single().ok();
    for InboundPacket(packet) in inbound.read() {
        debug!(target: "replication", "inbound packet for {}", packet.interactable());
        match packet {
            ReplicationPacket::DisabledChanged {
                interactable,
                disabled,
            } => {
                if interactables.role().is_authority() {
                    warn!(
                        "Authority ignored a replicated disabled value for {}",
                        interactable
                    );
                    continue;
                }
                match interactables.apply_replicated_disabled(interactable, *disabled, local) {
                    Ok(true) => {
                        changed.write(DisabledChanged {
                            interactable: interactable.clone(),
                            disabled: *disabled,
                        });
                    }
                    Ok(false) => {}
                    Err(err) => warn!("Dropped replicated disabled value: {}", err),
                }
            }
            ReplicationPacket::TryInteract {
                interactable,
                interactor_bits,
                action,
            } => {
                if !interactables.role().is_authority() {
                    warn!(
                        "Observer received a remote interaction for {}; dropping",
                        interactable
                    );
                    continue;
                }
                resolve_attempt(
                    &interactables,
                    interactable,
                    Entity::from_bits(*interactor_bits),
                    action.as_ref(),
                    &mut resolved,
                );
            }
        }
    }
}

fn resolve_attempt(
    interactables: &Interactables,
    interactable: &InteractableId,
    interactor: Entity,
    action: Option<&InputAction>,
    resolved: &mut MessageWriter<InteractionResolved>,
) {
    match interactables.try_interact(interactable, interactor, action) {
        Ok(Some(outcome)) => {
            info!(
                "Interaction with {} by {:?} {}",
                interactable, interactor, outcome
            );
            resolved.write(InteractionResolved {
                interactable: interactable.clone(),
                interactor,
                action: action.cloned(),
                outcome,
            });
        }
        Ok(None) => debug!(
            "Interaction with {} ignored: no behavior for the requested action",
            interactable
        ),
        Err(err) => warn!("Interaction attempt dropped: {}", err),
    }
}
