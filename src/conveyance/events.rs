//! Messages exchanged between input, conveyance and replication systems.
use bevy::prelude::{Entity, Message};

use super::{
    behavior::{InputAction, InteractOutcome},
    registry::InteractableId,
};
use crate::replication::packets::ReplicationPacket;

/// A user-initiated attempt to interact. Routed to the authority before it runs.
#[derive(Message, Debug, Clone)]
pub struct TryInteractRequest {
    pub interactable: InteractableId,
    pub interactor: Entity,
    pub action: Option<InputAction>,
}

/// Gameplay asks to flip the disabled flag. Honoured only on the authority.
#[derive(Message, Debug, Clone)]
pub struct SetDisabledRequest {
    pub interactable: InteractableId,
    pub disabled: bool,
}

/// Written by the host transport for every packet that arrives from a peer.
#[derive(Message, Debug, Clone)]
pub struct InboundPacket(pub ReplicationPacket);

/// Fired on the authority once an attempt has been decided.
#[derive(Message, Debug, Clone)]
pub struct InteractionResolved {
    pub interactable: InteractableId,
    pub interactor: Entity,
    pub action: Option<InputAction>,
    pub outcome: InteractOutcome,
}

/// Fired on every peer whenever an interactable's disabled flag actually changed.
#[derive(Message, Debug, Clone)]
pub struct DisabledChanged {
    pub interactable: InteractableId,
    pub disabled: bool,
}
