//! Payloads exchanged with the host transport and the outbox that queues them.
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::conveyance::{behavior::InputAction, registry::InteractableId};

/// One replicated change or remote call. The transport owns delivery; the core only
/// produces and consumes these values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "packet", rename_all = "snake_case")]
pub enum ReplicationPacket {
    /// Authority to observers: the disabled flag of an interactable changed.
    DisabledChanged {
        interactable: InteractableId,
        disabled: bool,
    },
    /// Observer to authority: run `TryInteract` there, at most once.
    TryInteract {
        interactable: InteractableId,
        interactor_bits: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        action: Option<InputAction>,
    },
}

impl ReplicationPacket {
    pub fn try_interact(
        interactable: InteractableId,
        interactor: Entity,
        action: Option<InputAction>,
    ) -> Self {
        Self::TryInteract {
            interactable,
            interactor_bits: interactor.to_bits(),
            action,
        }
    }

    pub fn interactable(&self) -> &InteractableId {
        match self {
            Self::DisabledChanged { interactable, .. } | Self::TryInteract { interactable, .. } => {
                interactable
            }
        }
    }
}

pub fn encode_packet(packet: &ReplicationPacket) -> Result<String, serde_json::Error> {
    serde_json::to_string(packet)
}

pub fn decode_packet(raw: &str) -> Result<ReplicationPacket, serde_json::Error> {
    serde_json::from_str(raw)
}

/// Packets waiting for the host transport to pick them up.
#[derive(Resource, Debug, Default)]
pub struct ReplicationOutbox {
    pending: Vec<ReplicationPacket>,
    sent_total: u64,
}

impl ReplicationOutbox {
    pub fn push(&mut self, packet: ReplicationPacket) {
        self.sent_total += 1;
        self.pending.push(packet);
    }

    pub fn pending(&self) -> &[ReplicationPacket] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn sent_total(&self) -> u64 {
        self.sent_total
    }

    pub fn drain(&mut self) -> Vec<ReplicationPacket> {
        std::mem::take(&mut self.pending)
    }

    /// Drains everything as newline-separated JSON, one packet per line.
    pub fn drain_json_lines(&mut self) -> Result<String, serde_json::Error> {
        let mut out = String::new();
        for packet in self.drain() {
            out.push_str(&encode_packet(&packet)?);
            out.push('\n');
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn packets_encode_with_a_type_tag() {
        let packet = ReplicationPacket::DisabledChanged {
            interactable: InteractableId::new("door1"),
            disabled: true,
        };
        let raw = encode_packet(&packet).expect("encode");
        let value: Value = serde_json::from_str(&raw).expect("valid json");
        assert_eq!(value["packet"], "disabled_changed");
        assert_eq!(value["interactable"], "door1");
        assert_eq!(decode_packet(&raw).expect("decode"), packet);
        assert_eq!(packet.interactable(), &InteractableId::new("door1"));
    }

    #[test]
    fn try_interact_without_action_omits_the_field() {
        let mut world = World::new();
        let pawn = world.spawn_empty().id();
        let packet = ReplicationPacket::try_interact(InteractableId::new("lever"), pawn, None);
        let raw = encode_packet(&packet).expect("encode");
        assert!(!raw.contains("action"));

        let decoded = decode_packet(&raw).expect("decode");
        assert_eq!(decoded.interactable().as_str(), "lever");
        match decoded {
            ReplicationPacket::TryInteract {
                interactor_bits, ..
            } => assert_eq!(Entity::from_bits(interactor_bits), pawn),
            other => panic!("unexpected packet {:?}", other),
        }
    }

    #[test]
    fn outbox_drains_as_json_lines() {
        let mut outbox = ReplicationOutbox::default();
        outbox.push(ReplicationPacket::DisabledChanged {
            interactable: InteractableId::new("a"),
            disabled: true,
        });
        outbox.push(ReplicationPacket::DisabledChanged {
            interactable: InteractableId::new("b"),
            disabled: false,
        });

        let lines = outbox.drain_json_lines().expect("encode");
        assert_eq!(lines.lines().count(), 2);
        assert!(outbox.is_empty());
        assert_eq!(outbox.sent_total(), 2);
        assert!(decode_packet("{\"packet\":\"teleport\"}").is_err());
    }
}
