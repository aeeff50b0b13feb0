//! Error and diagnostic types surfaced by the conveyance layer.
use std::fmt;

use bevy::prelude::Entity;

use super::registry::InteractableId;

/// Names every callback slot an interactable can bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallbackKind {
    CanInteract,
    OnInteract,
    OnInteractFailed,
    OnDisabledChanged,
    OnUiStateChanged,
    HoverVisual,
    FocusVisual,
    DefaultVisual,
}

impl fmt::Display for CallbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::CanInteract => "CanInteract",
            Self::OnInteract => "OnInteract",
            Self::OnInteractFailed => "OnInteractFailed",
            Self::OnDisabledChanged => "OnDisabledChanged",
            Self::OnUiStateChanged => "OnUIStateChanged",
            Self::HoverVisual => "GetHoverVisual",
            Self::FocusVisual => "GetFocusVisual",
            Self::DefaultVisual => "GetDefaultVisual",
        };
        write!(f, "{}", label)
    }
}

/// Operations that only the authoritative peer may perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorityOperation {
    SetDisabled,
    TryInteract,
}

impl fmt::Display for AuthorityOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::SetDisabled => "set disabled",
            Self::TryInteract => "try interact",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConveyanceError {
    /// Initialize was called with neither a query volume nor a physical representation.
    MissingQueryTarget { id: InteractableId },
    /// A call path needed a callback that was never bound.
    UnboundCallback {
        id: Option<InteractableId>,
        callback: CallbackKind,
    },
    /// A non-authoritative peer tried to perform an authoritative write.
    NotAuthority {
        id: InteractableId,
        operation: AuthorityOperation,
    },
    /// The id is already registered to a different owning entity.
    DuplicateId { id: InteractableId },
    /// The query target entity already resolves hits for another interactable.
    SharedQueryTarget {
        id: InteractableId,
        target: Entity,
        holder: InteractableId,
    },
    UnknownInteractable { id: InteractableId },
}

impl ConveyanceError {
    pub fn unbound(id: Option<&InteractableId>, callback: CallbackKind) -> Self {
        Self::UnboundCallback {
            id: id.cloned(),
            callback,
        }
    }
}

impl fmt::Display for ConveyanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingQueryTarget { id } => write!(
                f,
                "interactable {} needs a query volume or a physical representation",
                id
            ),
            Self::UnboundCallback { id: Some(id), callback } => {
                write!(f, "interactable {} has no {} callback bound", id, callback)
            }
            Self::UnboundCallback { id: None, callback } => write!(
                f,
                "uninitialized interactable has no {} callback bound",
                callback
            ),
            Self::NotAuthority { id, operation } => write!(
                f,
                "cannot {} on {} from a non-authoritative peer",
                operation, id
            ),
            Self::DuplicateId { id } => {
                write!(f, "interactable id {} is owned by another entity", id)
            }
            Self::SharedQueryTarget { id, target, holder } => write!(
                f,
                "interactable {} cannot use query target {:?}, it already belongs to {}",
                id, target, holder
            ),
            Self::UnknownInteractable { id } => write!(f, "no interactable registered as {}", id),
        }
    }
}

impl std::error::Error for ConveyanceError {}
