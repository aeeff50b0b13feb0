//! Interaction behaviors: the "can this succeed" decision and its outcome notifications.
use std::{borrow::Cow, fmt};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::{
    callbacks::{CanInteractFn, Callback, InteractFn},
    errors::{CallbackKind, ConveyanceError},
    registry::InteractableId,
};

/// Names the input that triggered an interaction attempt, e.g. `Interactions.Input.Use`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputAction(Cow<'static, str>);

impl InputAction {
    pub const fn from_static(tag: &'static str) -> Self {
        Self(Cow::Borrowed(tag))
    }

    pub fn new(tag: impl Into<String>) -> Self {
        Self(Cow::Owned(tag.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InputAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Terminal outcome of a `TryInteract` call.
///
/// A failed `CanInteract` is a valid result, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractOutcome {
    Succeeded,
    Failed,
}

impl InteractOutcome {
    pub fn succeeded(self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

impl fmt::Display for InteractOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Callbacks used when a pressed-style input asks to interact.
///
/// `CanInteract` and `OnInteract` are required on the paths that use them; `OnInteractFailed`
/// is optional and skipped quietly when unbound.
#[derive(Debug, Default)]
pub struct TriggeredBehavior {
    pub can_interact: Callback<CanInteractFn>,
    pub on_succeeded: Callback<InteractFn>,
    pub on_failed: Callback<InteractFn>,
}

impl TriggeredBehavior {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_can_interact(
        mut self,
        decide: impl Fn(Entity) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.can_interact = Callback::bound(Box::new(decide));
        self
    }

    pub fn on_succeeded(mut self, notify: impl Fn(Entity) + Send + Sync + 'static) -> Self {
        self.on_succeeded = Callback::bound(Box::new(notify));
        self
    }

    pub fn on_failed(mut self, notify: impl Fn(Entity) + Send + Sync + 'static) -> Self {
        self.on_failed = Callback::bound(Box::new(notify));
        self
    }

    pub fn rebind_from(&mut self, incoming: TriggeredBehavior) {
        self.can_interact.rebind_from(incoming.can_interact);
        self.on_succeeded.rebind_from(incoming.on_succeeded);
        self.on_failed.rebind_from(incoming.on_failed);
    }

    /// Fails closed: an unbound decision reports `false`.
    pub fn can_interact(&self, owner: Option<&InteractableId>, interactor: Entity) -> bool {
        match self.can_interact.get() {
            Some(decide) => decide(interactor),
            None => {
                error!("{}", ConveyanceError::unbound(owner, CallbackKind::CanInteract));
                false
            }
        }
    }

    /// Runs the decision and fires exactly one of the two outcome notifications.
    pub fn run(&self, owner: Option<&InteractableId>, interactor: Entity) -> InteractOutcome {
        if self.can_interact(owner, interactor) {
            match self.on_succeeded.get() {
                Some(notify) => notify(interactor),
                None => error!("{}", ConveyanceError::unbound(owner, CallbackKind::OnInteract)),
            }
            InteractOutcome::Succeeded
        } else {
            if let Some(notify) = self.on_failed.get() {
                notify(interactor);
            }
            InteractOutcome::Failed
        }
    }
}
