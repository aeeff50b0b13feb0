//! The interactable state machine: hover/focus/default transitions and the disabled flag.
use std::collections::HashMap;

use bevy::prelude::*;

use crate::interactor::tracker::{Interactor, Relation};

use super::{
    behavior::{InputAction, InteractOutcome, TriggeredBehavior},
    callbacks::{Callback, DisabledChangedFn, InteractableBindings, VisualCallbacks},
    errors::{CallbackKind, ConveyanceError},
    query::{CollisionResponse, PhysicalRepresentation, QueryTarget, QueryVolume},
    registry::InteractableId,
    ui_state::UiState,
};

/// Per-object conveyance state.
///
/// Constructed inert; `initialize` binds the id, query target and callbacks. Every visual
/// change goes through [`Interactable::set_ui_state`], which suppresses no-op writes.
#[derive(Debug, Default)]
pub struct Interactable {
    id: Option<InteractableId>,
    query_volume: Option<QueryVolume>,
    physical: Option<PhysicalRepresentation>,
    query_target: Option<QueryTarget>,
    collision: CollisionResponse,
    disabled: bool,
    ui_state: UiState,
    visuals: VisualCallbacks,
    behavior: TriggeredBehavior,
    actions: HashMap<InputAction, TriggeredBehavior>,
    on_disabled_changed: Callback<DisabledChangedFn>,
}

impl Interactable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds identity, query target and callbacks.
    ///
    /// Callbacks missing from `bindings` keep whatever was bound before. When both the
    /// default visual and the UI-state notification are bound afterwards, the default state
    /// is published right away from the perspective of `local`.
    pub fn initialize(
        &mut self,
        id: InteractableId,
        query_volume: Option<QueryVolume>,
        physical: Option<PhysicalRepresentation>,
        bindings: InteractableBindings,
        local: Option<&Interactor>,
    ) -> Result<(), ConveyanceError> {
        let Some(query_target) = QueryTarget::choose(query_volume.as_ref(), physical.as_ref())
        else {
            let error = ConveyanceError::MissingQueryTarget { id };
            error!("{}", error);
            return Err(error);
        };

        self.id = Some(id);
        self.query_volume = query_volume;
        self.physical = physical;
        self.query_target = Some(query_target);
        self.collision = CollisionResponse::for_disabled(self.disabled);

        self.visuals.rebind_from(bindings.visuals);
        self.behavior.rebind_from(bindings.behavior);
        self.on_disabled_changed.rebind_from(bindings.on_disabled_changed);

        if self.visuals.default.is_bound() && self.visuals.ui_state_changed.is_bound() {
            self.trigger_default_refresh(local);
        }
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.id.is_some()
    }

    pub fn id(&self) -> Option<&InteractableId> {
        self.id.as_ref()
    }

    pub fn ui_state(&self) -> &UiState {
        &self.ui_state
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn query_target(&self) -> Option<&QueryTarget> {
        self.query_target.as_ref()
    }

    pub fn query_volume(&self) -> Option<&QueryVolume> {
        self.query_volume.as_ref()
    }

    pub fn physical_representation(&self) -> Option<&PhysicalRepresentation> {
        self.physical.as_ref()
    }

    pub fn collision_response(&self) -> CollisionResponse {
        self.collision
    }

    /// Binds an extra behavior for a specific input, replacing any previous one for it.
    pub fn bind_action(&mut self, action: InputAction, behavior: TriggeredBehavior) {
        self.actions.insert(action, behavior);
    }

    pub fn trigger_hover(&mut self, instigator: Entity) -> UiState {
        let state = self.resolve_visual(CallbackKind::HoverVisual, instigator);
        self.set_ui_state(state)
    }

    /// Returns to the default visual, resolved for the local pawn rather than `instigator`.
    pub fn trigger_hover_end(&mut self, instigator: Entity, local_pawn: Option<Entity>) -> UiState {
        debug!("{} hover ended by {:?}", self.display_id(), instigator);
        let state = self.resolve_default(local_pawn);
        self.set_ui_state(state)
    }

    pub fn trigger_focus(&mut self, instigator: Entity) -> UiState {
        let state = self.resolve_visual(CallbackKind::FocusVisual, instigator);
        self.set_ui_state(state)
    }

    pub fn trigger_focus_end(&mut self, instigator: Entity, local_pawn: Option<Entity>) -> UiState {
        debug!("{} focus ended by {:?}", self.display_id(), instigator);
        let state = self.resolve_default(local_pawn);
        self.set_ui_state(state)
    }

    /// Reconciles the displayed state with what the local interactor actually holds.
    ///
    /// Focus is checked before candidacy; with neither, the default visual is resolved.
    pub fn trigger_default_refresh(&mut self, local: Option<&Interactor>) -> UiState {
        let relation = match (local, self.id.as_ref()) {
            (Some(interactor), Some(id)) => interactor.relation_to(id),
            _ => Relation::Unrelated,
        };
        match (relation, local) {
            (Relation::Focus, Some(interactor)) => self.trigger_focus(interactor.owner()),
            (Relation::Candidate, Some(interactor)) => self.trigger_hover(interactor.owner()),
            _ => {
                let state = self.resolve_default(local.map(Interactor::owner));
                self.set_ui_state(state)
            }
        }
    }

    /// Local prediction only; the authoritative peer's answer is the one that counts.
    pub fn can_interact(&self, interactor: Entity) -> bool {
        self.behavior.can_interact(self.id.as_ref(), interactor)
    }

    /// Authoritative attempt: fires `OnInteract` or `OnInteractFailed`, never both.
    pub fn try_interact(&self, interactor: Entity) -> InteractOutcome {
        let outcome = self.behavior.run(self.id.as_ref(), interactor);
        debug!(
            "{} interaction by {:?} {}",
            self.display_id(),
            interactor,
            outcome
        );
        outcome
    }

    /// Runs the behavior bound to `action`; `None` when nothing is bound for it.
    pub fn try_interact_action(
        &self,
        interactor: Entity,
        action: &InputAction,
    ) -> Option<InteractOutcome> {
        let Some(behavior) = self.actions.get(action) else {
            debug!("{} has no behavior bound for {}", self.display_id(), action);
            return None;
        };
        Some(behavior.run(self.id.as_ref(), interactor))
    }

    /// Writes the flag and derives local effects. Returns whether the value changed.
    ///
    /// Authority checks live in the registry; this is the shared effect path for both the
    /// authoritative write and the replicated arrival.
    pub(crate) fn apply_disabled(&mut self, disabled: bool, local: Option<&Interactor>) -> bool {
        if self.disabled == disabled {
            return false;
        }
        self.disabled = disabled;
        self.collision = CollisionResponse::for_disabled(disabled);

        match self.on_disabled_changed.get() {
            Some(notify) => notify(disabled),
            None => debug!(
                "{} disabled={} with no {} listener",
                self.display_id(),
                disabled,
                CallbackKind::OnDisabledChanged
            ),
        }

        self.trigger_default_refresh(local);
        true
    }

    /// The single choke point for visual-state mutation. Notifies only on an actual change.
    pub fn set_ui_state(&mut self, state: UiState) -> UiState {
        if self.ui_state == state {
            return self.ui_state.clone();
        }
        self.ui_state = state;
        match self.visuals.ui_state_changed.get() {
            Some(notify) => notify(&self.ui_state),
            None => error!(
                "{}",
                ConveyanceError::unbound(self.id.as_ref(), CallbackKind::OnUiStateChanged)
            ),
        }
        self.ui_state.clone()
    }

    fn resolve_visual(&self, kind: CallbackKind, instigator: Entity) -> UiState {
        let slot = match kind {
            CallbackKind::FocusVisual => &self.visuals.focus,
            _ => &self.visuals.hover,
        };
        match slot.get() {
            Some(resolve) => resolve(instigator),
            None => {
                error!("{}", ConveyanceError::unbound(self.id.as_ref(), kind));
                UiState::EMPTY
            }
        }
    }

    fn resolve_default(&self, local_pawn: Option<Entity>) -> UiState {
        match self.visuals.default.get() {
            Some(resolve) => resolve(local_pawn),
            None => {
                error!(
                    "{}",
                    ConveyanceError::unbound(self.id.as_ref(), CallbackKind::DefaultVisual)
                );
                UiState::EMPTY
            }
        }
    }

    fn display_id(&self) -> String {
        self.id
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "<uninitialized>".to_string())
    }
}
