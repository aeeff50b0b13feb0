//! Bindable callback slots and the bindings bundle handed to `Initialize`.
use std::fmt;

use bevy::prelude::Entity;

use super::{behavior::TriggeredBehavior, ui_state::UiState};

pub type VisualFn = dyn Fn(Entity) -> UiState + Send + Sync;
/// Receives the local pawn, which may be absent on a dedicated authority.
pub type DefaultVisualFn = dyn Fn(Option<Entity>) -> UiState + Send + Sync;
pub type UiStateChangedFn = dyn Fn(&UiState) + Send + Sync;
pub type CanInteractFn = dyn Fn(Entity) -> bool + Send + Sync;
pub type InteractFn = dyn Fn(Entity) + Send + Sync;
pub type DisabledChangedFn = dyn Fn(bool) + Send + Sync;

/// A single optional function slot with an explicit "is it bound" query.
pub struct Callback<F: ?Sized> {
    inner: Option<Box<F>>,
}

impl<F: ?Sized> Callback<F> {
    pub fn bound(function: Box<F>) -> Self {
        Self {
            inner: Some(function),
        }
    }

    pub fn unbound() -> Self {
        Self { inner: None }
    }

    pub fn is_bound(&self) -> bool {
        self.inner.is_some()
    }

    pub fn get(&self) -> Option<&F> {
        self.inner.as_deref()
    }

    /// Takes `incoming` only when it is bound, keeping the previous binding otherwise.
    pub fn rebind_from(&mut self, incoming: Callback<F>) {
        if incoming.is_bound() {
            *self = incoming;
        }
    }
}

impl<F: ?Sized> Default for Callback<F> {
    fn default() -> Self {
        Self::unbound()
    }
}

impl<F: ?Sized> fmt::Debug for Callback<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.is_bound() { "bound" } else { "unbound" })
    }
}

/// Visual resolution and presentation hooks of an interactable.
#[derive(Debug, Default)]
pub struct VisualCallbacks {
    pub hover: Callback<VisualFn>,
    pub focus: Callback<VisualFn>,
    pub default: Callback<DefaultVisualFn>,
    pub ui_state_changed: Callback<UiStateChangedFn>,
}

impl VisualCallbacks {
    pub fn rebind_from(&mut self, incoming: VisualCallbacks) {
        self.hover.rebind_from(incoming.hover);
        self.focus.rebind_from(incoming.focus);
        self.default.rebind_from(incoming.default);
        self.ui_state_changed.rebind_from(incoming.ui_state_changed);
    }
}

/// Every recognized option an interactable accepts at initialization.
///
/// All slots are optional here; the call path that needs one reports it when missing.
#[derive(Debug, Default)]
pub struct InteractableBindings {
    pub visuals: VisualCallbacks,
    pub behavior: TriggeredBehavior,
    pub on_disabled_changed: Callback<DisabledChangedFn>,
}

impl InteractableBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hover_visual(
        mut self,
        resolve: impl Fn(Entity) -> UiState + Send + Sync + 'static,
    ) -> Self {
        self.visuals.hover = Callback::bound(Box::new(resolve));
        self
    }

    pub fn with_focus_visual(
        mut self,
        resolve: impl Fn(Entity) -> UiState + Send + Sync + 'static,
    ) -> Self {
        self.visuals.focus = Callback::bound(Box::new(resolve));
        self
    }

    pub fn with_default_visual(
        mut self,
        resolve: impl Fn(Option<Entity>) -> UiState + Send + Sync + 'static,
    ) -> Self {
        self.visuals.default = Callback::bound(Box::new(resolve));
        self
    }

    pub fn on_ui_state_changed(
        mut self,
        notify: impl Fn(&UiState) + Send + Sync + 'static,
    ) -> Self {
        self.visuals.ui_state_changed = Callback::bound(Box::new(notify));
        self
    }

    pub fn with_can_interact(
        mut self,
        decide: impl Fn(Entity) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.behavior = self.behavior.with_can_interact(decide);
        self
    }

    pub fn on_interact(mut self, notify: impl Fn(Entity) + Send + Sync + 'static) -> Self {
        self.behavior = self.behavior.on_succeeded(notify);
        self
    }

    pub fn on_interact_failed(mut self, notify: impl Fn(Entity) + Send + Sync + 'static) -> Self {
        self.behavior = self.behavior.on_failed(notify);
        self
    }

    pub fn on_disabled_changed(mut self, notify: impl Fn(bool) + Send + Sync + 'static) -> Self {
        self.on_disabled_changed = Callback::bound(Box::new(notify));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conveyance::ui_state::examples;

    #[test]
    fn rebinding_keeps_slots_that_are_not_supplied() {
        let mut visuals = VisualCallbacks::default();
        visuals.hover = Callback::bound(Box::new(|_| examples::HOVER));
        assert!(!visuals.default.is_bound());

        let mut incoming = VisualCallbacks::default();
        incoming.default = Callback::bound(Box::new(|_| examples::NONE));
        visuals.rebind_from(incoming);

        assert!(visuals.hover.is_bound());
        assert!(visuals.default.is_bound());
        assert!(!visuals.focus.is_bound());
        let resolve = visuals.default.get().expect("default should be bound");
        assert_eq!(resolve(None), examples::NONE);
    }

    #[test]
    fn debug_output_hides_closures() {
        let bindings = InteractableBindings::new().with_hover_visual(|_| examples::HOVER);
        let rendered = format!("{:?}", bindings);
        assert!(rendered.contains("hover: bound"));
        assert!(rendered.contains("focus: unbound"));
    }
}
