//! Per-agent candidate/focus tracking.
//!
//! All mutation of the two slots goes through the operations below, so an interactable can
//! only be told it is hovered or focused by passing through `set_*`, which ends the previous
//! holder first.
use bevy::prelude::*;

use crate::conveyance::registry::{InteractableId, Interactables};

/// How an interactor currently regards a given interactable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Focus,
    Candidate,
    Unrelated,
}

#[derive(Component, Debug, Clone)]
pub struct Interactor {
    owner: Entity,
    candidate: Option<InteractableId>,
    focus: Option<InteractableId>,
}

impl Interactor {
    pub fn new(owner: Entity) -> Self {
        Self {
            owner,
            candidate: None,
            focus: None,
        }
    }

    pub fn owner(&self) -> Entity {
        self.owner
    }

    pub fn candidate(&self) -> Option<&InteractableId> {
        self.candidate.as_ref()
    }

    pub fn focus(&self) -> Option<&InteractableId> {
        self.focus.as_ref()
    }

    /// Focus wins when the interactable is both focus and candidate.
    pub fn relation_to(&self, id: &InteractableId) -> Relation {
        if self.focus.as_ref() == Some(id) {
            Relation::Focus
        } else if self.candidate.as_ref() == Some(id) {
            Relation::Candidate
        } else {
            Relation::Unrelated
        }
    }

    /// Ends the previous candidate, then hovers `new`. Re-setting the current candidate is a no-op.
    pub fn set_candidate(&mut self, new: &InteractableId, interactables: &mut Interactables) {
        if self.candidate.as_ref() == Some(new) {
            return;
        }
        if let Some(old) = self.candidate.take() {
            interactables.trigger_hover_end(&old, self.owner);
        }
        if interactables.trigger_hover(new, self.owner).is_some() {
            self.candidate = Some(new.clone());
        } else {
            warn!("Interactor {:?} ignored unknown candidate {}", self.owner, new);
        }
    }

    /// Clears the candidate only if it is still `expected_old`; stale end events are absorbed.
    pub fn remove_candidate(
        &mut self,
        expected_old: &InteractableId,
        interactables: &mut Interactables,
    ) {
        if self.candidate.as_ref() != Some(expected_old) {
            debug!(
                "Interactor {:?} absorbed stale candidate end for {}",
                self.owner, expected_old
            );
            return;
        }
        self.candidate = None;
        interactables.trigger_hover_end(expected_old, self.owner);
    }

    pub fn clear_candidate(&mut self, interactables: &mut Interactables) {
        if let Some(old) = self.candidate.take() {
            interactables.trigger_hover_end(&old, self.owner);
        }
    }

    pub fn set_focus(&mut self, new: &InteractableId, interactables: &mut Interactables) {
        if self.focus.as_ref() == Some(new) {
            return;
        }
        if let Some(old) = self.focus.take() {
            interactables.trigger_focus_end(&old, self.owner);
        }
        if interactables.trigger_focus(new, self.owner).is_some() {
            self.focus = Some(new.clone());
        } else {
            warn!("Interactor {:?} ignored unknown focus {}", self.owner, new);
        }
    }

    pub fn remove_focus(
        &mut self,
        expected_old: &InteractableId,
        interactables: &mut Interactables,
    ) {
        if self.focus.as_ref() != Some(expected_old) {
            debug!(
                "Interactor {:?} absorbed stale focus end for {}",
                self.owner, expected_old
            );
            return;
        }
        self.focus = None;
        interactables.trigger_focus_end(expected_old, self.owner);
    }

    pub fn clear_focus(&mut self, interactables: &mut Interactables) {
        if let Some(old) = self.focus.take() {
            interactables.trigger_focus_end(&old, self.owner);
        }
    }

    /// Nulls any slot referencing `id` without triggering transitions on it.
    /// Used while the interactable is being destroyed.
    pub fn release(&mut self, id: &InteractableId) -> bool {
        let mut released = false;
        if self.candidate.as_ref() == Some(id) {
            self.candidate = None;
            released = true;
        }
        if self.focus.as_ref() == Some(id) {
            self.focus = None;
            released = true;
        }
        released
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    };

    use super::*;
    use crate::{
        conveyance::{
            callbacks::InteractableBindings,
            query::{QueryShape, QueryVolume},
            ui_state::{examples, UiState},
        },
        replication::role::NetRole,
    };

    type Journal = Arc<Mutex<Vec<(InteractableId, UiState)>>>;

    struct Fixture {
        world: World,
        registry: Interactables,
        journal: Journal,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                world: World::new(),
                registry: Interactables::new(NetRole::Authority),
                journal: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn pawn(&mut self) -> Entity {
            self.world.spawn_empty().id()
        }

        fn door(&mut self, name: &str, focus_visual: UiState) -> InteractableId {
            let id = InteractableId::new(name);
            let owner = self.world.spawn_empty().id();
            let volume = self.world.spawn_empty().id();
            let journal = self.journal.clone();
            let journal_id = id.clone();
            self.registry
                .initialize(
                    owner,
                    id.clone(),
                    Some(QueryVolume {
                        entity: volume,
                        shape: QueryShape::sphere(1.0),
                    }),
                    None,
                    InteractableBindings::new()
                        .with_hover_visual(|_| UiState::from_static("Hover"))
                        .with_focus_visual(move |_| focus_visual.clone())
                        .with_default_visual(|_| UiState::from_static("None"))
                        .on_ui_state_changed(move |state| {
                            journal
                                .lock()
                                .expect("journal poisoned")
                                .push((journal_id.clone(), state.clone()))
                        }),
                    None,
                )
                .expect("initialize");
            self.journal.lock().unwrap().clear();
            id
        }

        fn ui_state(&self, id: &InteractableId) -> UiState {
            self.registry
                .get(id)
                .map(|interactable| interactable.ui_state().clone())
                .unwrap_or_default()
        }

        fn hover_notifications(&self, id: &InteractableId) -> usize {
            self.journal
                .lock()
                .unwrap()
                .iter()
                .filter(|(who, state)| who == id && state.as_str() == "Hover")
                .count()
        }
    }

    #[test]
    fn repeated_set_candidate_hovers_once() {
        let mut fixture = Fixture::new();
        let pawn = fixture.pawn();
        let door = fixture.door("door1", examples::FOCUS);
        let mut interactor = Interactor::new(pawn);

        interactor.set_candidate(&door, &mut fixture.registry);
        interactor.set_candidate(&door, &mut fixture.registry);

        assert_eq!(fixture.hover_notifications(&door), 1);
        assert_eq!(interactor.candidate(), Some(&door));
    }

    #[test]
    fn switching_candidate_ends_old_before_hovering_new() {
        let mut fixture = Fixture::new();
        let pawn = fixture.pawn();
        let first = fixture.door("door1", examples::FOCUS);
        let second = fixture.door("door2", examples::FOCUS);
        let mut interactor = Interactor::new(pawn);

        interactor.set_candidate(&first, &mut fixture.registry);
        interactor.set_candidate(&second, &mut fixture.registry);

        let journal = fixture.journal.lock().unwrap().clone();
        assert_eq!(
            journal,
            vec![
                (first.clone(), UiState::from_static("Hover")),
                (first.clone(), UiState::from_static("None")),
                (second.clone(), UiState::from_static("Hover")),
            ]
        );
        let hovered: Vec<_> = [&first, &second]
            .into_iter()
            .filter(|id| fixture.ui_state(id).as_str() == "Hover")
            .collect();
        assert_eq!(hovered, vec![&second]);
    }

    #[test]
    fn stale_remove_is_absorbed() {
        let mut fixture = Fixture::new();
        let pawn = fixture.pawn();
        let x = fixture.door("x", examples::FOCUS);
        let y = fixture.door("y", examples::FOCUS);
        let mut interactor = Interactor::new(pawn);

        interactor.set_candidate(&y, &mut fixture.registry);
        fixture.journal.lock().unwrap().clear();

        interactor.remove_candidate(&x, &mut fixture.registry);

        assert_eq!(interactor.candidate(), Some(&y));
        assert!(fixture.journal.lock().unwrap().is_empty());
        assert_eq!(fixture.ui_state(&y).as_str(), "Hover");
    }

    #[test]
    fn clear_candidate_always_empties_the_slot() {
        let mut fixture = Fixture::new();
        let pawn = fixture.pawn();
        let door = fixture.door("door1", examples::FOCUS);
        let mut interactor = Interactor::new(pawn);

        interactor.clear_candidate(&mut fixture.registry);
        assert!(interactor.candidate().is_none());
        assert!(fixture.journal.lock().unwrap().is_empty());

        interactor.set_candidate(&door, &mut fixture.registry);
        interactor.clear_candidate(&mut fixture.registry);
        assert!(interactor.candidate().is_none());
        assert_eq!(fixture.ui_state(&door).as_str(), "None");
    }

    #[test]
    fn unknown_candidate_is_not_stored() {
        let mut fixture = Fixture::new();
        let pawn = fixture.pawn();
        let door = fixture.door("door1", examples::FOCUS);
        let mut interactor = Interactor::new(pawn);

        interactor.set_candidate(&door, &mut fixture.registry);
        interactor.set_candidate(&InteractableId::new("missing"), &mut fixture.registry);

        assert!(interactor.candidate().is_none());
        assert_eq!(fixture.ui_state(&door).as_str(), "None");
    }

    #[test]
    fn scenario_a_hover_then_remove() {
        let mut fixture = Fixture::new();
        let pawn = fixture.pawn();
        let door = fixture.door("door1", examples::FOCUS);
        let mut interactor = Interactor::new(pawn);
        fixture.registry.set_local_pawn(Some(pawn));

        interactor.set_candidate(&door, &mut fixture.registry);
        assert_eq!(fixture.ui_state(&door).as_str(), "Hover");

        interactor.remove_candidate(&door, &mut fixture.registry);
        assert_eq!(fixture.ui_state(&door).as_str(), "None");
    }

    #[test]
    fn scenario_b_disabling_keeps_focus() {
        let mut fixture = Fixture::new();
        let pawn = fixture.pawn();
        let owner = fixture.pawn();
        let volume = fixture.pawn();
        let door = InteractableId::new("door1");
        let disabled = Arc::new(AtomicBool::new(false));
        let focus_reads = disabled.clone();
        let disabled_writes = disabled.clone();
        fixture
            .registry
            .initialize(
                owner,
                door.clone(),
                Some(QueryVolume {
                    entity: volume,
                    shape: QueryShape::sphere(1.0),
                }),
                None,
                InteractableBindings::new()
                    .with_focus_visual(move |_| {
                        if focus_reads.load(Ordering::SeqCst) {
                            UiState::from_static("FocusDisabled")
                        } else {
                            UiState::from_static("Focus")
                        }
                    })
                    .with_default_visual(|_| UiState::from_static("None"))
                    .on_ui_state_changed(|_| {})
                    .on_disabled_changed(move |value| {
                        disabled_writes.store(value, Ordering::SeqCst)
                    }),
                None,
            )
            .expect("initialize");
        let mut interactor = Interactor::new(pawn);
        fixture.registry.set_local_pawn(Some(pawn));

        interactor.set_focus(&door, &mut fixture.registry);
        assert_eq!(fixture.ui_state(&door).as_str(), "Focus");

        let changed = fixture
            .registry
            .request_set_disabled(&door, true, Some(&interactor))
            .expect("authority write");

        assert!(changed);
        assert_eq!(interactor.focus(), Some(&door));
        assert_eq!(fixture.ui_state(&door).as_str(), "FocusDisabled");
    }

    #[test]
    fn scenario_c_independent_interactors_share_one_visual() {
        let mut fixture = Fixture::new();
        let pawn_a = fixture.pawn();
        let pawn_b = fixture.pawn();
        let door = fixture.door("door1", examples::FOCUS);
        let mut a = Interactor::new(pawn_a);
        let mut b = Interactor::new(pawn_b);
        fixture.registry.set_local_pawn(Some(pawn_a));

        a.set_candidate(&door, &mut fixture.registry);
        b.set_candidate(&door, &mut fixture.registry);
        assert_eq!(fixture.hover_notifications(&door), 1);

        a.remove_candidate(&door, &mut fixture.registry);

        assert!(a.candidate().is_none());
        assert_eq!(b.candidate(), Some(&door));
        // The last writer wins the shared visual even though B still regards it as candidate.
        assert_eq!(fixture.ui_state(&door).as_str(), "None");
    }

    #[test]
    fn last_trigger_wins_between_hover_and_focus() {
        let mut fixture = Fixture::new();
        let pawn = fixture.pawn();
        let door = fixture.door("door1", examples::FOCUS);
        let mut interactor = Interactor::new(pawn);
        fixture.registry.set_local_pawn(Some(pawn));

        interactor.set_focus(&door, &mut fixture.registry);
        assert_eq!(fixture.ui_state(&door), examples::FOCUS);

        interactor.set_candidate(&door, &mut fixture.registry);
        assert_eq!(fixture.ui_state(&door).as_str(), "Hover");

        // Ending hover returns to default even though focus is still held.
        interactor.clear_candidate(&mut fixture.registry);
        assert_eq!(fixture.ui_state(&door).as_str(), "None");
        assert_eq!(interactor.focus(), Some(&door));

        // A refresh reconciles with the real relationship.
        fixture.registry.refresh_default(&door, Some(&interactor));
        assert_eq!(fixture.ui_state(&door), examples::FOCUS);
    }

    #[test]
    fn focus_of_one_and_candidate_of_another() {
        let mut fixture = Fixture::new();
        let pawn_a = fixture.pawn();
        let pawn_b = fixture.pawn();
        let door = fixture.door("door1", examples::FOCUS);
        let mut a = Interactor::new(pawn_a);
        let mut b = Interactor::new(pawn_b);
        fixture.registry.set_local_pawn(Some(pawn_a));

        a.set_focus(&door, &mut fixture.registry);
        b.set_candidate(&door, &mut fixture.registry);

        assert_eq!(a.relation_to(&door), Relation::Focus);
        assert_eq!(b.relation_to(&door), Relation::Candidate);
        assert_eq!(fixture.ui_state(&door).as_str(), "Hover");

        b.clear_candidate(&mut fixture.registry);
        fixture.registry.refresh_default(&door, Some(&a));
        assert_eq!(fixture.ui_state(&door), examples::FOCUS);
    }

    #[test]
    fn focus_operations_mirror_candidate_operations() {
        let mut fixture = Fixture::new();
        let pawn = fixture.pawn();
        let first = fixture.door("door1", examples::FOCUS);
        let second = fixture.door("door2", examples::FOCUS);
        let mut interactor = Interactor::new(pawn);

        interactor.set_focus(&first, &mut fixture.registry);
        interactor.set_focus(&second, &mut fixture.registry);
        assert_eq!(fixture.ui_state(&first).as_str(), "None");
        assert_eq!(fixture.ui_state(&second), examples::FOCUS);

        interactor.remove_focus(&first, &mut fixture.registry);
        assert_eq!(interactor.focus(), Some(&second));

        interactor.remove_focus(&second, &mut fixture.registry);
        assert!(interactor.focus().is_none());
        assert_eq!(fixture.ui_state(&second).as_str(), "None");
    }

    #[test]
    fn release_nulls_slots_without_transitions() {
        let mut fixture = Fixture::new();
        let pawn = fixture.pawn();
        let door = fixture.door("door1", examples::FOCUS);
        let mut interactor = Interactor::new(pawn);
        interactor.set_candidate(&door, &mut fixture.registry);
        interactor.set_focus(&door, &mut fixture.registry);
        fixture.journal.lock().unwrap().clear();

        assert!(interactor.release(&door));
        assert!(interactor.candidate().is_none());
        assert!(interactor.focus().is_none());
        assert!(fixture.journal.lock().unwrap().is_empty());
        assert!(!interactor.release(&door));
    }
}
