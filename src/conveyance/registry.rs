//! Arena of interactables keyed by stable id, plus hit and owner correlation.
use std::{collections::HashMap, fmt};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{interactor::tracker::Interactor, replication::role::NetRole};

use super::{
    behavior::{InputAction, InteractOutcome},
    callbacks::InteractableBindings,
    errors::{AuthorityOperation, ConveyanceError},
    interactable::Interactable,
    query::{PhysicalRepresentation, QueryTarget, QueryVolume},
    ui_state::UiState,
};

/// Prefix of the correlation tag published for every query target.
pub const COMPONENT_ID_PREFIX: &str = "Interactions.Interactable.ComponentId";

/// Stable identifier of an interactable, unique within a registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InteractableId(String);

impl InteractableId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Correlation tag of the form `<prefix>_<id>`.
    pub fn tag(&self) -> String {
        format!("{}_{}", COMPONENT_ID_PREFIX, self.0)
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        tag.strip_prefix(COMPONENT_ID_PREFIX)
            .and_then(|rest| rest.strip_prefix('_'))
            .filter(|id| !id.is_empty())
            .map(Self::new)
    }
}

impl fmt::Display for InteractableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Attached to the world entity that owns an interactable; removing it releases the entry.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
#[require(ConveyedState)]
pub struct InteractableHandle(pub InteractableId);

/// Presentation mirror of an interactable's UI state, kept on the owning entity.
#[derive(Component, Debug, Clone, Default, PartialEq, Eq)]
pub struct ConveyedState(pub UiState);

struct Entry {
    owner: Entity,
    interactable: Interactable,
}

/// Every interactable known to this peer.
///
/// Interactors hold ids, never references; an id that no longer resolves is simply ignored.
#[derive(Resource)]
pub struct Interactables {
    role: NetRole,
    local_pawn: Option<Entity>,
    entries: HashMap<InteractableId, Entry>,
    by_owner: HashMap<Entity, Vec<InteractableId>>,
    by_query_target: HashMap<Entity, InteractableId>,
}

impl Interactables {
    pub fn new(role: NetRole) -> Self {
        Self {
            role,
            local_pawn: None,
            entries: HashMap::new(),
            by_owner: HashMap::new(),
            by_query_target: HashMap::new(),
        }
    }

    pub fn role(&self) -> NetRole {
        self.role
    }

    pub fn local_pawn(&self) -> Option<Entity> {
        self.local_pawn
    }

    pub fn set_local_pawn(&mut self, pawn: Option<Entity>) {
        self.local_pawn = pawn;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Creates the entry for `id` or re-initializes it with partial rebinding.
    pub fn initialize(
        &mut self,
        owner: Entity,
        id: InteractableId,
        query_volume: Option<QueryVolume>,
        physical: Option<PhysicalRepresentation>,
        bindings: InteractableBindings,
        local: Option<&Interactor>,
    ) -> Result<(), ConveyanceError> {
        if let Some(existing) = self.entries.get(&id) {
            if existing.owner != owner {
                return Err(ConveyanceError::DuplicateId { id });
            }
        }
        let requested_target = QueryTarget::choose(query_volume.as_ref(), physical.as_ref())
            .map(|target| target.entity);
        if let Some(target) = requested_target {
            let holder = self.by_query_target.get(&target);
            if let Some(holder) = holder.filter(|holder| **holder != id) {
                let error = ConveyanceError::SharedQueryTarget {
                    id,
                    target,
                    holder: holder.clone(),
                };
                warn!("{}", error);
                return Err(error);
            }
        }

        let previous_target = self
            .entries
            .get(&id)
            .and_then(|entry| entry.interactable.query_target())
            .map(|target| target.entity);

        let entry = self.entries.entry(id.clone()).or_insert_with(|| Entry {
            owner,
            interactable: Interactable::new(),
        });
        let result = entry
            .interactable
            .initialize(id.clone(), query_volume, physical, bindings, local);
        let target = entry.interactable.query_target().copied();
        let initialized = entry.interactable.is_initialized();

        if !initialized {
            self.entries.remove(&id);
            return result;
        }
        if let Some(previous) = previous_target {
            self.by_query_target.remove(&previous);
        }
        if let Some(QueryTarget { entity, .. }) = target {
            self.by_query_target.insert(entity, id.clone());
        }
        let owned = self.by_owner.entry(owner).or_default();
        if !owned.contains(&id) {
            owned.push(id.clone());
        }
        if result.is_ok() {
            info!("Interactable {} registered ({})", id, id.tag());
        }
        result
    }

    pub fn get(&self, id: &InteractableId) -> Option<&Interactable> {
        self.entries.get(id).map(|entry| &entry.interactable)
    }

    pub fn get_mut(&mut self, id: &InteractableId) -> Option<&mut Interactable> {
        self.entries.get_mut(id).map(|entry| &mut entry.interactable)
    }

    pub fn owner_of(&self, id: &InteractableId) -> Option<Entity> {
        self.entries.get(id).map(|entry| entry.owner)
    }

    /// Every id registered by `owner`, in registration order.
    pub fn ids_for_owner(&self, owner: Entity) -> &[InteractableId] {
        self.by_owner.get(&owner).map_or(&[], Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&InteractableId, &Interactable)> {
        self.entries
            .iter()
            .map(|(id, entry)| (id, &entry.interactable))
    }

    /// Maps a raw query hit back to its interactable. Entities that are not query targets
    /// never resolve, even when they belong to an interactable's owner.
    pub fn resolve_hit(&self, hit: Entity) -> Option<&InteractableId> {
        self.by_query_target.get(&hit)
    }

    /// Resolves a `<prefix>_<id>` correlation tag.
    pub fn resolve_tag(&self, tag: &str) -> Option<&InteractableId> {
        let id = InteractableId::from_tag(tag)?;
        self.entries.get_key_value(&id).map(|(key, _)| key)
    }

    /// Query targets currently accepting hits, for discovery mechanisms.
    pub fn blocking_targets(&self) -> impl Iterator<Item = (&InteractableId, &QueryTarget)> {
        self.entries.iter().filter_map(|(id, entry)| {
            let interactable = &entry.interactable;
            interactable
                .query_target()
                .filter(|_| interactable.collision_response().blocks())
                .map(|target| (id, target))
        })
    }

    pub fn trigger_hover(&mut self, id: &InteractableId, instigator: Entity) -> Option<UiState> {
        self.get_mut(id)
            .map(|interactable| interactable.trigger_hover(instigator))
    }

    pub fn trigger_hover_end(
        &mut self,
        id: &InteractableId,
        instigator: Entity,
    ) -> Option<UiState> {
        let local_pawn = self.local_pawn;
        self.get_mut(id)
            .map(|interactable| interactable.trigger_hover_end(instigator, local_pawn))
    }

    pub fn trigger_focus(&mut self, id: &InteractableId, instigator: Entity) -> Option<UiState> {
        self.get_mut(id)
            .map(|interactable| interactable.trigger_focus(instigator))
    }

    pub fn trigger_focus_end(
        &mut self,
        id: &InteractableId,
        instigator: Entity,
    ) -> Option<UiState> {
        let local_pawn = self.local_pawn;
        self.get_mut(id)
            .map(|interactable| interactable.trigger_focus_end(instigator, local_pawn))
    }

    pub fn refresh_default(
        &mut self,
        id: &InteractableId,
        local: Option<&Interactor>,
    ) -> Option<UiState> {
        self.get_mut(id)
            .map(|interactable| interactable.trigger_default_refresh(local))
    }

    /// Re-derives every interactable's default state, e.g. after the local pawn changed.
    pub fn refresh_all(&mut self, local: Option<&Interactor>) {
        for entry in self.entries.values_mut() {
            entry.interactable.trigger_default_refresh(local);
        }
    }

    /// Authoritative write of the disabled flag. Returns whether the value changed.
    pub fn request_set_disabled(
        &mut self,
        id: &InteractableId,
        disabled: bool,
        local: Option<&Interactor>,
    ) -> Result<bool, ConveyanceError> {
        if !self.role.is_authority() {
            return Err(ConveyanceError::NotAuthority {
                id: id.clone(),
                operation: AuthorityOperation::SetDisabled,
            });
        }
        let interactable = self
            .get_mut(id)
            .ok_or_else(|| ConveyanceError::UnknownInteractable { id: id.clone() })?;
        let changed = interactable.apply_disabled(disabled, local);
        if changed {
            info!("Interactable {} disabled set to {}", id, disabled);
        }
        Ok(changed)
    }

    /// Observer hook for a replicated disabled value; re-derives local effects only.
    pub fn apply_replicated_disabled(
        &mut self,
        id: &InteractableId,
        disabled: bool,
        local: Option<&Interactor>,
    ) -> Result<bool, ConveyanceError> {
        let interactable = self
            .get_mut(id)
            .ok_or_else(|| ConveyanceError::UnknownInteractable { id: id.clone() })?;
        let changed = interactable.apply_disabled(disabled, local);
        if changed {
            debug!("Interactable {} received replicated disabled={}", id, disabled);
        }
        Ok(changed)
    }

    /// Authoritative interaction attempt, optionally for a specific input action.
    ///
    /// `Ok(None)` means the action has no behavior bound on this interactable.
    pub fn try_interact(
        &self,
        id: &InteractableId,
        interactor: Entity,
        action: Option<&InputAction>,
    ) -> Result<Option<InteractOutcome>, ConveyanceError> {
        if !self.role.is_authority() {
            return Err(ConveyanceError::NotAuthority {
                id: id.clone(),
                operation: AuthorityOperation::TryInteract,
            });
        }
        let interactable = self
            .get(id)
            .ok_or_else(|| ConveyanceError::UnknownInteractable { id: id.clone() })?;
        Ok(match action {
            Some(action) => interactable.try_interact_action(interactor, action),
            None => Some(interactable.try_interact(interactor)),
        })
    }

    /// Drops every entry owned by `owner`. Interactor slots must already be cleared.
    pub fn remove_owner(&mut self, owner: Entity) -> Vec<InteractableId> {
        let ids = self.by_owner.remove(&owner).unwrap_or_default();
        for id in &ids {
            if let Some(entry) = self.entries.remove(id) {
                if let Some(target) = entry.interactable.query_target() {
                    self.by_query_target.remove(&target.entity);
                }
            }
            info!("Interactable {} released", id);
        }
        ids
    }
}

impl Default for Interactables {
    fn default() -> Self {
        Self::new(NetRole::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conveyance::{query::QueryShape, ui_state::examples};

    fn bindings() -> InteractableBindings {
        InteractableBindings::new()
            .with_hover_visual(|_| examples::HOVER)
            .with_focus_visual(|_| examples::FOCUS)
            .with_default_visual(|_| examples::NONE)
            .on_ui_state_changed(|_| {})
    }

    fn register(
        registry: &mut Interactables,
        world: &mut World,
        name: &str,
    ) -> (InteractableId, Entity, Entity) {
        let owner = world.spawn_empty().id();
        let volume = world.spawn_empty().id();
        let id = InteractableId::new(name);
        registry
            .initialize(
                owner,
                id.clone(),
                Some(QueryVolume {
                    entity: volume,
                    shape: QueryShape::sphere(1.0),
                }),
                None,
                bindings(),
                None,
            )
            .expect("initialize");
        (id, owner, volume)
    }

    #[test]
    fn correlation_tag_round_trips() {
        let id = InteractableId::new("door1");
        assert_eq!(id.tag(), "Interactions.Interactable.ComponentId_door1");
        assert_eq!(InteractableId::from_tag(&id.tag()), Some(id));
        assert_eq!(InteractableId::from_tag("Interactions.Interactable.ComponentId_"), None);
        assert_eq!(InteractableId::from_tag("Something.Else_door1"), None);
    }

    #[test]
    fn hits_resolve_only_through_query_targets() {
        let mut world = World::new();
        let mut registry = Interactables::new(NetRole::Authority);
        let (id, owner, volume) = register(&mut registry, &mut world, "door1");

        assert_eq!(registry.resolve_hit(volume), Some(&id));
        assert_eq!(registry.resolve_hit(owner), None);
        assert_eq!(registry.resolve_tag(&id.tag()), Some(&id));
        assert_eq!(registry.ids_for_owner(owner), &[id.clone()]);
        assert_eq!(registry.owner_of(&id), Some(owner));
        assert_eq!(registry.get(&id).map(|i| i.ui_state().clone()), Some(examples::NONE));
    }

    #[test]
    fn duplicate_id_from_another_owner_is_rejected() {
        let mut world = World::new();
        let mut registry = Interactables::new(NetRole::Authority);
        let (id, _, volume) = register(&mut registry, &mut world, "door1");
        let intruder = world.spawn_empty().id();

        let result = registry.initialize(
            intruder,
            id.clone(),
            Some(QueryVolume {
                entity: volume,
                shape: QueryShape::sphere(1.0),
            }),
            None,
            InteractableBindings::new(),
            None,
        );
        assert_eq!(result, Err(ConveyanceError::DuplicateId { id }));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn failed_first_initialize_leaves_no_entry() {
        let mut world = World::new();
        let mut registry = Interactables::new(NetRole::Authority);
        let owner = world.spawn_empty().id();
        let result = registry.initialize(
            owner,
            InteractableId::new("ghost"),
            None,
            None,
            bindings(),
            None,
        );
        assert!(matches!(result, Err(ConveyanceError::MissingQueryTarget { .. })));
        assert!(registry.is_empty());
        assert!(registry.ids_for_owner(owner).is_empty());
    }

    #[test]
    fn observers_cannot_write_disabled_or_interact() {
        let mut world = World::new();
        let pawn = world.spawn_empty().id();
        let mut registry = Interactables::new(NetRole::Observer);
        let (id, _, _) = register(&mut registry, &mut world, "door1");

        assert!(matches!(
            registry.request_set_disabled(&id, true, None),
            Err(ConveyanceError::NotAuthority { .. })
        ));
        assert!(matches!(
            registry.try_interact(&id, pawn, None),
            Err(ConveyanceError::NotAuthority { .. })
        ));
        assert_eq!(registry.apply_replicated_disabled(&id, true, None), Ok(true));
        assert!(registry.get(&id).is_some_and(Interactable::is_disabled));
    }

    #[test]
    fn disabled_targets_stop_blocking_queries() {
        let mut world = World::new();
        let mut registry = Interactables::new(NetRole::Authority);
        let (door, _, _) = register(&mut registry, &mut world, "door1");
        let (hatch, _, _) = register(&mut registry, &mut world, "hatch");

        assert_eq!(registry.blocking_targets().count(), 2);
        assert_eq!(registry.request_set_disabled(&door, true, None), Ok(true));
        assert_eq!(registry.request_set_disabled(&door, true, None), Ok(false));

        let blocking: Vec<_> = registry.blocking_targets().map(|(id, _)| id.clone()).collect();
        assert_eq!(blocking, vec![hatch]);
    }

    #[test]
    fn removing_owner_drops_all_correlations() {
        let mut world = World::new();
        let mut registry = Interactables::new(NetRole::Authority);
        let (id, owner, volume) = register(&mut registry, &mut world, "door1");

        assert_eq!(registry.remove_owner(owner), vec![id.clone()]);
        assert!(registry.get(&id).is_none());
        assert_eq!(registry.resolve_hit(volume), None);
        assert!(registry.remove_owner(owner).is_empty());
    }

    #[test]
    fn removing_owner_releases_every_interactable_it_registered() {
        let mut world = World::new();
        let mut registry = Interactables::new(NetRole::Authority);
        let (_, chest, _) = register(&mut registry, &mut world, "chest");
        let lid = InteractableId::new("lid");
        let lock = InteractableId::new("lock");
        let mut targets = Vec::new();
        for id in [&lid, &lock] {
            let target = world.spawn_empty().id();
            targets.push(target);
            registry
                .initialize(
                    chest,
                    id.clone(),
                    Some(QueryVolume {
                        entity: target,
                        shape: QueryShape::sphere(0.5),
                    }),
                    None,
                    bindings(),
                    None,
                )
                .expect("second interactable on the same owner");
        }
        assert_eq!(registry.owner_of(&lock), Some(chest));
        assert_eq!(registry.ids_for_owner(chest).len(), 3);

        let released = registry.remove_owner(chest);
        assert_eq!(released.len(), 3);
        assert!(released.contains(&lid) && released.contains(&lock));
        assert!(registry.is_empty());
        assert!(targets.iter().all(|target| registry.resolve_hit(*target).is_none()));
    }

    #[test]
    fn query_target_cannot_serve_two_interactables() {
        let mut world = World::new();
        let mut registry = Interactables::new(NetRole::Authority);
        let (door, _, volume) = register(&mut registry, &mut world, "door1");
        let frame = world.spawn_empty().id();

        let result = registry.initialize(
            frame,
            InteractableId::new("frame"),
            None,
            Some(PhysicalRepresentation {
                entity: volume,
                bounds: QueryShape::sphere(1.0),
            }),
            bindings(),
            None,
        );
        assert_eq!(
            result,
            Err(ConveyanceError::SharedQueryTarget {
                id: InteractableId::new("frame"),
                target: volume,
                holder: door.clone(),
            })
        );
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.resolve_hit(volume), Some(&door));
        assert!(registry.ids_for_owner(frame).is_empty());
    }

    #[test]
    fn listing_covers_every_registered_interactable() {
        let mut world = World::new();
        let mut registry = Interactables::new(NetRole::Authority);
        register(&mut registry, &mut world, "door1");
        register(&mut registry, &mut world, "door2");

        let mut ids: Vec<_> = registry.iter().map(|(id, _)| id.as_str().to_owned()).collect();
        ids.sort();
        assert_eq!(ids, ["door1", "door2"]);
    }

    #[test]
    fn unbound_action_reports_none() {
        let mut world = World::new();
        let pawn = world.spawn_empty().id();
        let mut registry = Interactables::new(NetRole::Authority);
        let (id, _, _) = register(&mut registry, &mut world, "door1");

        let outcome = registry
            .try_interact(&id, pawn, Some(&InputAction::from_static("Interactions.Input.Kick")))
            .expect("authority may interact");
        assert_eq!(outcome, None);
    }
}
