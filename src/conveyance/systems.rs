use bevy::prelude::*;

use crate::interactor::{components::LocalPlayer, tracker::Interactor};

use super::registry::{ConveyedState, InteractableHandle, Interactables};

/// Keeps the registry's notion of the local pawn in step with the `LocalPlayer` marker.
/// A changed pawn re-derives every default state against the new relations.
pub fn sync_local_pawn(
    mut interactables: ResMut<Interactables>,
    local: Query<(Entity, &Interactor), With<LocalPlayer>>,
) {
    let (pawn, interactor) = match local.single() {
        Ok((pawn, interactor)) => (Some(pawn), Some(interactor)),
        Err(_) => (None, None),
    };
    if interactables.local_pawn() == pawn {
        return;
    }

    info!("Local pawn changed to {:?}", pawn);
    interactables.set_local_pawn(pawn);
    interactables.refresh_all(interactor);
}

/// Mirrors each interactable's UI state onto its owning entity for presentation.
pub fn sync_conveyed_state(
    interactables: Res<Interactables>,
    mut owners: Query<(&InteractableHandle, &mut ConveyedState)>,
) {
    if !interactables.is_changed() {
        return;
    }

    for (handle, mut conveyed) in &mut owners {
        let Some(interactable) = interactables.get(&handle.0) else {
            continue;
        };
        if conveyed.0 != *interactable.ui_state() {
            conveyed.0 = interactable.ui_state().clone();
        }
    }
}
