//! Lifecycle systems for interactors.
use bevy::prelude::*;

use crate::conveyance::registry::{InteractableHandle, Interactables};

use super::tracker::Interactor;

/// Releases every interactable whose owning entity lost its handle (usually by despawning).
///
/// Every interactor slot naming the released id is nulled first, without end transitions,
/// then the registry entry is dropped, so no interactor is ever left holding a dangling id.
pub fn release_destroyed_interactables(
    mut removed: RemovedComponents<InteractableHandle>,
    mut interactables: ResMut<Interactables>,
    mut interactors: Query<&mut Interactor>,
) {
    for owner in removed.read() {
        let ids = interactables.ids_for_owner(owner).to_vec();
        if ids.is_empty() {
            continue;
        }
        for mut interactor in &mut interactors {
            for id in &ids {
                if interactor.candidate() == Some(id) || interactor.focus() == Some(id) {
                    interactor.release(id);
                    debug!(
                        "Interactor {:?} released {} during destruction",
                        interactor.owner(),
                        id
                    );
                }
            }
        }
        interactables.remove_owner(owner);
    }
}

#[cfg(feature = "conveyance_debug")]
#[derive(Resource)]
pub(crate) struct DebugTickTimer {
    timer: Timer,
}

#[cfg(feature = "conveyance_debug")]
impl Default for DebugTickTimer {
    fn default() -> Self {
        Self {
            timer: Timer::from_seconds(1.0, TimerMode::Repeating),
        }
    }
}

#[cfg(feature = "conveyance_debug")]
pub(crate) fn log_local_interactor(
    time: Res<Time>,
    mut timer: ResMut<DebugTickTimer>,
    interactables: Res<Interactables>,
    local: Query<&Interactor, With<super::components::LocalPlayer>>,
) {
    if !timer.timer.tick(time.delta()).just_finished() {
        return;
    }
    let Ok(interactor) = local.single() else {
        return;
    };
    info!(
        target: "conveyance_debug",
        "role: {} | candidate: {} | focus: {} | registered: {}",
        interactables.role(),
        interactor.candidate().map_or("-", |id| id.as_str()),
        interactor.focus().map_or("-", |id| id.as_str()),
        interactables.len(),
    );
}
