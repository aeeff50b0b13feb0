//! Candidate discovery for the local agent: forward ray, cursor ray or volume overlap.
use bevy::{math::bounding::RayCast3d, prelude::*, window::PrimaryWindow};
use serde::Deserialize;

use crate::conveyance::{
    config::DiscoverySettings,
    registry::{InteractableId, Interactables},
};

use super::{
    components::{LocalPlayer, OverlapTracker},
    tracker::Interactor,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryMode {
    /// Forward ray from the agent every frame.
    #[default]
    Raycast,
    /// Begin/end overlap of the agent's position with query targets.
    Overlap,
    /// Ray from the primary window cursor through the agent's camera.
    Cursor,
}

/// Run condition selecting one discovery system.
pub fn discovery_mode_is(mode: DiscoveryMode) -> impl Fn(Res<DiscoverySettings>) -> bool {
    move |settings: Res<DiscoverySettings>| settings.mode == mode
}

/// Nearest blocking query target along `ray`, within `range`.
pub fn nearest_ray_hit(
    interactables: &Interactables,
    ray: Ray3d,
    range: f32,
    position_of: impl Fn(Entity) -> Option<Vec3>,
) -> Option<InteractableId> {
    let cast = RayCast3d::from_ray(ray, range);
    interactables
        .blocking_targets()
        .filter_map(|(id, target)| {
            let center = position_of(target.entity)?;
            let distance = target.shape.ray_hit_distance(center, &cast)?;
            Some((id, distance))
        })
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(id, _)| id.clone())
}

/// The blocking query target containing `point`; the closest centre wins when volumes nest.
pub fn containing_target(
    interactables: &Interactables,
    point: Vec3,
    position_of: impl Fn(Entity) -> Option<Vec3>,
) -> Option<InteractableId> {
    interactables
        .blocking_targets()
        .filter_map(|(id, target)| {
            let center = position_of(target.entity)?;
            target
                .shape
                .contains_point(center, point)
                .then(|| (id, center.distance_squared(point)))
        })
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(id, _)| id.clone())
}

fn apply_hit(
    interactor: &mut Mut<Interactor>,
    hit: Option<InteractableId>,
    interactables: &mut Interactables,
) {
    match hit {
        Some(id) if interactor.candidate() != Some(&id) => {
            interactor.set_candidate(&id, interactables);
        }
        Some(_) => {}
        None if interactor.candidate().is_some() => interactor.clear_candidate(interactables),
        None => {}
    }
}

pub fn discover_by_raycast(
    settings: Res<DiscoverySettings>,
    mut interactables: ResMut<Interactables>,
    mut agents: Query<(&GlobalTransform, &mut Interactor), With<LocalPlayer>>,
    transforms: Query<&GlobalTransform>,
) {
    let Ok((agent, mut interactor)) = agents.single_mut() else {
        return;
    };

    let ray = Ray3d::new(agent.translation(), agent.forward());
    let hit = nearest_ray_hit(&interactables, ray, settings.raycast_range, |entity| {
        transforms.get(entity).ok().map(GlobalTransform::translation)
    });
    apply_hit(&mut interactor, hit, &mut interactables);
}

pub fn discover_by_cursor(
    settings: Res<DiscoverySettings>,
    mut interactables: ResMut<Interactables>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut agents: Query<(&Camera, &GlobalTransform, &mut Interactor), With<LocalPlayer>>,
    transforms: Query<&GlobalTransform>,
) {
    let Ok((camera, camera_transform, mut interactor)) = agents.single_mut() else {
        return;
    };

    let ray = windows
        .single()
        .ok()
        .and_then(Window::cursor_position)
        .and_then(|cursor| camera.viewport_to_world(camera_transform, cursor).ok());
    let hit = ray.and_then(|ray| {
        nearest_ray_hit(&interactables, ray, settings.raycast_range, |entity| {
            transforms.get(entity).ok().map(GlobalTransform::translation)
        })
    });
    apply_hit(&mut interactor, hit, &mut interactables);
}

/// Treats a change of containing volume as end-overlap of the old one then begin-overlap of
/// the new one. End-overlap uses the guarded removal so a stale end never clears a newer
/// candidate.
pub fn discover_by_overlap(
    mut interactables: ResMut<Interactables>,
    mut agents: Query<(&GlobalTransform, &mut Interactor, &mut OverlapTracker), With<LocalPlayer>>,
    transforms: Query<&GlobalTransform>,
) {
    let Ok((agent, mut interactor, mut tracker)) = agents.single_mut() else {
        return;
    };

    let inside = containing_target(&interactables, agent.translation(), |entity| {
        transforms.get(entity).ok().map(GlobalTransform::translation)
    });
    if tracker.inside == inside {
        return;
    }

    if let Some(left) = tracker.inside.take() {
        interactor.remove_candidate(&left, &mut interactables);
    }
    if let Some(entered) = &inside {
        interactor.set_candidate(entered, &mut interactables);
    }
    tracker.inside = inside;
}
