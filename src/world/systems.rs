//! Systems for the demo world.
use std::sync::Arc;

use bevy::{
    ecs::message::MessageReader,
    input::{mouse::MouseMotion, ButtonInput},
    math::primitives::Plane3d,
    prelude::*,
    window::{CursorGrabMode, CursorOptions},
};
use interaction_conveyance::{
    conveyance::{
        behavior::{InputAction, TriggeredBehavior},
        callbacks::InteractableBindings,
        query::{PhysicalRepresentation, QueryShape, QueryVolume},
        registry::{ConveyedState, InteractableHandle, InteractableId, Interactables},
        ui_state::{examples, UiState},
    },
    interactor::{components::LocalPlayer, tracker::Interactor},
    replication::packets::ReplicationOutbox,
};

use crate::world::components::{Door, DoorState, FlyCamera, RestingColor};

const GROUND_SCALE: f32 = 40.0;
const CAMERA_START_POS: Vec3 = Vec3::new(0.0, 1.6, 5.0);
const DOOR_SIZE: Vec3 = Vec3::new(1.2, 2.2, 0.15);
const DOOR_SPACING: f32 = 3.0;
const DOOR_OPEN_ANGLE: f32 = 1.4;
const CRATE_SIZE: f32 = 0.9;

pub const INSPECT_ACTION: InputAction = InputAction::from_static("Interactions.Input.Inspect");

/// Spawns the initial scene: ground plane, light, and a fly camera acting as the local pawn.
pub fn spawn_world_environment(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        Mesh3d(meshes.add(Mesh::from(Plane3d::default()))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb_u8(90, 140, 90),
            perceptual_roughness: 0.9,
            metallic: 0.0,
            ..default()
        })),
        Transform::from_scale(Vec3::splat(GROUND_SCALE)),
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 12_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(8.0, 16.0, 8.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let mut camera_transform = Transform::from_translation(CAMERA_START_POS);
    camera_transform.look_at(Vec3::new(0.0, 1.1, 0.0), Vec3::Y);
    let (yaw, pitch) = yaw_pitch_from_transform(&camera_transform);

    let pawn = commands
        .spawn((
            Camera3d::default(),
            camera_transform,
            FlyCamera::new(yaw, pitch),
            LocalPlayer,
            Name::new("Local Pawn"),
        ))
        .id();
    commands.entity(pawn).insert(Interactor::new(pawn));
}

/// Spawns three doors with query volumes and a crate discovered through its own body.
pub fn spawn_interactables(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut interactables: ResMut<Interactables>,
) {
    let door_mesh = meshes.add(Cuboid::from_size(DOOR_SIZE));
    let door_color = Color::srgb_u8(120, 80, 50);

    for (index, state) in [DoorState::default(), DoorState::locked(), DoorState::default()]
        .into_iter()
        .enumerate()
    {
        let id = InteractableId::new(format!("door{}", index + 1));
        let state = Arc::new(state);
        let x = (index as f32 - 1.0) * DOOR_SPACING;
        let transform = Transform::from_xyz(x, DOOR_SIZE.y * 0.5, 0.0);

        let owner = commands
            .spawn((
                Mesh3d(door_mesh.clone()),
                MeshMaterial3d(materials.add(StandardMaterial {
                    base_color: door_color,
                    perceptual_roughness: 0.7,
                    ..default()
                })),
                transform,
                Door {
                    state: state.clone(),
                    closed_rotation: transform.rotation,
                },
                RestingColor(door_color),
                InteractableHandle(id.clone()),
                Name::new(format!("Door {}", index + 1)),
            ))
            .id();
        // The volume stays put while the door swings, so an open door is still reachable.
        let volume = commands
            .spawn((
                Transform::from_xyz(x, DOOR_SIZE.y * 0.5, 0.0),
                Name::new(format!("Door {} Query Volume", index + 1)),
            ))
            .id();

        let result = interactables.initialize(
            owner,
            id.clone(),
            Some(QueryVolume {
                entity: volume,
                shape: QueryShape::cuboid(Vec3::new(0.9, 1.2, 0.6)),
            }),
            None,
            door_bindings(id.clone(), state),
            None,
        );
        if let Err(err) = result {
            error!("Door {} failed to initialize: {}", id, err);
        }
    }

    let crate_color = Color::srgb_u8(160, 130, 70);
    let crate_id = InteractableId::new("crate");
    let crate_entity = commands
        .spawn((
            Mesh3d(meshes.add(Cuboid::from_length(CRATE_SIZE))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: crate_color,
                ..default()
            })),
            Transform::from_xyz(5.0, CRATE_SIZE * 0.5, 0.0),
            RestingColor(crate_color),
            InteractableHandle(crate_id.clone()),
            Name::new("Crate"),
        ))
        .id();

    let result = interactables.initialize(
        crate_entity,
        crate_id.clone(),
        None,
        Some(PhysicalRepresentation {
            entity: crate_entity,
            bounds: QueryShape::cuboid(Vec3::splat(CRATE_SIZE * 0.5)),
        }),
        crate_bindings(crate_id.clone()),
        None,
    );
    match result {
        Ok(()) => {
            let inspect = TriggeredBehavior::new()
                .with_can_interact(|_| true)
                .on_succeeded(|instigator| {
                    info!("{:?} inspects the crate: it is empty", instigator)
                });
            if let Some(interactable) = interactables.get_mut(&crate_id) {
                interactable.bind_action(INSPECT_ACTION, inspect);
            }
        }
        Err(err) => error!("Crate failed to initialize: {}", err),
    }
}

fn door_bindings(id: InteractableId, state: Arc<DoorState>) -> InteractableBindings {
    let hover_state = state.clone();
    let default_state = state.clone();
    let can_state = state.clone();
    let open_state = state.clone();
    let failed_id = id.clone();
    let changed_id = id;

    InteractableBindings::new()
        .with_hover_visual(move |_| {
            if hover_state.is_locked() {
                examples::INVALID
            } else {
                examples::HOVER
            }
        })
        .with_focus_visual(|_| examples::FOCUS)
        .with_default_visual(move |_| {
            if default_state.is_disabled() {
                examples::DISABLED
            } else {
                examples::NONE
            }
        })
        .on_ui_state_changed(move |ui_state: &UiState| {
            debug!("{} now conveys {}", changed_id, ui_state);
        })
        .with_can_interact(move |_| !can_state.is_locked())
        .on_interact(move |instigator| {
            let open = open_state.toggle_open();
            info!(
                "{:?} {} the door",
                instigator,
                if open { "opens" } else { "closes" }
            );
        })
        .on_interact_failed(move |instigator| {
            info!("{:?} rattles {} but it is locked", instigator, failed_id);
        })
        .on_disabled_changed(move |disabled| state.set_disabled(disabled))
}

fn crate_bindings(id: InteractableId) -> InteractableBindings {
    InteractableBindings::new()
        .with_hover_visual(|_| examples::CALLOUT)
        .with_focus_visual(|_| examples::FOCUS)
        .with_default_visual(|_| examples::NONE)
        .on_ui_state_changed(move |ui_state: &UiState| {
            debug!("{} now conveys {}", id, ui_state);
        })
        .with_can_interact(|_| true)
        .on_interact(|instigator| info!("{:?} pushes the crate", instigator))
}

/// Swings doors toward their open or closed pose.
pub fn swing_doors(time: Res<Time>, mut doors: Query<(&Door, &mut Transform)>) {
    for (door, mut transform) in &mut doors {
        let target = if door.state.is_open() {
            door.closed_rotation * Quat::from_rotation_y(DOOR_OPEN_ANGLE)
        } else {
            door.closed_rotation
        };
        let blend = (time.delta_secs() * 6.0).min(1.0);
        transform.rotation = transform.rotation.slerp(target, blend);
    }
}

/// Paints owners according to the UI state they currently convey.
pub fn paint_conveyed_state(
    mut materials: ResMut<Assets<StandardMaterial>>,
    owners: Query<
        (
            &ConveyedState,
            &RestingColor,
            &MeshMaterial3d<StandardMaterial>,
        ),
        Changed<ConveyedState>,
    >,
) {
    for (conveyed, resting, material) in &owners {
        if let Some(material) = materials.get_mut(&material.0) {
            material.base_color = color_for(&conveyed.0, resting.0);
        }
    }
}

fn color_for(state: &UiState, resting: Color) -> Color {
    if state.is_child_of(&examples::FOCUS) {
        Color::srgb(0.3, 0.8, 0.9)
    } else if state.is_child_of(&examples::HOVER) {
        Color::srgb(0.95, 0.85, 0.3)
    } else if state.is_child_of(&examples::CALLOUT) {
        Color::srgb(0.95, 0.6, 0.2)
    } else if state.is_child_of(&examples::INVALID) {
        Color::srgb(0.85, 0.25, 0.2)
    } else if state.is_child_of(&examples::DISABLED) {
        Color::srgb(0.35, 0.35, 0.35)
    } else {
        resting
    }
}

/// Stands in for a network transport: drains the outbox into the debug log.
pub fn drain_replication_outbox(mut outbox: ResMut<ReplicationOutbox>) {
    if outbox.is_empty() {
        return;
    }
    match outbox.drain_json_lines() {
        Ok(lines) => {
            for line in lines.lines() {
                debug!(target: "replication", "outbound {}", line);
            }
        }
        Err(err) => warn!("Failed to encode outbound packets: {}", err),
    }
}

/// Toggles cursor grab when engaging the fly camera look mode.
pub fn update_cursor_grab(
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mut cursor_options: Single<&mut CursorOptions>,
) {
    if mouse_buttons.just_pressed(MouseButton::Right) {
        cursor_options.visible = false;
        cursor_options.grab_mode = CursorGrabMode::Locked;
    } else if mouse_buttons.just_released(MouseButton::Right) {
        cursor_options.visible = true;
        cursor_options.grab_mode = CursorGrabMode::None;
    }
}

/// Applies mouse look to the fly camera when the right mouse button is held.
pub fn fly_camera_mouse_look(
    mut motion_events: MessageReader<MouseMotion>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    time: Res<Time>,
    mut query: Query<(&mut FlyCamera, &mut Transform)>,
) {
    let mut cumulative_delta = Vec2::ZERO;
    for ev in motion_events.read() {
        cumulative_delta += ev.delta;
    }

    if !mouse_buttons.pressed(MouseButton::Right) || cumulative_delta == Vec2::ZERO {
        return;
    }

    if let Ok((mut fly_cam, mut transform)) = query.single_mut() {
        fly_cam.yaw -= cumulative_delta.x * fly_cam.look_sensitivity * time.delta_secs();
        fly_cam.pitch -= cumulative_delta.y * fly_cam.look_sensitivity * time.delta_secs();
        fly_cam.pitch = fly_cam.pitch.clamp(-1.54, 1.54);

        let rotation = Quat::from_axis_angle(Vec3::Y, fly_cam.yaw)
            * Quat::from_axis_angle(Vec3::X, fly_cam.pitch);
        transform.rotation = rotation.normalize();
    }
}

/// Moves the fly camera using WASD + Space/LShift.
pub fn fly_camera_translate(
    keyboard: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut query: Query<(&FlyCamera, &mut Transform)>,
) {
    let Ok((fly_cam, mut transform)) = query.single_mut() else {
        return;
    };

    let flatten = |v: Vec3| Vec3::new(v.x, 0.0, v.z).normalize_or_zero();
    let forward = flatten(transform.forward().as_vec3());
    let right = flatten(transform.right().as_vec3());

    let direction = [
        (KeyCode::KeyW, forward),
        (KeyCode::KeyS, -forward),
        (KeyCode::KeyA, -right),
        (KeyCode::KeyD, right),
        (KeyCode::Space, Vec3::Y),
        (KeyCode::ShiftLeft, -Vec3::Y),
    ]
    .into_iter()
    .filter(|(key, _)| keyboard.pressed(*key))
    .fold(Vec3::ZERO, |acc, (_, step)| acc + step);

    if direction.length_squared() > 0.0 {
        transform.translation += direction.normalize() * fly_cam.move_speed * time.delta_secs();
    }
}

fn yaw_pitch_from_transform(transform: &Transform) -> (f32, f32) {
    let forward = -transform.forward().as_vec3();
    let yaw = forward.x.atan2(forward.z);
    let pitch = forward.y.asin();
    (yaw, pitch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_states_keep_their_parent_colour() {
        let resting = Color::BLACK;
        let nested = UiState::new(format!("{}.Pulse", examples::HOVER));
        assert_eq!(color_for(&nested, resting), color_for(&examples::HOVER, resting));
        assert_eq!(color_for(&examples::NONE, resting), resting);
    }

    #[test]
    fn locked_door_fails_and_keeps_its_state() {
        let mut world = World::new();
        let owner = world.spawn_empty().id();
        let volume = world.spawn_empty().id();
        let pawn = world.spawn_empty().id();
        let id = InteractableId::new("door2");
        let state = Arc::new(DoorState::locked());

        let mut registry = Interactables::default();
        registry
            .initialize(
                owner,
                id.clone(),
                Some(QueryVolume {
                    entity: volume,
                    shape: QueryShape::sphere(1.0),
                }),
                None,
                door_bindings(id.clone(), state.clone()),
                None,
            )
            .expect("door initializes");

        assert_eq!(registry.trigger_hover(&id, pawn), Some(examples::INVALID));
        let outcome = registry.try_interact(&id, pawn, None).expect("authority");
        assert!(outcome.is_some_and(|outcome| !outcome.succeeded()));
        assert!(!state.is_open());

        registry
            .request_set_disabled(&id, true, None)
            .expect("authority write");
        assert!(state.is_disabled());
        assert_eq!(
            registry.get(&id).map(|door| door.ui_state().clone()),
            Some(examples::DISABLED)
        );
    }
}
