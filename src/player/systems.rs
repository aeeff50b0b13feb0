//! Systems turning player input into interaction requests, plus the HUD readout.
use bevy::prelude::*;
use interaction_conveyance::{
    conveyance::{
        events::{SetDisabledRequest, TryInteractRequest},
        registry::{InteractableId, Interactables},
    },
    interactor::{components::LocalPlayer, tracker::Interactor},
};

use crate::{player::components::InteractionHud, world::systems::INSPECT_ACTION};

const HUD_HINT: &str =
    "[E] interact  [R] inspect  [F] focus  [Esc] clear focus  [Q] toggle disabled";

/// E/R attempt an interaction, F toggles focus, Escape clears it, Q flips the disabled flag.
pub fn handle_interaction_keys(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut interactables: ResMut<Interactables>,
    mut local: Query<(Entity, &mut Interactor), With<LocalPlayer>>,
    mut attempts: MessageWriter<TryInteractRequest>,
    mut disable_requests: MessageWriter<SetDisabledRequest>,
) {
    let Ok((pawn, mut interactor)) = local.single_mut() else {
        return;
    };

    if keyboard.just_pressed(KeyCode::Escape) && interactor.focus().is_some() {
        interactor.clear_focus(&mut interactables);
    }

    let Some(candidate) = interactor.candidate().cloned() else {
        if keyboard.any_just_pressed([KeyCode::KeyE, KeyCode::KeyR, KeyCode::KeyQ]) {
            debug!("Interaction key pressed with no candidate");
        }
        return;
    };

    if keyboard.just_pressed(KeyCode::KeyF) {
        if interactor.focus() == Some(&candidate) {
            interactor.clear_focus(&mut interactables);
        } else {
            interactor.set_focus(&candidate, &mut interactables);
        }
    }

    if keyboard.just_pressed(KeyCode::KeyE) {
        attempts.write(TryInteractRequest {
            interactable: candidate.clone(),
            interactor: pawn,
            action: None,
        });
    }

    if keyboard.just_pressed(KeyCode::KeyR) {
        attempts.write(TryInteractRequest {
            interactable: candidate.clone(),
            interactor: pawn,
            action: Some(INSPECT_ACTION),
        });
    }

    if keyboard.just_pressed(KeyCode::KeyQ) {
        let disabled = interactables
            .get(&candidate)
            .is_some_and(|interactable| interactable.is_disabled());
        disable_requests.write(SetDisabledRequest {
            interactable: candidate,
            disabled: !disabled,
        });
    }
}

pub fn spawn_interaction_hud(mut commands: Commands) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(16.0),
                top: Val::Px(16.0),
                padding: UiRect::all(Val::Px(10.0)),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(6.0),
                ..Default::default()
            },
            BackgroundColor(Color::srgba(0.08, 0.08, 0.1, 0.8)),
            Name::new("Interaction HUD"),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new(""),
                TextFont {
                    font_size: 16.0,
                    ..Default::default()
                },
                TextColor(Color::WHITE),
                InteractionHud,
            ));
            parent.spawn((
                Text::new(HUD_HINT),
                TextFont {
                    font_size: 13.0,
                    ..Default::default()
                },
                TextColor(Color::srgb(0.7, 0.7, 0.75)),
            ));
        });
}

pub fn update_interaction_hud(
    interactables: Res<Interactables>,
    local: Query<&Interactor, With<LocalPlayer>>,
    mut hud: Query<&mut Text, With<InteractionHud>>,
) {
    let Ok(mut text) = hud.single_mut() else {
        return;
    };
    let describe = |id: Option<&InteractableId>, pawn: Entity| {
        id.and_then(|id| Some((id, interactables.get(id)?)))
            .map_or_else(
                || "-".to_string(),
                |(id, interactable)| {
                    // Local guess only; the authority re-checks on every attempt.
                    let hint = if interactable.can_interact(pawn) {
                        "ready"
                    } else {
                        "blocked"
                    };
                    format!("{} ({}, {})", id, interactable.ui_state(), hint)
                },
            )
    };

    let readout = match local.single() {
        Ok(interactor) => format!(
            "Role: {}\nCandidate: {}\nFocus: {}",
            interactables.role(),
            describe(interactor.candidate(), interactor.owner()),
            describe(interactor.focus(), interactor.owner()),
        ),
        Err(_) => format!("Role: {}\nNo local pawn", interactables.role()),
    };
    if text.0 != readout {
        text.0 = readout;
    }
}
