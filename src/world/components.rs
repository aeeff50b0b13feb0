//! Components used by the demo world.
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use bevy::prelude::*;

/// Marker component for the primary world camera, storing orientation state.
#[derive(Component)]
pub struct FlyCamera {
    pub yaw: f32,
    pub pitch: f32,
    pub move_speed: f32,
    pub look_sensitivity: f32,
}

impl FlyCamera {
    pub fn new(yaw: f32, pitch: f32) -> Self {
        Self {
            yaw,
            pitch,
            move_speed: 6.0,
            look_sensitivity: 0.2,
        }
    }
}

/// Gameplay state shared between a door entity and the callbacks bound on its interactable.
#[derive(Debug, Default)]
pub struct DoorState {
    open: AtomicBool,
    locked: AtomicBool,
    disabled: AtomicBool,
}

impl DoorState {
    pub fn locked() -> Self {
        Self {
            locked: AtomicBool::new(true),
            ..default()
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Relaxed)
    }

    pub fn toggle_open(&self) -> bool {
        !self.open.fetch_xor(true, Ordering::Relaxed)
    }

    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::Relaxed)
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.store(disabled, Ordering::Relaxed);
    }
}

#[derive(Component, Clone)]
pub struct Door {
    pub state: Arc<DoorState>,
    pub closed_rotation: Quat,
}

/// Base colour restored when an interactable returns to its default state.
#[derive(Component, Clone, Copy)]
pub struct RestingColor(pub Color);
