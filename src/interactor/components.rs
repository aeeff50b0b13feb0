//! Components used by the interactor module.
use bevy::prelude::*;

use crate::conveyance::registry::InteractableId;

/// Marker for the locally controlled agent. Discovery only runs for this entity.
#[derive(Component, Debug, Default)]
#[require(OverlapTracker)]
pub struct LocalPlayer;

/// The query volume the agent was inside last frame, for overlap discovery.
#[derive(Component, Debug, Default)]
pub struct OverlapTracker {
    pub inside: Option<InteractableId>,
}
