//! Interaction conveyance for Bevy: interactables convey a UI state to the local player as
//! agents discover and focus them, and interaction attempts are decided by the authority.
pub mod conveyance;
pub mod interactor;
pub mod replication;

pub use conveyance::ConveyancePlugin;
