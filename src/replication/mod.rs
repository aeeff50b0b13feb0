//! Replication module: network role, packets and authority routing.
pub mod packets;
pub mod plugin;
pub mod role;
pub mod systems;

pub use plugin::ReplicationPlugin;
