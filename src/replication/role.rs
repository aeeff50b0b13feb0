//! Which side of the trust boundary this peer runs on.
use std::fmt;

use serde::Deserialize;

/// The authority decides `CanInteract` outcomes and writes the disabled flag;
/// observers only mirror what it replicates. Held by the `Interactables` registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetRole {
    #[default]
    Authority,
    Observer,
}

impl NetRole {
    pub fn is_authority(self) -> bool {
        matches!(self, Self::Authority)
    }
}

impl fmt::Display for NetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authority => write!(f, "authority"),
            Self::Observer => write!(f, "observer"),
        }
    }
}
