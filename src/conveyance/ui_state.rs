//! Opaque visual-state tags published by interactables.
use std::{borrow::Cow, fmt};

use serde::{Deserialize, Serialize};

/// Namespaced, dot-separated tag describing what an interactable currently looks like.
///
/// The conveyance layer never interprets the value; it only compares it for change
/// detection. The empty tag is the state of an interactable that has never been resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UiState(Cow<'static, str>);

impl UiState {
    pub const EMPTY: UiState = UiState(Cow::Borrowed(""));

    pub const fn from_static(tag: &'static str) -> Self {
        Self(Cow::Borrowed(tag))
    }

    pub fn new(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        Self(Cow::Owned(tag.trim().to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Tag hierarchy match: `A.B.C` is a child of `A.B` and of itself, never of `A.Bx`.
    pub fn is_child_of(&self, parent: &UiState) -> bool {
        if parent.is_empty() || self.is_empty() {
            return false;
        }
        match self.0.strip_prefix(parent.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('.'),
            None => false,
        }
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Display for UiState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "<empty>")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Ready-made tags for games that do not define their own vocabulary.
pub mod examples {
    use super::UiState;

    pub const ROOT: UiState = UiState::from_static("Interactions.UIState");
    pub const NONE: UiState = UiState::from_static("Interactions.UIState.None");
    pub const HOVER: UiState = UiState::from_static("Interactions.UIState.Hover");
    pub const FOCUS: UiState = UiState::from_static("Interactions.UIState.Focus");
    pub const CALLOUT: UiState = UiState::from_static("Interactions.UIState.Callout");
    pub const INVALID: UiState = UiState::from_static("Interactions.UIState.Invalid");
    pub const DISABLED: UiState = UiState::from_static("Interactions.UIState.Disabled");
}
