use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Editing mode of a wizard session. View disables all mutation and gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WizardMode {
    Create,
    Edit,
    View,
}

/// Identity and progression state of one wizard mount.
///
/// Invariant: `mode == Create` implies `entity_id == None`; the first
/// successful create assigns the id and flips the mode to `Edit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardSession {
    pub session_id: Uuid,
    pub entity_id: Option<i64>,
    pub active_step: usize,
    pub mode: WizardMode,
    /// Highest step index the user has reached; re-entry is allowed up to
    /// and including it.
    pub completed_through: usize,
}

impl WizardSession {
    /// Starts a creation session with no addressable entity yet.
    pub fn create() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            entity_id: None,
            active_step: 0,
            mode: WizardMode::Create,
            completed_through: 0,
        }
    }

    /// Starts a session over an existing entity.
    pub fn existing(entity_id: i64, view_only: bool) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            entity_id: Some(entity_id),
            active_step: 0,
            mode: if view_only {
                WizardMode::View
            } else {
                WizardMode::Edit
            },
            completed_through: 0,
        }
    }

    pub fn is_view_only(&self) -> bool {
        self.mode == WizardMode::View
    }
}
