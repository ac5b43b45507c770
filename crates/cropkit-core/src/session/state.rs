use serde::{Deserialize, Serialize};

/// Lifecycle of a crop session.
///
/// ```text
/// Initializing -> LaidOut -> Editing <-> ResettableEditing -> Committing -> Committed
///                    \___________\_______________\____________________\--> Cancelled
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Waiting for the first layout; restore values may still be set.
    #[default]
    Initializing,
    /// Laid out, no interaction yet.
    LaidOut,
    /// Interacting, layout equal to the pristine one.
    Editing,
    /// Interacting, layout differs from the pristine one.
    ResettableEditing,
    /// Done was tapped; the result is being produced or shared.
    Committing,
    Committed,
    Cancelled,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Committed | SessionState::Cancelled)
    }

    /// Whether gestures and toolbar edits are accepted.
    pub fn accepts_edits(self) -> bool {
        matches!(
            self,
            SessionState::LaidOut | SessionState::Editing | SessionState::ResettableEditing
        )
    }

    /// The editing state matching `resettable`.
    pub fn editing(resettable: bool) -> Self {
        if resettable {
            SessionState::ResettableEditing
        } else {
            SessionState::Editing
        }
    }
}
