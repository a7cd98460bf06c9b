//! Domain error taxonomy shared by every crate in the workspace.
//!
//! State errors carry a machine-readable [`StateCode`] so clients can branch
//! on the condition (e.g. `ERROR_END_DATE`) instead of parsing messages.

/// Machine-readable tag for rejected state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateCode {
    /// Run submitted before the challenge window opened.
    ErrorStartDate,
    /// Run submitted after the challenge window closed.
    ErrorEndDate,
    /// A paid challenge is already in progress for this user.
    ChallengeActive,
    /// Requested milestone has not been reached yet.
    GiftNotReached,
    /// Requested milestone was already opened.
    GiftAlreadyOpened,
    /// Requested milestone is not one of the challenge's thresholds.
    GiftUnknownMilestone,
    /// The enrollment or order is not in a settleable state.
    NotSettleable,
}

impl StateCode {
    /// The wire-format error code returned in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            StateCode::ErrorStartDate => "ERROR_START_DATE",
            StateCode::ErrorEndDate => "ERROR_END_DATE",
            StateCode::ChallengeActive => "CHALLENGE_ACTIVE",
            StateCode::GiftNotReached => "GIFT_NOT_REACHED",
            StateCode::GiftAlreadyOpened => "GIFT_ALREADY_OPENED",
            StateCode::GiftUnknownMilestone => "GIFT_UNKNOWN_MILESTONE",
            StateCode::NotSettleable => "NOT_SETTLEABLE",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("{message}")]
    State { code: StateCode, message: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a [`CoreError::State`] with the given code and message.
    pub fn state(code: StateCode, message: impl Into<String>) -> Self {
        CoreError::State {
            code,
            message: message.into(),
        }
    }

    /// Shorthand for a [`CoreError::NotFound`].
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity,
            key: key.into(),
        }
    }
}
