use shared::{DisplayError, MAX_LINES};
use thiserror::Error;

/// Errors surfaced by a scoreboard session
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreboardError {
    #[error("scoreboard handler not set")]
    HandlerNotSet,
    #[error("scoreboard is already activated")]
    AlreadyActivated,
    #[error("update interval must be at least one tick")]
    InvalidInterval,
    #[error("line position {position} is outside 0..{}", MAX_LINES)]
    PositionOutOfRange { position: i32 },
    #[error("display board rejected update: {0}")]
    Display(#[from] DisplayError),
}

impl ScoreboardError {
    /// Misuse of the session API, raised before any state changes
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ScoreboardError::HandlerNotSet
                | ScoreboardError::AlreadyActivated
                | ScoreboardError::InvalidInterval
        )
    }

    /// Failure that means the viewer went away
    pub fn is_disconnect(&self) -> bool {
        matches!(self, ScoreboardError::Display(DisplayError::Disconnected))
    }
}
