use thiserror::Error;

/// Caller-contract violations.
///
/// Game over is not an error: collisions and a full board are reported through
/// [`crate::game::StepResult`]. These variants mean the caller handed the core a
/// value it can never accept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnakeError {
    #[error("invalid direction {0}, expected 0 (up), 1 (right), 2 (down) or 3 (left)")]
    InvalidDirection(i64),

    #[error("invalid action {0}, expected 0 (turn left), 1 (turn right) or 2 (straight)")]
    InvalidAction(i64),

    #[error("invalid game configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

pub type Result<T, E = SnakeError> = std::result::Result<T, E>;
