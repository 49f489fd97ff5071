use thiserror::Error;

/// Failures of vote operations.
///
/// The user-facing variants are worded so a handler can forward them to
/// the requesting player as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VoteError {
    #[error("There is no vote running right now")]
    NoActiveSession,
    #[error("invalid map number {choice}, must be between 1 and {max}")]
    InvalidChoice { choice: i64, max: usize },
    #[error("You cannot start a vote with more than {max} options")]
    TooManyRequests { given: usize, max: usize },
    #[error("no eligible layers for this vote")]
    InsufficientCandidates,
    /// Required external facts (current/next layer etc.) are missing.
    /// Never shown to players; the triggering action is skipped.
    #[error("server state incomplete: {0}")]
    BadExternalState(String),
}
