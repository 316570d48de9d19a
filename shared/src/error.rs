//! Error taxonomy returned by engine and coordinator operations.
//!
//! The engine never throws for policy failures; every fallible operation
//! returns `Result<_, EngineError>`. Only invariant violations are treated
//! as hard (`Internal`) failures. The HTTP boundary maps each variant to a
//! status code; see `DESIGN.md`.

use thiserror::Error;

#[derive(Clone, Debug, Error)]
pub enum EngineError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Engine rejected the operation given its current state. `reason` is a
    /// short machine-readable token (e.g. "not_your_turn", "hand_active").
    #[error("invalid state: {reason}")]
    InvalidState { reason: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("conflict: {0}")]
    Conflict(String),

    /// KV store timeout after the single retry.
    #[error("transient failure: {0}")]
    Transient(String),

    /// Invariant violation caught at persist time. Logged with full context
    /// by the caller; this variant itself carries an opaque message only.
    #[error("internal error")]
    Internal(String),
}

impl EngineError {
    pub fn invalid_state(reason: impl Into<String>) -> Self {
        EngineError::InvalidState {
            reason: reason.into(),
        }
    }
}
