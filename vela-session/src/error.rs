//! Error taxonomy of the session layer.
//!
//! Every public operation reports failures as values of `SessionError`;
//! nothing in this layer panics on bad input. Permission and null checks
//! run before any state mutation, so a failed operation never leaves a
//! session partially mutated.

use thiserror::Error;

/// A general `Result` alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Failure modes of session operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Operation attempted on a destroyed, disconnected, or
    /// not-yet-connected session.
    #[error("invalid session state for the requested operation")]
    InvalidSession,

    /// Malformed parameter: bad rect, out-of-range ratio, invalid
    /// requested visual state on reconnect.
    #[error("invalid parameter")]
    InvalidParam,

    /// A required collaborator handle was missing.
    #[error("required collaborator reference is null")]
    NullReference,

    /// The caller lacks the privilege required for this operation on
    /// this window category.
    #[error("permission denied")]
    InvalidPermission,

    /// A gesture or one-shot action is already in progress.
    #[error("operation already in progress")]
    RepeatOperation,

    /// The session object could not be resolved at dispatch time.
    #[error("session object already destroyed")]
    DestroyedObject,
}

impl SessionError {
    /// Stable numeric code surfaced to the collaborator/IPC layer.
    pub fn code(&self) -> u32 {
        match self {
            SessionError::InvalidPermission => 201,
            SessionError::InvalidParam => 401,
            SessionError::RepeatOperation => 1_300_001,
            SessionError::InvalidSession
            | SessionError::NullReference
            | SessionError::DestroyedObject => 1_300_002,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_codes_are_stable() {
        assert_eq!(SessionError::InvalidPermission.code(), 201);
        assert_eq!(SessionError::InvalidParam.code(), 401);
        assert_eq!(SessionError::RepeatOperation.code(), 1_300_001);
        assert_eq!(SessionError::InvalidSession.code(), 1_300_002);
        assert_eq!(SessionError::NullReference.code(), 1_300_002);
        assert_eq!(SessionError::DestroyedObject.code(), 1_300_002);
    }
}
