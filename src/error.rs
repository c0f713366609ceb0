// src/error.rs
//! Unified error handling for the swing coaching core
//!
//! The analyzer never fails: bad input degrades to a repositioning status and
//! numeric edge cases resolve to neutral values. What remains observable to a
//! caller is transport failure from the speech sink and lifecycle misuse of a
//! session, plus configuration problems at startup.

use crate::config::ConfigError;
use thiserror::Error;

/// Failure reported by an external speech transport
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SinkError {
    #[error("speech transport unavailable: {0}")]
    Unavailable(String),

    #[error("speech transport rejected message: {0}")]
    Rejected(String),

    #[error("speech send timed out after {0} ms")]
    Timeout(u64),
}

/// Lifecycle misuse of a coaching session
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("a session is already active")]
    AlreadyActive,

    #[error("no session is active")]
    NotActive,

    #[error("invalid configuration: {}", .0.join("; "))]
    InvalidConfig(Vec<String>),
}

/// Crate-level error
#[derive(Debug, Error)]
pub enum CoachError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Result type alias for coaching operations
pub type CoachResult<T> = Result<T, CoachError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SinkError::Timeout(5000);
        assert_eq!(err.to_string(), "speech send timed out after 5000 ms");

        let err = SessionError::InvalidConfig(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "invalid configuration: a; b");
    }

    #[test]
    fn test_error_conversion() {
        let err: CoachError = SessionError::AlreadyActive.into();
        assert!(matches!(err, CoachError::Session(SessionError::AlreadyActive)));
        assert_eq!(err.to_string(), "a session is already active");
    }

    #[test]
    fn test_error_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CoachError>();
    }
}
