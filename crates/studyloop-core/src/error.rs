//! Error types shared by the engine and store implementations.
//!
//! `StoreError` is defined here rather than in `studyloop-store` so the
//! engine can decide which failures degrade selection and which surface.

use thiserror::Error;

use crate::model::SessionId;

/// Errors returned by a [`ReviewStore`](crate::traits::ReviewStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested deck does not exist.
    #[error("deck not found: {0}")]
    DeckNotFound(String),

    /// The requested card does not exist.
    #[error("card not found: {0}")]
    CardNotFound(String),

    /// The backing store could not be reached or read.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Reading or writing persisted data failed.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted data could not be (de)serialized.
    #[error("store data is corrupt: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Returns `true` if retrying the same call later could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_) | StoreError::Io(_))
    }
}

/// Errors produced while driving a review session.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A storage call the engine cannot recover from failed.
    #[error("storage failure: {0}")]
    Store(#[from] StoreError),

    /// Every card in the session has already been answered.
    #[error("session {0} has no cards left to answer")]
    SessionFinished(SessionId),

    /// Progress for this session was already applied.
    #[error("session {0} was already completed")]
    SessionAlreadyCompleted(SessionId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(StoreError::Unavailable("down".into()).is_transient());
        assert!(!StoreError::DeckNotFound("d1".into()).is_transient());
        assert!(!StoreError::CardNotFound("c1".into()).is_transient());
    }

    #[test]
    fn engine_error_wraps_store_error() {
        let err: EngineError = StoreError::DeckNotFound("algebra".into()).into();
        assert_eq!(err.to_string(), "storage failure: deck not found: algebra");
    }
}
