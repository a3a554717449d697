//! Error types for outbox store operations.

use std::io;
use thiserror::Error;

/// Result type for outbox store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during outbox store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No entry exists for the given request id.
    ///
    /// Signalled by `update_status` only; it indicates a programming error
    /// (e.g. two orchestrators racing over one store) and should be logged
    /// loudly by callers that cannot propagate it.
    #[error("no outbox entry for request {request_id}")]
    NotFound {
        /// The request id that was looked up.
        request_id: String,
    },

    /// The persisted outbox image could not be decoded.
    #[error("outbox store corrupted: {0}")]
    Corrupted(String),

    /// Another process holds the outbox directory lock.
    #[error("outbox directory is locked by another process")]
    Locked,
}

impl StoreError {
    /// Creates a `NotFound` error for the given request id.
    pub fn not_found(request_id: impl Into<String>) -> Self {
        Self::NotFound {
            request_id: request_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = StoreError::not_found("req-7");
        assert_eq!(err.to_string(), "no outbox entry for request req-7");

        let err = StoreError::Locked;
        assert!(err.to_string().contains("locked"));
    }
}
