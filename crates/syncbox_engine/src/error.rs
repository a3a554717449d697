//! Error types for the sync engine.

use crate::transport::TransportError;
use syncbox_outbox::StoreError;
use thiserror::Error;

/// Result type for sync engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Hard errors from sync engine operations.
///
/// Delivery failures are deliberately absent here: a failed HTTP attempt is
/// recorded on the entry and reported in the drain pass's
/// [`SyncReport`](crate::SyncReport), never raised to the caller. What does
/// surface as `Err` are store-contract violations and initialization
/// failures.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The outbox store failed or its contract was violated.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The delivery transport could not be constructed.
    #[error("transport initialization failed: {0}")]
    TransportInit(#[from] TransportError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_convert() {
        let err: EngineError = StoreError::not_found("req-1").into();
        assert!(err.to_string().contains("req-1"));
    }
}
