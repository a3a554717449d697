//! Outbox store trait definition.

use crate::entry::{DeliveryStatus, OutboxEntry, WriteRequest};
use crate::error::StoreResult;
use std::time::{SystemTime, UNIX_EPOCH};

/// Durable persistence for [`OutboxEntry`] records.
///
/// This trait is the entire contract between the sync engine and its backing
/// storage. Any store that supports lookup by `request_id` and ordered
/// listing by creation time suffices.
///
/// # Invariants
///
/// - `insert` assigns `record_key` monotonically; keys are never reused
/// - `list_all` and `list_pending` return entries in ascending
///   `created_at_ms` order, ties broken by `record_key`
/// - An entry inserted and immediately fetched back is field-for-field
///   identical to what was inserted (round-trip fidelity)
/// - `update_status` to [`DeliveryStatus::Failed`] increments `retry_count`
///   and overwrites `last_error`
/// - `delete` is idempotent; deleting an unknown key is not an error
///
/// # Implementors
///
/// - [`crate::MemoryOutbox`] - For tests and ephemeral queues
/// - [`crate::FileOutbox`] - Durable, survives process restarts
pub trait OutboxStore: Send + Sync {
    /// Persists a new entry with `status = Pending`, `retry_count = 0` and
    /// `created_at_ms` set to the current time.
    ///
    /// Returns the assigned record key. Uniqueness of `request_id` is the
    /// caller's responsibility; the store does not deduplicate.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be persisted.
    fn insert(&self, request: WriteRequest) -> StoreResult<u64>;

    /// Looks up an entry by its request id.
    ///
    /// Returns `None` if no entry matches.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get_by_request_id(&self, request_id: &str) -> StoreResult<Option<OutboxEntry>>;

    /// Returns all entries, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn list_all(&self) -> StoreResult<Vec<OutboxEntry>>;

    /// Returns entries eligible for delivery (`Pending` or `Failed`),
    /// oldest first.
    ///
    /// `Failed` entries are included because they remain retry-eligible.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn list_pending(&self) -> StoreResult<Vec<OutboxEntry>>;

    /// Moves an entry to `status`, recording `last_error` if given.
    ///
    /// A transition to [`DeliveryStatus::Failed`] counts as one failed
    /// delivery attempt: `retry_count` is incremented.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StoreError::NotFound`] if no entry matches.
    fn update_status(
        &self,
        request_id: &str,
        status: DeliveryStatus,
        last_error: Option<String>,
    ) -> StoreResult<()>;

    /// Removes an entry. Removing an unknown key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the removal cannot be persisted.
    fn delete(&self, request_id: &str) -> StoreResult<()>;

    /// Removes all entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the removal cannot be persisted.
    fn clear(&self) -> StoreResult<()>;

    /// Returns the number of delivery-eligible entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn pending_count(&self) -> StoreResult<usize> {
        Ok(self.list_pending()?.len())
    }

    /// Returns true if any entry is eligible for delivery.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn has_pending(&self) -> StoreResult<bool> {
        Ok(self.pending_count()? > 0)
    }
}

/// Current unix-epoch time in milliseconds.
pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Sorts entries into enqueue order: ascending creation time, record key as
/// the same-millisecond tiebreak.
pub(crate) fn sort_by_enqueue_order(entries: &mut [OutboxEntry]) {
    entries.sort_by_key(|e| (e.created_at_ms, e.record_key));
}
