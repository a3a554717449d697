//! In-memory outbox store for testing.

use crate::entry::{DeliveryStatus, OutboxEntry, WriteRequest};
use crate::error::{StoreError, StoreResult};
use crate::store::{now_millis, sort_by_enqueue_order, OutboxStore};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// An in-memory outbox store.
///
/// Holds all entries in memory and is suitable for:
/// - Unit tests
/// - Ephemeral queues that don't need to survive a restart
///
/// # Thread Safety
///
/// This store is thread-safe and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use syncbox_outbox::{HttpMethod, MemoryOutbox, OutboxStore, WriteRequest};
///
/// let store = MemoryOutbox::new();
/// let key = store
///     .insert(WriteRequest::new("req-1", "https://example.com/a", HttpMethod::Post))
///     .unwrap();
/// assert_eq!(key, 1);
/// ```
#[derive(Debug, Default)]
pub struct MemoryOutbox {
    entries: RwLock<Vec<OutboxEntry>>,
    next_key: AtomicU64,
}

impl MemoryOutbox {
    /// Creates a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            next_key: AtomicU64::new(0),
        }
    }

    /// Creates a store pre-populated with entries.
    ///
    /// Useful for testing recovery scenarios. The key counter resumes past
    /// the largest `record_key` present.
    #[must_use]
    pub fn with_entries(entries: Vec<OutboxEntry>) -> Self {
        let max_key = entries.iter().map(|e| e.record_key).max().unwrap_or(0);
        Self {
            entries: RwLock::new(entries),
            next_key: AtomicU64::new(max_key),
        }
    }

    /// Returns the total number of entries, regardless of status.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl OutboxStore for MemoryOutbox {
    fn insert(&self, request: WriteRequest) -> StoreResult<u64> {
        let record_key = self.next_key.fetch_add(1, Ordering::SeqCst) + 1;
        let entry = OutboxEntry {
            record_key,
            request_id: request.request_id,
            target_url: request.target_url,
            method: request.method,
            payload: request.payload,
            headers: request.headers,
            created_at_ms: now_millis(),
            retry_count: 0,
            last_error: None,
            status: DeliveryStatus::Pending,
        };
        self.entries.write().push(entry);
        Ok(record_key)
    }

    fn get_by_request_id(&self, request_id: &str) -> StoreResult<Option<OutboxEntry>> {
        Ok(self
            .entries
            .read()
            .iter()
            .find(|e| e.request_id == request_id)
            .cloned())
    }

    fn list_all(&self) -> StoreResult<Vec<OutboxEntry>> {
        let mut entries = self.entries.read().clone();
        sort_by_enqueue_order(&mut entries);
        Ok(entries)
    }

    fn list_pending(&self) -> StoreResult<Vec<OutboxEntry>> {
        let mut entries: Vec<OutboxEntry> = self
            .entries
            .read()
            .iter()
            .filter(|e| e.status.is_retryable())
            .cloned()
            .collect();
        sort_by_enqueue_order(&mut entries);
        Ok(entries)
    }

    fn update_status(
        &self,
        request_id: &str,
        status: DeliveryStatus,
        last_error: Option<String>,
    ) -> StoreResult<()> {
        let mut entries = self.entries.write();
        let entry = entries
            .iter_mut()
            .find(|e| e.request_id == request_id)
            .ok_or_else(|| StoreError::not_found(request_id))?;

        entry.status = status;
        if status == DeliveryStatus::Failed {
            entry.retry_count += 1;
        }
        if let Some(detail) = last_error {
            entry.last_error = Some(detail);
        }
        Ok(())
    }

    fn delete(&self, request_id: &str) -> StoreResult<()> {
        self.entries.write().retain(|e| e.request_id != request_id);
        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        self.entries.write().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::HttpMethod;

    fn make_request(id: &str) -> WriteRequest {
        WriteRequest::new(id, format!("https://example.com/{id}"), HttpMethod::Post)
            .with_payload(id.as_bytes().to_vec())
    }

    #[test]
    fn memory_new_is_empty() {
        let store = MemoryOutbox::new();
        assert!(store.is_empty());
        assert_eq!(store.pending_count().unwrap(), 0);
        assert!(!store.has_pending().unwrap());
    }

    #[test]
    fn insert_assigns_defaults() {
        let store = MemoryOutbox::new();
        let key = store
            .insert(
                make_request("req-1")
                    .with_header("X-Tenant", "acme")
                    .with_header("x-trace", "abc"),
            )
            .unwrap();
        assert_eq!(key, 1);

        let entry = store.get_by_request_id("req-1").unwrap().unwrap();
        assert_eq!(entry.record_key, 1);
        assert_eq!(entry.status, DeliveryStatus::Pending);
        assert_eq!(entry.retry_count, 0);
        assert_eq!(entry.last_error, None);
        assert!(entry.created_at_ms > 0);
        // Header order and case survive the round trip.
        assert_eq!(entry.headers[0].0, "X-Tenant");
        assert_eq!(entry.headers[1].0, "x-trace");
    }

    #[test]
    fn get_unknown_is_none() {
        let store = MemoryOutbox::new();
        assert!(store.get_by_request_id("missing").unwrap().is_none());
    }

    #[test]
    fn list_all_in_enqueue_order() {
        let store = MemoryOutbox::new();
        store.insert(make_request("a")).unwrap();
        store.insert(make_request("b")).unwrap();
        store.insert(make_request("c")).unwrap();

        let ids: Vec<String> = store
            .list_all()
            .unwrap()
            .into_iter()
            .map(|e| e.request_id)
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn list_pending_includes_failed_excludes_syncing() {
        let store = MemoryOutbox::new();
        store.insert(make_request("a")).unwrap();
        store.insert(make_request("b")).unwrap();
        store.insert(make_request("c")).unwrap();

        store
            .update_status("a", DeliveryStatus::Syncing, None)
            .unwrap();
        store
            .update_status("b", DeliveryStatus::Failed, Some("HTTP 500".into()))
            .unwrap();

        let ids: Vec<String> = store
            .list_pending()
            .unwrap()
            .into_iter()
            .map(|e| e.request_id)
            .collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[test]
    fn failed_transition_increments_retry_count() {
        let store = MemoryOutbox::new();
        store.insert(make_request("a")).unwrap();

        store
            .update_status("a", DeliveryStatus::Syncing, None)
            .unwrap();
        store
            .update_status("a", DeliveryStatus::Failed, Some("timeout".into()))
            .unwrap();
        store
            .update_status("a", DeliveryStatus::Syncing, None)
            .unwrap();
        store
            .update_status("a", DeliveryStatus::Failed, Some("HTTP 503: busy".into()))
            .unwrap();

        let entry = store.get_by_request_id("a").unwrap().unwrap();
        assert_eq!(entry.retry_count, 2);
        assert_eq!(entry.last_error.as_deref(), Some("HTTP 503: busy"));
    }

    #[test]
    fn update_unknown_is_not_found() {
        let store = MemoryOutbox::new();
        let result = store.update_status("missing", DeliveryStatus::Failed, None);
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn delete_is_idempotent() {
        let store = MemoryOutbox::new();
        store.insert(make_request("a")).unwrap();

        store.delete("a").unwrap();
        store.delete("a").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn clear_removes_everything() {
        let store = MemoryOutbox::new();
        store.insert(make_request("a")).unwrap();
        store.insert(make_request("b")).unwrap();

        store.clear().unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn with_entries_resumes_key_counter() {
        let store = MemoryOutbox::new();
        store.insert(make_request("a")).unwrap();
        let seeded = store.list_all().unwrap();

        let restored = MemoryOutbox::with_entries(seeded);
        let key = restored.insert(make_request("b")).unwrap();
        assert_eq!(key, 2);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn method_strategy() -> impl Strategy<Value = HttpMethod> {
            prop_oneof![
                Just(HttpMethod::Post),
                Just(HttpMethod::Put),
                Just(HttpMethod::Delete),
            ]
        }

        proptest! {
            #[test]
            fn insert_then_get_round_trips(
                method in method_strategy(),
                payload in proptest::collection::vec(any::<u8>(), 0..512),
                headers in proptest::collection::vec(
                    ("[A-Za-z][A-Za-z-]{0,15}", "[ -~]{0,32}"),
                    0..4,
                ),
            ) {
                let store = MemoryOutbox::new();
                store
                    .insert(WriteRequest {
                        request_id: "req-prop".into(),
                        target_url: "https://example.com/prop".into(),
                        method,
                        payload: payload.clone(),
                        headers: headers.clone(),
                    })
                    .unwrap();

                let entry = store.get_by_request_id("req-prop").unwrap().unwrap();
                prop_assert_eq!(entry.method, method);
                prop_assert_eq!(entry.payload, payload);
                prop_assert_eq!(entry.headers, headers);
                prop_assert_eq!(entry.status, DeliveryStatus::Pending);
                prop_assert_eq!(entry.retry_count, 0);
            }
        }
    }
}
