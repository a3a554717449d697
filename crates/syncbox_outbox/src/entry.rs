//! Outbox entry model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// HTTP method of a queued write request.
///
/// Only state-mutating methods are queueable; reads are never deferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    /// HTTP POST.
    Post,
    /// HTTP PUT.
    Put,
    /// HTTP DELETE.
    Delete,
}

impl HttpMethod {
    /// Returns the wire-format method name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery state of an outbox entry.
///
/// Transitions are `Pending → Syncing → {deleted | Failed}` and
/// `Failed → Syncing` on retry. An entry never moves from `Pending` to
/// `Failed` without passing through `Syncing`, and never leaves `Syncing`
/// except by deletion or a move to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryStatus {
    /// Queued, not yet attempted by the current process.
    Pending,
    /// Owned by the in-progress drain pass.
    Syncing,
    /// Last delivery attempt failed; eligible for retry.
    Failed,
}

impl DeliveryStatus {
    /// Returns true if an entry in this state may be picked up by a drain pass.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, DeliveryStatus::Pending | DeliveryStatus::Failed)
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeliveryStatus::Pending => "pending",
            DeliveryStatus::Syncing => "syncing",
            DeliveryStatus::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// The caller-supplied fields of a write request to queue.
///
/// Everything the store assigns itself (`record_key`, `created_at_ms`,
/// `retry_count`, `status`) is absent here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteRequest {
    /// Caller-assigned correlation id, unique per logical request.
    pub request_id: String,
    /// Absolute URL the request will be delivered to.
    pub target_url: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Opaque request body, forwarded verbatim.
    pub payload: Vec<u8>,
    /// Extra headers as ordered name/value pairs. Order and case are preserved.
    pub headers: Vec<(String, String)>,
}

impl WriteRequest {
    /// Creates a request with an empty payload and no extra headers.
    pub fn new(
        request_id: impl Into<String>,
        target_url: impl Into<String>,
        method: HttpMethod,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            target_url: target_url.into(),
            method,
            payload: Vec::new(),
            headers: Vec::new(),
        }
    }

    /// Sets the request body.
    #[must_use]
    pub fn with_payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    /// Appends one extra header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// A durable, not-yet-confirmed write intent.
///
/// Created by an enqueue while the host is offline, mutated only by the sync
/// engine during a drain pass, and destroyed either by successful delivery or
/// by an explicit caller-initiated discard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboxEntry {
    /// Store-assigned primary key. Monotone, never reused.
    pub record_key: u64,
    /// Caller-assigned correlation id, unique per logical request.
    pub request_id: String,
    /// Absolute URL the request will be delivered to.
    pub target_url: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Opaque request body, forwarded verbatim.
    pub payload: Vec<u8>,
    /// Extra headers as ordered name/value pairs. Order and case are preserved.
    pub headers: Vec<(String, String)>,
    /// Unix-epoch milliseconds at insert time. Immutable.
    pub created_at_ms: u64,
    /// Number of failed delivery attempts so far.
    pub retry_count: u32,
    /// Detail of the most recent failure. Overwritten on each failure.
    pub last_error: Option<String>,
    /// Current delivery state.
    pub status: DeliveryStatus,
}
