//! Delivery transport abstraction.

use std::collections::VecDeque;
use std::sync::Mutex;
use syncbox_outbox::{HttpMethod, OutboxEntry};
use thiserror::Error;

/// A transport failure: the request never produced an HTTP response.
///
/// Timeouts, connection refusals and DNS failures all land here; the engine
/// treats them identically to a rejecting response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

impl TransportError {
    /// Creates a transport error with the given detail.
    pub fn new(detail: impl Into<String>) -> Self {
        Self(detail.into())
    }
}

/// One HTTP delivery, as described by an outbox entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Absolute request URL.
    pub url: String,
    /// Extra headers in order. A JSON content-type header is implied and
    /// these are merged over it (a caller-supplied content type wins).
    pub headers: Vec<(String, String)>,
    /// Request body, forwarded verbatim.
    pub body: Vec<u8>,
}

impl DeliveryRequest {
    /// Builds the delivery described by an outbox entry.
    #[must_use]
    pub fn from_entry(entry: &OutboxEntry) -> Self {
        Self {
            method: entry.method,
            url: entry.target_url.clone(),
            headers: entry.headers.clone(),
            body: entry.payload.clone(),
        }
    }
}

/// The HTTP response observed for a delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body, decoded as text.
    pub body: String,
}

impl DeliveryResponse {
    /// A plain 200 response with an empty body.
    #[must_use]
    pub fn ok() -> Self {
        Self {
            status: 200,
            body: String::new(),
        }
    }

    /// A response with the given status and body.
    pub fn with_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for any 2xx status, the only success signal the engine
    /// recognizes.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Renders the failure detail recorded on a rejected entry.
    #[must_use]
    pub fn describe(&self) -> String {
        format!("HTTP {}: {}", self.status, self.body)
    }
}

/// A delivery transport performs the HTTP call for one outbox entry.
///
/// This trait abstracts the network layer, allowing different
/// implementations (reqwest, a test double, etc.). Implementations must not
/// retry internally; the engine owns retry policy.
pub trait DeliveryTransport: Send + Sync {
    /// Performs one delivery attempt.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when no HTTP response was obtained. A
    /// response with a non-2xx status is returned as `Ok`; classifying it
    /// is the engine's job.
    fn deliver(&self, request: &DeliveryRequest) -> Result<DeliveryResponse, TransportError>;
}

/// A mock transport for testing.
///
/// Outcomes are scripted in order: each `deliver` call pops the front of the
/// script, falling back to a plain 200 when the script is exhausted. Every
/// request is recorded in arrival order, which is what FIFO-ordering tests
/// inspect.
#[derive(Debug, Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<Result<DeliveryResponse, TransportError>>>,
    requests: Mutex<Vec<DeliveryRequest>>,
}

impl MockTransport {
    /// Creates a mock transport that succeeds every delivery.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the next outcome as the given response.
    pub fn push_response(&self, response: DeliveryResponse) {
        self.script.lock().unwrap().push_back(Ok(response));
    }

    /// Scripts the next outcome as a transport failure.
    pub fn push_error(&self, error: TransportError) {
        self.script.lock().unwrap().push_back(Err(error));
    }

    /// Returns all requests observed so far, in arrival order.
    #[must_use]
    pub fn requests(&self) -> Vec<DeliveryRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Returns the URLs of all observed requests, in arrival order.
    #[must_use]
    pub fn request_urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.url.clone())
            .collect()
    }
}

impl DeliveryTransport for MockTransport {
    fn deliver(&self, request: &DeliveryRequest) -> Result<DeliveryResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(DeliveryResponse::ok()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_is_any_2xx() {
        assert!(DeliveryResponse::with_status(200, "").is_success());
        assert!(DeliveryResponse::with_status(204, "").is_success());
        assert!(DeliveryResponse::with_status(299, "").is_success());
        assert!(!DeliveryResponse::with_status(199, "").is_success());
        assert!(!DeliveryResponse::with_status(301, "").is_success());
        assert!(!DeliveryResponse::with_status(500, "").is_success());
    }

    #[test]
    fn describe_includes_status_and_body() {
        let response = DeliveryResponse::with_status(422, "unprocessable");
        assert_eq!(response.describe(), "HTTP 422: unprocessable");
    }

    #[test]
    fn mock_defaults_to_success() {
        let transport = MockTransport::new();
        let request = DeliveryRequest {
            method: HttpMethod::Post,
            url: "https://example.com/a".into(),
            headers: Vec::new(),
            body: Vec::new(),
        };

        let response = transport.deliver(&request).unwrap();
        assert!(response.is_success());
        assert_eq!(transport.request_urls(), vec!["https://example.com/a"]);
    }

    #[test]
    fn mock_pops_script_in_order() {
        let transport = MockTransport::new();
        transport.push_response(DeliveryResponse::with_status(500, "boom"));
        transport.push_error(TransportError::new("connection reset"));

        let request = DeliveryRequest {
            method: HttpMethod::Delete,
            url: "https://example.com/b".into(),
            headers: Vec::new(),
            body: Vec::new(),
        };

        assert_eq!(transport.deliver(&request).unwrap().status, 500);
        assert!(transport.deliver(&request).is_err());
        // Script exhausted: back to succeeding
        assert!(transport.deliver(&request).unwrap().is_success());
    }
}
