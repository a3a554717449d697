//! HTTP delivery transport.

use crate::transport::{DeliveryRequest, DeliveryResponse, DeliveryTransport, TransportError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use std::time::Duration;
use syncbox_outbox::HttpMethod;

/// A [`DeliveryTransport`] that issues real HTTP requests.
///
/// Each delivery sends one request with the entry's method, URL and payload.
/// The entry's extra headers are merged over a default
/// `Content-Type: application/json`; a caller-supplied content type wins.
/// Requests are bounded by the timeout given at construction, and a timeout
/// is indistinguishable from any other transport failure.
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Creates a transport whose requests time out after `request_timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(request_timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| TransportError::new(e.to_string()))?;
        Ok(Self { client })
    }

    fn build_headers(extra: &[(String, String)]) -> Result<HeaderMap, TransportError> {
        let mut headers = HeaderMap::new();

        let caller_sets_content_type = extra
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case("content-type"));
        if !caller_sets_content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        for (name, value) in extra {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| TransportError::new(format!("invalid header name {name:?}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| TransportError::new(format!("invalid header value: {e}")))?;
            headers.append(name, value);
        }

        Ok(headers)
    }
}

impl DeliveryTransport for HttpTransport {
    fn deliver(&self, request: &DeliveryRequest) -> Result<DeliveryResponse, TransportError> {
        let method = match request.method {
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };
        let headers = Self::build_headers(&request.headers)?;

        let response = self
            .client
            .request(method, request.url.as_str())
            .headers(headers)
            .body(request.body.clone())
            .send()
            .map_err(|e| TransportError::new(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| TransportError::new(e.to_string()))?;

        Ok(DeliveryResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_content_type_is_json() {
        let headers = HttpTransport::build_headers(&[]).unwrap();
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn caller_content_type_wins() {
        let extra = vec![("Content-Type".to_string(), "application/cbor".to_string())];
        let headers = HttpTransport::build_headers(&extra).unwrap();

        let values: Vec<_> = headers.get_all(CONTENT_TYPE).iter().collect();
        assert_eq!(values, vec!["application/cbor"]);
    }

    #[test]
    fn extra_headers_are_appended() {
        let extra = vec![
            ("X-Tenant".to_string(), "acme".to_string()),
            ("X-Tenant".to_string(), "beta".to_string()),
        ];
        let headers = HttpTransport::build_headers(&extra).unwrap();

        let values: Vec<_> = headers.get_all("x-tenant").iter().collect();
        assert_eq!(values, vec!["acme", "beta"]);
    }

    #[test]
    fn invalid_header_name_is_transport_error() {
        let extra = vec![("bad header".to_string(), "v".to_string())];
        let result = HttpTransport::build_headers(&extra);
        assert!(result.is_err());
    }
}
