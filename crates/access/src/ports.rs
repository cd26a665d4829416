//! Port traits and the wire request/response types.
//!
//! The access core talks to the network through exactly one seam:
//! [`Transport::invoke`]. Infrastructure crates implement the traits defined
//! here; the domain crate never touches an HTTP client directly. Tests
//! substitute hand-written mocks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AccessError;
use crate::types::ServiceAddress;

/// HTTP verb of a wire request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Verb {
    /// Canonical upper-case method name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One outgoing request, fully assembled by the caller.
///
/// The transport adds nothing semantic: it serialises `body` as JSON when
/// present, attaches `headers` and `query` verbatim, and stamps a fresh
/// request identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct WireRequest {
    pub verb: Verb,
    /// Resolved base address of the target service.
    pub address: ServiceAddress,
    /// Absolute path, starting with `/`.
    pub path: String,
    /// Query parameters, appended verbatim in order.
    pub query: Vec<(String, String)>,
    /// Additional header pairs (identity, markers).
    pub headers: Vec<(String, String)>,
    /// Optional JSON body.
    pub body: Option<Value>,
}

impl WireRequest {
    /// Creates a request with no query, headers, or body.
    pub fn new(verb: Verb, address: ServiceAddress, path: impl Into<String>) -> Self {
        Self {
            verb,
            address,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }
}

/// The raw result of one wire request: status, headers, and body bytes,
/// uninterpreted. Envelope decoding happens in [`crate::envelope`].
#[derive(Debug, Clone, PartialEq)]
pub struct WireResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl WireResponse {
    /// `true` for a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body bytes rendered as text (lossily), for error messages.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Issues one request and returns the raw response.
///
/// Implementations block (await) for the full round trip; deadlines beyond
/// the transport's own timeout configuration are the caller's concern (see
/// the bounded-wait decorator in the `transport` crate).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn invoke(&self, request: WireRequest) -> Result<WireResponse, AccessError>;
}

/// Runtime discovery of service addresses.
///
/// Queried by the endpoint registry when a service has no explicitly
/// configured address, keyed by the service's well-known discovery
/// identifier. `Ok(None)` means the mechanism answered "not known" —
/// distinct from a lookup failure.
#[async_trait]
pub trait Discovery: Send + Sync {
    async fn lookup(&self, id: &str) -> Result<Option<ServiceAddress>, AccessError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verb_names_are_canonical() {
        assert_eq!(Verb::Get.as_str(), "GET");
        assert_eq!(Verb::Patch.to_string(), "PATCH");
    }

    #[test]
    fn success_statuses_are_2xx() {
        let mut response = WireResponse {
            status: 204,
            headers: Vec::new(),
            body: Vec::new(),
        };
        assert!(response.is_success());
        response.status = 404;
        assert!(!response.is_success());
    }
}
