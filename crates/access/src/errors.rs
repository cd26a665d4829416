//! The cross-cutting error type for the remote resource access core.
//!
//! [`AccessError`] covers every failure class the core can surface: local
//! validation, registry configuration, transport failure, structured remote
//! errors, payload decoding, and deadline expiry. The core never retries;
//! every error is returned to the caller exactly once.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Code a remote peer uses to signal that the addressed object does not
/// exist. Recognised both as an embedded business code and as an HTTP status.
const NOT_FOUND_CODE: &str = "404";
const NOT_FOUND_STATUS: u16 = 404;

/// Errors produced by the remote resource access core.
///
/// The taxonomy separates failures by *where* they were detected so callers
/// can distinguish a local programming error ([`InvalidRequest`]) from a
/// configuration problem (registry variants), a connection-level failure
/// ([`Transport`]), and an application-level business failure ([`Remote`]).
///
/// [`InvalidRequest`]: AccessError::InvalidRequest
/// [`Transport`]: AccessError::Transport
/// [`Remote`]: AccessError::Remote
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum AccessError {
    /// The caller supplied an incomplete resource address or an invalid
    /// payload. Detected before any network call; never retriable.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of the rejected input.
        message: String,
    },

    /// A service name was registered twice in the same registry instance.
    ///
    /// Registration is once-only; a second binding attempt is a fatal
    /// configuration error, not a silent overwrite.
    #[error("Service '{service}' is already registered at {existing}")]
    DuplicateRegistration {
        /// The service name that was registered twice.
        service: String,
        /// The address the name is already bound to.
        existing: String,
    },

    /// A service address failed well-formedness validation at registration.
    #[error("Invalid address '{address}': {reason}")]
    InvalidAddress {
        /// The rejected address value.
        address: String,
        /// Why the address was rejected.
        reason: String,
    },

    /// Neither explicit configuration nor discovery produced an address for
    /// the service. Surfaced at first use, not at startup.
    #[error("Service '{service}' could not be resolved to an address")]
    UnresolvedService {
        /// The unresolvable service name.
        service: String,
    },

    /// A network or connection-level failure surfaced by the transport.
    #[error("Transport failure: {message}")]
    Transport {
        /// Description of the underlying failure.
        message: String,
    },

    /// A well-formed response explicitly signalling business failure.
    ///
    /// Carries both the remote `code` and, where available, the HTTP status
    /// of the response that delivered it, so a transport-level 502 stays
    /// distinguishable from a "not found" inside a 200.
    #[error("Remote error {code}: {message}")]
    Remote {
        /// Business error code reported by the remote service.
        code: String,
        /// Human-readable message reported by the remote service.
        message: String,
        /// HTTP status of the response carrying the error, if it reached us
        /// over HTTP.
        http_status: Option<u16>,
    },

    /// A successful response whose payload could not be deserialised into
    /// the caller's target type.
    #[error("Response decoding failed: {message}")]
    Decode {
        /// Description of the deserialisation failure.
        message: String,
    },

    /// A bounded call exceeded its deadline.
    ///
    /// The underlying operation is not cancelled and may still complete
    /// against the remote service after this error is returned.
    #[error("Call exceeded its deadline of {limit:?}")]
    Timeout {
        /// The deadline that expired.
        limit: Duration,
    },
}

impl AccessError {
    /// Shorthand constructor for [`AccessError::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Returns `true` for a remote business error signalling that the
    /// addressed object does not exist.
    ///
    /// Backs the idempotent-delete policy: a delete that races another
    /// deleter may observe "already gone" and still report success.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Remote {
                code, http_status, ..
            } => code == NOT_FOUND_CODE || *http_status == Some(NOT_FOUND_STATUS),
            _ => false,
        }
    }
}
