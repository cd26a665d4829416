//! Remote-access domain for Switchboard.
//!
//! This crate contains every domain concept shared by the remote resource
//! access core: newtype identifiers, the service/resource addressing types,
//! the wire envelope decoding rules, the cross-cutting error type, and the
//! port traits implemented by infrastructure crates.
//!
//! ## Architectural Layer
//!
//! **Domain + port definitions.** This crate has no I/O dependencies. It
//! defines *what* the core needs; the `registry`, `transport`, and `gateway`
//! crates define *how* it is supplied.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`ServiceName`, `ClusterName`, etc.) |
//! | [`types`] | Addressing and policy value types (`ServiceAddress`, `ResourceAddress`, `CallerIdentity`, `DeletePolicy`) |
//! | [`envelope`] | Wire envelope decoding and the [`RemoteObject`] payload wrapper |
//! | [`errors`] | The [`AccessError`] taxonomy |
//! | [`ports`] | `Transport` / `Discovery` traits and the wire request/response types |

pub mod envelope;
pub mod errors;
pub mod identifiers;
pub mod ports;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use envelope::{
    decode_envelope, decode_gateway, decode_gateway_list, RemoteObject, ERROR_DISCRIMINATOR,
};
pub use errors::AccessError;
pub use identifiers::{
    ClusterName, KindName, NamespaceName, RequestId, ResourceName, ServiceName,
};
pub use ports::{Discovery, Transport, Verb, WireRequest, WireResponse};
pub use types::{
    CallerIdentity, DeletePolicy, ResourceAddress, ServiceAddress, HEADER_CALLER, HEADER_INTERNAL,
    HEADER_ORG, HEADER_REQUEST_ID,
};
