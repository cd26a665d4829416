//! Newtype domain identifiers.
//!
//! Every addressing concept is represented as a distinct newtype wrapping a
//! primitive. This prevents accidentally interchanging — for example — a
//! [`ClusterName`] with a [`NamespaceName`] even though both are `String`
//! under the hood.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers — service resolution
// ---------------------------------------------------------------------------

string_id! {
    /// Logical identifier of a downstream platform service (e.g. `"CMDB"`,
    /// `"PIPELINE"`).
    ///
    /// Service names are the keys of the endpoint registry. By convention
    /// they are upper-case and match the `<SERVICE>_ADDR` configuration key
    /// prefix, but the registry does not enforce a case.
    ServiceName
}

impl ServiceName {
    /// Well-known identifier used for runtime discovery lookups when no
    /// explicit address is configured for this service.
    pub fn discovery_id(&self) -> String {
        self.0.to_ascii_lowercase()
    }
}

// ---------------------------------------------------------------------------
// Identifiers — resource addressing
// ---------------------------------------------------------------------------

string_id! {
    /// Name of the cluster hosting a remote object.
    ClusterName
}

string_id! {
    /// Identifies the schema ("kind") of a remote object, e.g. `"node"`.
    ///
    /// Kinds are opaque to the access core; the aggregation proxy routes on
    /// them.
    KindName
}

string_id! {
    /// Namespace of a remote object. Collection addresses without a
    /// namespace refer to the cluster scope.
    NamespaceName
}

string_id! {
    /// Name of a single remote object within its collection.
    ResourceName
}

// ---------------------------------------------------------------------------
// Identifiers — UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single outgoing request for correlation.
///
/// Generated fresh by the transport adapter for every wire request and
/// propagated in the `x-request-id` header and trace events, so client-side
/// and server-side logs for one call can be joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generates a new random request identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a [`RequestId`] from an existing UUID (e.g. parsed from an
    /// incoming header).
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
