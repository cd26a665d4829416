//! Addressing and policy value types.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types
//! carry invariants enforced at construction: a [`ServiceAddress`] is always
//! a well-formed base URL, and a [`ResourceAddress`] always names a cluster
//! and a kind.

use serde::{Deserialize, Serialize};

use crate::errors::AccessError;
use crate::identifiers::{ClusterName, KindName, NamespaceName, ResourceName};

// ---------------------------------------------------------------------------
// Wire header names
// ---------------------------------------------------------------------------

/// Header carrying the calling component's identity.
pub const HEADER_CALLER: &str = "x-platform-caller";
/// Header carrying the calling organisation's identity.
pub const HEADER_ORG: &str = "x-platform-org";
/// Marker header telling downstream authorisation this is an internal call.
pub const HEADER_INTERNAL: &str = "x-internal-call";
/// Header carrying the per-request correlation identifier.
pub const HEADER_REQUEST_ID: &str = "x-request-id";

// ---------------------------------------------------------------------------
// Service address
// ---------------------------------------------------------------------------

/// A validated, normalised base address for one platform service.
///
/// Accepted input forms are `http://host[:port][/prefix]`,
/// `https://host[:port][/prefix]`, and bare `host:port` (normalised to
/// `http://host:port`). Trailing slashes are stripped so [`join`] can
/// concatenate absolute paths directly.
///
/// Immutable once constructed; the endpoint registry binds each service name
/// to at most one address.
///
/// [`join`]: ServiceAddress::join
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceAddress(String);

impl ServiceAddress {
    /// Validates and normalises a raw address string.
    pub fn parse(raw: &str) -> Result<Self, AccessError> {
        let invalid = |reason: &str| AccessError::InvalidAddress {
            address: raw.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(invalid("address is empty"));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(invalid("address contains whitespace"));
        }

        if let Some(rest) = trimmed
            .strip_prefix("http://")
            .or_else(|| trimmed.strip_prefix("https://"))
        {
            let authority = rest.split('/').next().unwrap_or("");
            if authority.is_empty() || authority.starts_with(':') {
                return Err(invalid("URL has an empty host"));
            }
            return Ok(Self(trimmed.trim_end_matches('/').to_string()));
        }
        if trimmed.contains("://") {
            return Err(invalid("only http and https schemes are supported"));
        }

        // Bare host:port form.
        let Some((host, port)) = trimmed.rsplit_once(':') else {
            return Err(invalid("expected host:port or an http(s) URL"));
        };
        if host.is_empty() || host.contains('/') {
            return Err(invalid("expected host:port or an http(s) URL"));
        }
        match port.parse::<u16>() {
            Ok(p) if p > 0 => Ok(Self(format!("http://{host}:{p}"))),
            _ => Err(invalid("port is not a number in 1..=65535")),
        }
    }

    /// Returns the normalised base URL.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Appends an absolute path (starting with `/`) to this base address.
    pub fn join(&self, path: &str) -> String {
        debug_assert!(path.starts_with('/'), "paths must be absolute");
        format!("{}{}", self.0, path)
    }
}

impl std::fmt::Display for ServiceAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Resource address
// ---------------------------------------------------------------------------

/// The 4-tuple identifying a remote object behind the aggregation proxy.
///
/// `cluster` and `kind` are always present (enforced by construction).
/// `namespace` is optional — absent means the cluster scope. `name` is
/// optional — absent addresses the whole collection; single-object
/// operations require it via [`require_name`].
///
/// [`require_name`]: ResourceAddress::require_name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceAddress {
    cluster: ClusterName,
    kind: KindName,
    namespace: Option<NamespaceName>,
    name: Option<ResourceName>,
}

impl ResourceAddress {
    /// Creates a collection address in the cluster scope.
    pub fn new(cluster: ClusterName, kind: KindName) -> Self {
        Self {
            cluster,
            kind,
            namespace: None,
            name: None,
        }
    }

    /// Scopes the address to a namespace.
    pub fn with_namespace(mut self, namespace: NamespaceName) -> Self {
        self.namespace = Some(namespace);
        self
    }

    /// Addresses a single named object within the collection.
    pub fn with_name(mut self, name: ResourceName) -> Self {
        self.name = Some(name);
        self
    }

    pub fn cluster(&self) -> &ClusterName {
        &self.cluster
    }

    pub fn kind(&self) -> &KindName {
        &self.kind
    }

    pub fn namespace(&self) -> Option<&NamespaceName> {
        self.namespace.as_ref()
    }

    pub fn name(&self) -> Option<&ResourceName> {
        self.name.as_ref()
    }

    /// Returns the object name, or [`AccessError::InvalidRequest`] for an
    /// operation that needs one. Checked before any network call.
    pub fn require_name(&self, operation: &str) -> Result<&ResourceName, AccessError> {
        self.name.as_ref().ok_or_else(|| {
            AccessError::invalid_request(format!("{operation} requires an object name on {self}"))
        })
    }

    /// Fails with [`AccessError::InvalidRequest`] if a name is set on an
    /// operation that addresses the whole collection.
    pub fn require_collection(&self, operation: &str) -> Result<(), AccessError> {
        match &self.name {
            Some(name) => Err(AccessError::invalid_request(format!(
                "{operation} addresses a collection; object name '{name}' must not be set"
            ))),
            None => Ok(()),
        }
    }

    /// Builds the aggregation-proxy path for this address:
    /// `/{prefix}/clusters/{cluster}/v1/{kind}[/{namespace}][/{name}]`,
    /// the namespace segment omitted iff the address has none.
    pub fn proxy_path(&self, prefix: &str) -> String {
        let mut path = format!(
            "/{}/clusters/{}/v1/{}",
            prefix.trim_matches('/'),
            self.cluster,
            self.kind
        );
        if let Some(namespace) = &self.namespace {
            path.push('/');
            path.push_str(namespace.as_str());
        }
        if let Some(name) = &self.name {
            path.push('/');
            path.push_str(name.as_str());
        }
        path
    }
}

impl std::fmt::Display for ResourceAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.cluster, self.kind)?;
        if let Some(namespace) = &self.namespace {
            write!(f, "/{namespace}")?;
        }
        if let Some(name) = &self.name {
            write!(f, "/{name}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Caller identity
// ---------------------------------------------------------------------------

/// Pass-through identity attached to every outgoing request.
///
/// The access core does not authenticate anything; it forwards the caller
/// and organisation identities plus the internal-call marker for downstream
/// authorisation to evaluate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    caller: String,
    org: String,
}

impl CallerIdentity {
    /// Creates an identity, returning `None` if either value is empty.
    pub fn new(caller: impl Into<String>, org: impl Into<String>) -> Option<Self> {
        let caller = caller.into();
        let org = org.into();
        if caller.is_empty() || org.is_empty() {
            None
        } else {
            Some(Self { caller, org })
        }
    }

    pub fn caller(&self) -> &str {
        &self.caller
    }

    pub fn org(&self) -> &str {
        &self.org
    }

    /// Renders the identity as wire header pairs, including the constant
    /// internal-call marker.
    pub fn headers(&self) -> Vec<(String, String)> {
        vec![
            (HEADER_CALLER.to_string(), self.caller.clone()),
            (HEADER_ORG.to_string(), self.org.clone()),
            (HEADER_INTERNAL.to_string(), "true".to_string()),
        ]
    }
}

// ---------------------------------------------------------------------------
// Delete policy
// ---------------------------------------------------------------------------

/// Named policy controlling how `delete` treats a remote "not found".
///
/// `IgnoreMissing` encodes idempotent-delete semantics: deleting an object
/// that is already gone reports success instead of surfacing the remote
/// error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeletePolicy {
    /// A remote "not found" on delete is surfaced to the caller.
    Strict,
    /// A remote "not found" on delete is treated as success.
    IgnoreMissing,
}
