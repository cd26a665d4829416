//! Switchboard generic resource gateway.
//!
//! Uniform CRUD + merge-patch over heterogeneous remote object kinds,
//! addressed by `(cluster, kind, namespace, name)` and served by a single
//! aggregation proxy — no per-kind client code. Composes the endpoint
//! registry (to locate the proxy), the transport (to carry requests), and
//! the envelope decoder (to split resource payloads from structured remote
//! errors).
//!
//! ## Architectural Layer
//!
//! **Orchestration.** This crate sequences calls between the [`access`]
//! domain types and the infrastructure seams; it adds no wire-format or
//! transport knowledge of its own.
//!
//! ## Validation
//!
//! Every operation validates its [`ResourceAddress`] and payload *before*
//! any network call: single-object operations require a name, collection
//! operations forbid one, and mutating operations reject non-object
//! payloads. A validation failure never reaches the transport.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use access::{
    decode_gateway, decode_gateway_list, AccessError, CallerIdentity, DeletePolicy, RemoteObject,
    ResourceAddress, ServiceName, Transport, Verb, WireRequest, WireResponse,
};
use registry::EndpointRegistry;
use transport::with_deadline;

mod nodes;

pub use nodes::NODE_KIND;

/// Logical name under which the aggregation proxy registers.
pub const DEFAULT_PROXY_SERVICE: &str = "AGGREGATOR";
/// Leading path segment of the proxy's wire protocol.
pub const DEFAULT_PROXY_PREFIX: &str = "aggregator";

/// Gateway tuning: which registry entry fronts the proxy and the path
/// prefix it serves under.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub service: ServiceName,
    pub proxy_prefix: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            service: ServiceName::new(DEFAULT_PROXY_SERVICE).expect("literal name is non-empty"),
            proxy_prefix: DEFAULT_PROXY_PREFIX.to_string(),
        }
    }
}

/// Schema-less client for the aggregation proxy.
///
/// Cheap to clone: the registry and transport are shared behind `Arc`s.
/// Every operation performs exactly one transport round trip; the gateway
/// never retries.
#[derive(Clone)]
pub struct ResourceGateway {
    registry: Arc<EndpointRegistry>,
    transport: Arc<dyn Transport>,
    identity: CallerIdentity,
    config: GatewayConfig,
}

impl ResourceGateway {
    /// Creates a gateway with the default proxy configuration.
    pub fn new(
        registry: Arc<EndpointRegistry>,
        transport: Arc<dyn Transport>,
        identity: CallerIdentity,
    ) -> Self {
        Self::with_config(registry, transport, identity, GatewayConfig::default())
    }

    /// Creates a gateway against a non-default proxy registration.
    pub fn with_config(
        registry: Arc<EndpointRegistry>,
        transport: Arc<dyn Transport>,
        identity: CallerIdentity,
        config: GatewayConfig,
    ) -> Self {
        Self {
            registry,
            transport,
            identity,
            config,
        }
    }

    /// Fetches a single object. Requires a name on the address.
    pub async fn get(&self, address: &ResourceAddress) -> Result<RemoteObject, AccessError> {
        address.require_name("get")?;
        let response = self.dispatch(Verb::Get, address, Vec::new(), None).await?;
        decode_gateway(response.status, &response.body)
    }

    /// Fetches a single object with a hard deadline on the whole call.
    ///
    /// Decorated by the bounded-wait wrapper: on expiry the caller gets
    /// [`AccessError::Timeout`] while the in-flight request runs on
    /// detached and its result is discarded. Safe here because a get is
    /// idempotent.
    pub async fn get_with_deadline(
        &self,
        address: &ResourceAddress,
        limit: Duration,
    ) -> Result<RemoteObject, AccessError> {
        let gateway = self.clone();
        let address = address.clone();
        with_deadline(limit, async move { gateway.get(&address).await }).await
    }

    /// Lists a collection, appending `selectors` verbatim as query
    /// parameters. The address must not carry a name. Order is as returned
    /// by the server.
    pub async fn list(
        &self,
        address: &ResourceAddress,
        selectors: &[(String, String)],
    ) -> Result<Vec<RemoteObject>, AccessError> {
        address.require_collection("list")?;
        let response = self
            .dispatch(Verb::Get, address, selectors.to_vec(), None)
            .await?;
        decode_gateway_list(response.status, &response.body)
    }

    /// Creates an object in the addressed collection. The server assigns
    /// identity, so the address must not carry a name; the payload must be
    /// a JSON object.
    pub async fn create(
        &self,
        address: &ResourceAddress,
        object: &Value,
    ) -> Result<RemoteObject, AccessError> {
        address.require_collection("create")?;
        require_object("create", object)?;
        let response = self
            .dispatch(Verb::Post, address, Vec::new(), Some(object.clone()))
            .await?;
        decode_gateway(response.status, &response.body)
    }

    /// Replaces the addressed object wholesale (full-replacement
    /// semantics, not a merge). Requires a name.
    pub async fn update(
        &self,
        address: &ResourceAddress,
        object: &Value,
    ) -> Result<RemoteObject, AccessError> {
        address.require_name("update")?;
        require_object("update", object)?;
        let response = self
            .dispatch(Verb::Put, address, Vec::new(), Some(object.clone()))
            .await?;
        decode_gateway(response.status, &response.body)
    }

    /// Applies a JSON merge-patch to the addressed object: only supplied
    /// fields change, and an explicit `null` removes a field. Requires a
    /// name.
    pub async fn patch(
        &self,
        address: &ResourceAddress,
        partial: &Value,
    ) -> Result<RemoteObject, AccessError> {
        address.require_name("patch")?;
        require_object("patch", partial)?;
        let response = self
            .dispatch(Verb::Patch, address, Vec::new(), Some(partial.clone()))
            .await?;
        decode_gateway(response.status, &response.body)
    }

    /// Deletes the addressed object. Requires a name. An empty response
    /// body is success.
    ///
    /// Under [`DeletePolicy::IgnoreMissing`] a remote "not found" is also
    /// success — deleting an object that is already gone is idempotent.
    pub async fn delete(
        &self,
        address: &ResourceAddress,
        policy: DeletePolicy,
    ) -> Result<(), AccessError> {
        address.require_name("delete")?;
        let response = self.dispatch(Verb::Delete, address, Vec::new(), None).await?;
        if response.is_success() && response.body.is_empty() {
            return Ok(());
        }
        match decode_gateway(response.status, &response.body) {
            Ok(_) => Ok(()),
            Err(error) if policy == DeletePolicy::IgnoreMissing && error.is_not_found() => {
                debug!(resource = %address, "delete target already absent, treated as success");
                Ok(())
            }
            Err(error) => Err(error),
        }
    }

    /// Resolves the proxy, assembles the wire request, and performs the
    /// single round trip. Identity headers ride on every request.
    async fn dispatch(
        &self,
        verb: Verb,
        address: &ResourceAddress,
        query: Vec<(String, String)>,
        body: Option<Value>,
    ) -> Result<WireResponse, AccessError> {
        let base = self.registry.resolve(&self.config.service).await?;
        let mut request = WireRequest::new(verb, base, address.proxy_path(&self.config.proxy_prefix));
        request.query = query;
        request.headers = self.identity.headers();
        request.body = body;
        debug!(verb = verb.as_str(), resource = %address, "dispatching gateway request");
        self.transport.invoke(request).await
    }
}

fn require_object(operation: &str, payload: &Value) -> Result<(), AccessError> {
    if payload.is_object() {
        Ok(())
    } else {
        Err(AccessError::invalid_request(format!(
            "{operation} payload must be a JSON object"
        )))
    }
}

#[cfg(test)]
pub(crate) mod testkit;
