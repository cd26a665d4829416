//! Switchboard endpoint registry.
//!
//! Maps logical service names (`"CMDB"`, `"PIPELINE"`, ...) to validated
//! network addresses. Addresses come from explicit configuration —
//! `<SERVICE>_ADDR`-style environment entries — with a runtime discovery
//! lookup as fallback for services that were never configured.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Configuration scanning and the discovery fallback
//! live here; the [`access`] crate sees only addresses and errors.
//!
//! ## Lifecycle
//!
//! A registry is an explicitly constructed instance with a single-writer,
//! many-reader lifecycle: populate it at process start (registration takes
//! `&mut self`), then share it immutably (typically behind an `Arc`) for
//! concurrent resolution. Services are optional dependents — a caller may
//! need 2 of 30 services — so registration is opt-in and a missing address
//! only becomes an error at the first [`resolve`] for that service.
//!
//! [`resolve`]: EndpointRegistry::resolve

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use access::{AccessError, Discovery, ServiceAddress, ServiceName};

/// Suffix of configuration keys recognised by bulk registration
/// (`CMDB_ADDR` binds service `CMDB`).
pub const ADDRESS_KEY_SUFFIX: &str = "_ADDR";

/// In-memory service name → address mapping with discovery fallback.
pub struct EndpointRegistry {
    entries: HashMap<ServiceName, ServiceAddress>,
    discovery: Option<Arc<dyn Discovery>>,
}

impl EndpointRegistry {
    /// Creates an empty registry without a discovery fallback: resolution
    /// of an unregistered service fails immediately.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            discovery: None,
        }
    }

    /// Creates an empty registry that consults `discovery` for services
    /// without an explicitly configured address.
    pub fn with_discovery(discovery: Arc<dyn Discovery>) -> Self {
        Self {
            entries: HashMap::new(),
            discovery: Some(discovery),
        }
    }

    /// Binds `name` to `address`, validating the address first.
    ///
    /// Each name registers at most once per instance; a second attempt is a
    /// fatal configuration error ([`AccessError::DuplicateRegistration`]),
    /// never a silent overwrite.
    pub fn register(&mut self, name: ServiceName, address: &str) -> Result<(), AccessError> {
        let parsed = ServiceAddress::parse(address)?;
        if let Some(existing) = self.entries.get(&name) {
            return Err(AccessError::DuplicateRegistration {
                service: name.to_string(),
                existing: existing.to_string(),
            });
        }
        debug!(service = %name, address = %parsed, "registered service endpoint");
        self.entries.insert(name, parsed);
        Ok(())
    }

    /// Bulk-registers every entry whose key matches the
    /// `<SERVICE>_ADDR` convention. Returns the number of services bound.
    ///
    /// Keys without the suffix are ignored; entries with an empty value are
    /// skipped silently (an unconfigured service is only an error once
    /// something tries to resolve it). Duplicate keys within `entries` fail
    /// deterministically via [`register`].
    ///
    /// [`register`]: EndpointRegistry::register
    pub fn register_entries<I, K, V>(&mut self, entries: I) -> Result<usize, AccessError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut bound = 0;
        for (key, value) in entries {
            let Some(prefix) = key.as_ref().strip_suffix(ADDRESS_KEY_SUFFIX) else {
                continue;
            };
            let Some(name) = ServiceName::new(prefix) else {
                continue;
            };
            if value.as_ref().trim().is_empty() {
                continue;
            }
            self.register(name, value.as_ref())?;
            bound += 1;
        }
        Ok(bound)
    }

    /// Builds a registry from the process environment.
    pub fn from_env(discovery: Option<Arc<dyn Discovery>>) -> Result<Self, AccessError> {
        let mut registry = match discovery {
            Some(discovery) => Self::with_discovery(discovery),
            None => Self::new(),
        };
        let bound = registry.register_entries(std::env::vars())?;
        info!(services = bound, "populated endpoint registry from environment");
        Ok(registry)
    }

    /// Resolves a service name to an address.
    ///
    /// A configured binding wins; otherwise the discovery mechanism is
    /// queried with the service's well-known identifier. Discovery results
    /// are not cached here — the mechanism owns its own caching, and
    /// resolution of unconfigured services is expected to be rare.
    pub async fn resolve(&self, name: &ServiceName) -> Result<ServiceAddress, AccessError> {
        if let Some(address) = self.entries.get(name) {
            return Ok(address.clone());
        }
        if let Some(discovery) = &self.discovery {
            let id = name.discovery_id();
            debug!(service = %name, id = %id, "no configured address, querying discovery");
            if let Some(address) = discovery.lookup(&id).await? {
                return Ok(address);
            }
        }
        Err(AccessError::UnresolvedService {
            service: name.to_string(),
        })
    }

    /// `true` if `name` has an explicitly configured address.
    pub fn contains(&self, name: &ServiceName) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of explicitly configured services.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for EndpointRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    struct FixedDiscovery {
        id: &'static str,
        address: &'static str,
        lookups: AtomicUsize,
    }

    #[async_trait]
    impl Discovery for FixedDiscovery {
        async fn lookup(&self, id: &str) -> Result<Option<ServiceAddress>, AccessError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if id == self.id {
                Ok(Some(ServiceAddress::parse(self.address)?))
            } else {
                Ok(None)
            }
        }
    }

    fn service(name: &str) -> ServiceName {
        ServiceName::new(name).unwrap()
    }

    #[test]
    fn second_registration_of_a_name_is_fatal() {
        let mut registry = EndpointRegistry::new();
        registry.register(service("CMDB"), "http://a:1").unwrap();
        let err = registry.register(service("CMDB"), "http://b:2").unwrap_err();
        match err {
            AccessError::DuplicateRegistration { service, existing } => {
                assert_eq!(service, "CMDB");
                assert_eq!(existing, "http://a:1");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // The original binding is untouched.
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn invalid_address_is_rejected_at_registration() {
        let mut registry = EndpointRegistry::new();
        let err = registry.register(service("CMDB"), "not an address").unwrap_err();
        assert!(matches!(err, AccessError::InvalidAddress { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn bulk_registration_recognises_the_key_convention() {
        let mut registry = EndpointRegistry::new();
        let bound = registry
            .register_entries([
                ("CMDB_ADDR", "http://cmdb:8080"),
                ("PIPELINE_ADDR", "pipeline.internal:9090"),
                ("EMPTY_ADDR", ""),      // unconfigured: skipped silently
                ("BLANK_ADDR", "   "),   // unconfigured: skipped silently
                ("PATH", "/usr/bin"),    // not an address key
                ("_ADDR", "http://x:1"), // no service name before the suffix
            ])
            .unwrap();
        assert_eq!(bound, 2);
        assert!(registry.contains(&service("CMDB")));
        assert!(registry.contains(&service("PIPELINE")));
        assert!(!registry.contains(&service("EMPTY")));
    }

    #[test]
    fn duplicate_entries_in_bulk_registration_fail_deterministically() {
        let mut registry = EndpointRegistry::new();
        let err = registry
            .register_entries([("CMDB_ADDR", "http://a:1"), ("CMDB_ADDR", "http://b:2")])
            .unwrap_err();
        assert!(matches!(err, AccessError::DuplicateRegistration { .. }));
    }

    #[tokio::test]
    async fn configured_addresses_resolve_without_discovery() {
        let discovery = Arc::new(FixedDiscovery {
            id: "cmdb",
            address: "http://discovered:1",
            lookups: AtomicUsize::new(0),
        });
        let mut registry = EndpointRegistry::with_discovery(discovery.clone());
        registry.register(service("CMDB"), "http://configured:1").unwrap();

        let address = registry.resolve(&service("CMDB")).await.unwrap();
        assert_eq!(address.as_str(), "http://configured:1");
        assert_eq!(discovery.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unconfigured_services_fall_back_to_discovery() {
        let discovery = Arc::new(FixedDiscovery {
            id: "pipeline",
            address: "http://discovered:1",
            lookups: AtomicUsize::new(0),
        });
        let registry = EndpointRegistry::with_discovery(discovery.clone());

        let address = registry.resolve(&service("PIPELINE")).await.unwrap();
        assert_eq!(address.as_str(), "http://discovered:1");
        assert_eq!(discovery.lookups.load(Ordering::SeqCst), 1);

        let err = registry.resolve(&service("UNKNOWN")).await.unwrap_err();
        assert!(matches!(err, AccessError::UnresolvedService { .. }));
    }

    #[tokio::test]
    async fn resolution_without_discovery_fails_at_first_use() {
        let registry = EndpointRegistry::new();
        let err = registry.resolve(&service("CMDB")).await.unwrap_err();
        match err {
            AccessError::UnresolvedService { service } => assert_eq!(service, "CMDB"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
