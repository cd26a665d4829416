//! Switchboard CLI entry point.
//!
//! This binary is the composition root for the access core. Responsibilities:
//!
//! 1. **Wire observability** — configure `tracing-subscriber` with an
//!    `EnvFilter` (from `RUST_LOG`) and an optional JSON layer
//!    (`SWITCHBOARD_LOG_JSON`). All `tracing` events emitted by every crate
//!    in the workspace flow through this layer.
//! 2. **Construct infrastructure** — populate the [`EndpointRegistry`] from
//!    `<SERVICE>_ADDR` environment entries, build the [`HttpTransport`],
//!    and inject both into a [`ResourceGateway`].
//! 3. **Execute one command** — `resolve` prints a service address;
//!    `get`/`list` go through the aggregation proxy and print the JSON
//!    result.
//!
//! Identity headers come from `SWITCHBOARD_CALLER` / `SWITCHBOARD_ORG`;
//! `SWITCHBOARD_DEADLINE_SECS` puts a hard deadline on `get`.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::info;

use access::{
    CallerIdentity, ClusterName, KindName, NamespaceName, RemoteObject, ResourceAddress,
    ResourceName, ServiceName,
};
use gateway::ResourceGateway;
use registry::EndpointRegistry;
use transport::{HttpTransport, TransportConfig};

const USAGE: &str = "\
usage: switchboard <command>

commands:
  resolve <SERVICE>                        print the resolved address of a service
  get <cluster> <kind> [namespace] <name>  fetch one object via the aggregation proxy
  list <cluster> <kind> [namespace]        list a collection via the aggregation proxy

environment:
  <SERVICE>_ADDR             explicit service addresses (e.g. CMDB_ADDR=http://cmdb:8080)
  SWITCHBOARD_CALLER / _ORG  identity headers attached to gateway calls
  SWITCHBOARD_DEADLINE_SECS  optional hard deadline on get, in seconds
  SWITCHBOARD_LOG_JSON       emit JSON log lines instead of plain text
  RUST_LOG                   tracing filter (e.g. debug)";

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    let registry = EndpointRegistry::from_env(None)?;
    info!(services = registry.len(), "endpoint registry initialised");

    match args.first().map(String::as_str) {
        Some("resolve") => {
            let raw = args.get(1).context("resolve needs a service name")?;
            let service =
                ServiceName::new(raw.as_str()).context("service name must be non-empty")?;
            let address = registry.resolve(&service).await?;
            println!("{address}");
        }
        Some("get") => {
            let address = object_address(&args[1..])?;
            let gateway = build_gateway(registry)?;
            let object = match deadline_from_env()? {
                Some(limit) => gateway.get_with_deadline(&address, limit).await?,
                None => gateway.get(&address).await?,
            };
            println!("{}", serde_json::to_string_pretty(object.raw())?);
        }
        Some("list") => {
            let address = collection_address(&args[1..])?;
            let gateway = build_gateway(registry)?;
            let objects = gateway.list(&address, &[]).await?;
            let values: Vec<_> = objects.iter().map(RemoteObject::raw).collect();
            println!("{}", serde_json::to_string_pretty(&values)?);
        }
        _ => bail!(USAGE),
    }
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if env::var_os("SWITCHBOARD_LOG_JSON").is_some() {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn build_gateway(registry: EndpointRegistry) -> Result<ResourceGateway> {
    let caller = env::var("SWITCHBOARD_CALLER").unwrap_or_else(|_| "switchboard-cli".to_string());
    let org = env::var("SWITCHBOARD_ORG").unwrap_or_else(|_| "platform".to_string());
    let identity = CallerIdentity::new(caller, org).context("identity values must be non-empty")?;
    let transport = Arc::new(HttpTransport::new(TransportConfig::default())?);
    Ok(ResourceGateway::new(Arc::new(registry), transport, identity))
}

fn object_address(args: &[String]) -> Result<ResourceAddress> {
    match args {
        [cluster, kind, name] => Ok(base_address(cluster, kind)?.with_name(resource_name(name)?)),
        [cluster, kind, namespace, name] => Ok(base_address(cluster, kind)?
            .with_namespace(namespace_name(namespace)?)
            .with_name(resource_name(name)?)),
        _ => bail!(USAGE),
    }
}

fn collection_address(args: &[String]) -> Result<ResourceAddress> {
    match args {
        [cluster, kind] => base_address(cluster, kind),
        [cluster, kind, namespace] => {
            Ok(base_address(cluster, kind)?.with_namespace(namespace_name(namespace)?))
        }
        _ => bail!(USAGE),
    }
}

fn base_address(cluster: &str, kind: &str) -> Result<ResourceAddress> {
    let cluster = ClusterName::new(cluster).context("cluster must be non-empty")?;
    let kind = KindName::new(kind).context("kind must be non-empty")?;
    Ok(ResourceAddress::new(cluster, kind))
}

fn namespace_name(raw: &str) -> Result<NamespaceName> {
    NamespaceName::new(raw).context("namespace must be non-empty")
}

fn resource_name(raw: &str) -> Result<ResourceName> {
    ResourceName::new(raw).context("name must be non-empty")
}

fn deadline_from_env() -> Result<Option<Duration>> {
    match env::var("SWITCHBOARD_DEADLINE_SECS") {
        Ok(raw) => {
            let secs: u64 = raw
                .parse()
                .context("SWITCHBOARD_DEADLINE_SECS must be a whole number of seconds")?;
            Ok(Some(Duration::from_secs(secs)))
        }
        Err(_) => Ok(None),
    }
}
