//! Node operation specialisations.
//!
//! Nodes are cluster-scoped objects of kind [`NODE_KIND`]; labelling and
//! scheduling control are thin merge-patch wrappers over the generic
//! gateway. Unlabelling maps the target keys to `null` (the merge-patch
//! removal marker), so removing a key that is not present is a no-op that
//! still succeeds.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

use access::{AccessError, ClusterName, KindName, RemoteObject, ResourceAddress, ResourceName};

use crate::ResourceGateway;

/// Kind under which cluster nodes are served by the aggregation proxy.
pub const NODE_KIND: &str = "node";

impl ResourceGateway {
    /// Merges `labels` into the node's label set.
    pub async fn label_node(
        &self,
        cluster: &ClusterName,
        node: &ResourceName,
        labels: &BTreeMap<String, String>,
    ) -> Result<RemoteObject, AccessError> {
        let patch = json!({"metadata": {"labels": labels}});
        self.patch(&node_address(cluster, node), &patch).await
    }

    /// Removes `keys` from the node's label set.
    pub async fn unlabel_node(
        &self,
        cluster: &ClusterName,
        node: &ResourceName,
        keys: &[String],
    ) -> Result<RemoteObject, AccessError> {
        let removals: Map<String, Value> =
            keys.iter().map(|key| (key.clone(), Value::Null)).collect();
        let patch = json!({"metadata": {"labels": removals}});
        self.patch(&node_address(cluster, node), &patch).await
    }

    /// Marks the node unschedulable.
    pub async fn cordon_node(
        &self,
        cluster: &ClusterName,
        node: &ResourceName,
    ) -> Result<RemoteObject, AccessError> {
        let patch = json!({"spec": {"unschedulable": true}});
        self.patch(&node_address(cluster, node), &patch).await
    }

    /// Clears the unschedulable flag.
    pub async fn uncordon_node(
        &self,
        cluster: &ClusterName,
        node: &ResourceName,
    ) -> Result<RemoteObject, AccessError> {
        let patch = json!({"spec": {"unschedulable": null}});
        self.patch(&node_address(cluster, node), &patch).await
    }
}

fn node_address(cluster: &ClusterName, node: &ResourceName) -> ResourceAddress {
    let kind = KindName::new(NODE_KIND).expect("literal kind is non-empty");
    ResourceAddress::new(cluster.clone(), kind).with_name(node.clone())
}
