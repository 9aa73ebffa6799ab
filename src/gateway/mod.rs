//! Control-plane access for the scenario runner
//!
//! Every step talks to the cluster through [`ResourceGateway`]. The trait
//! keeps the engine independent of kube-rs, so executors can be tested with
//! the generated `MockResourceGateway` or an in-memory cluster while
//! production runs use [`KubeGateway`].

mod cluster;

pub use cluster::{create_client, KubeGateway, FAKE_NODE_ANNOTATION};

use std::collections::BTreeMap;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Node, Pod, PodSpec};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;

#[cfg(test)]
use mockall::automock;

use crate::Error;

/// Trait abstracting the cluster operations scenarios need
///
/// All calls return a point-in-time result; callers never cache them across
/// steps.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ResourceGateway: Send + Sync {
    /// List nodes matching a label selector (empty matches all)
    async fn list_nodes(&self, label_selector: &str) -> Result<Vec<Node>, Error>;

    /// List pods in a namespace matching label and field selectors
    async fn list_pods(
        &self,
        namespace: &str,
        label_selector: &str,
        field_selector: &str,
    ) -> Result<Vec<Pod>, Error>;

    /// Create a pod with the given name, labels and spec
    async fn create_pod(
        &self,
        namespace: &str,
        name: &str,
        labels: &BTreeMap<String, String>,
        spec: &PodSpec,
    ) -> Result<Pod, Error>;

    /// Persist the status of an existing pod
    async fn update_pod_status(&self, namespace: &str, pod: &Pod) -> Result<Pod, Error>;

    /// Delete a node by name
    async fn delete_node(&self, name: &str) -> Result<(), Error>;

    /// Delete a pod by name
    async fn delete_pod(&self, namespace: &str, name: &str) -> Result<(), Error>;

    /// Register a fake node advertising the given capacity
    async fn register_fake_node(
        &self,
        name: &str,
        class: &str,
        labels: &BTreeMap<String, String>,
        resources: &BTreeMap<String, Quantity>,
    ) -> Result<(), Error>;
}
