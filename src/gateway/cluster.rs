//! kube-rs implementation of [`ResourceGateway`]

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Node, NodeCondition, NodeStatus, Pod, PodSpec};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};
use kube::api::{Api, DeleteParams, ListParams, Patch, PatchParams, PostParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config, ResourceExt};
use tracing::debug;

use super::ResourceGateway;
use crate::selector::Selector;
use crate::{Error, CLASS_LABEL_KEY};

/// Annotation marking nodes registered by the harness
pub const FAKE_NODE_ANNOTATION: &str = "np.fake";

/// Field manager used for status patches
const FIELD_MANAGER: &str = "nodus";

/// Default connection timeout for kube clients (5s is plenty for local API server)
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default read timeout for kube clients
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Create a kube client from an optional kubeconfig path
///
/// Without a path the configuration is inferred (in-cluster, then
/// `KUBECONFIG` / `~/.kube/config`).
pub async fn create_client(kubeconfig: Option<&Path>) -> Result<Client, Error> {
    let mut config = match kubeconfig {
        Some(path) => {
            let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                Error::config(
                    path.display().to_string(),
                    format!("failed to read kubeconfig: {e}"),
                )
            })?;
            Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .map_err(|e| {
                    Error::config(
                        path.display().to_string(),
                        format!("failed to load kubeconfig: {e}"),
                    )
                })?
        }
        None => Config::infer()
            .await
            .map_err(|e| Error::gateway("create_client", format!("failed to infer config: {e}")))?,
    };
    config.connect_timeout = Some(DEFAULT_CONNECT_TIMEOUT);
    config.read_timeout = Some(DEFAULT_READ_TIMEOUT);
    Client::try_from(config)
        .map_err(|e| Error::gateway("create_client", format!("failed to create client: {e}")))
}

/// Real Kubernetes gateway wrapping a kube Client
#[derive(Clone)]
pub struct KubeGateway {
    client: Client,
}

impl KubeGateway {
    /// Create a new KubeGateway wrapping the given kube Client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn pods(&self, namespace: &str) -> Api<Pod> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn nodes(&self) -> Api<Node> {
        Api::all(self.client.clone())
    }
}

fn list_params(label_selector: &str, field_selector: &str) -> ListParams {
    Selector {
        label: label_selector.to_string(),
        field: field_selector.to_string(),
    }
    .list_params()
}

/// Status advertised by a freshly registered fake node
fn fake_node_status(resources: &BTreeMap<String, Quantity>) -> NodeStatus {
    let now = Time(chrono::Utc::now());
    NodeStatus {
        capacity: Some(resources.clone()),
        allocatable: Some(resources.clone()),
        conditions: Some(vec![NodeCondition {
            type_: "Ready".to_string(),
            status: "True".to_string(),
            reason: Some("FakeNodeReady".to_string()),
            message: Some("fake node registered by nodus".to_string()),
            last_heartbeat_time: Some(now.clone()),
            last_transition_time: Some(now),
        }]),
        ..Default::default()
    }
}

#[async_trait]
impl ResourceGateway for KubeGateway {
    async fn list_nodes(&self, label_selector: &str) -> Result<Vec<Node>, Error> {
        debug!(label_selector, "Listing nodes");
        let list = self
            .nodes()
            .list(&list_params(label_selector, ""))
            .await
            .map_err(|e| Error::kube("list_nodes", e))?;
        Ok(list.items)
    }

    async fn list_pods(
        &self,
        namespace: &str,
        label_selector: &str,
        field_selector: &str,
    ) -> Result<Vec<Pod>, Error> {
        debug!(namespace, label_selector, field_selector, "Listing pods");
        let list = self
            .pods(namespace)
            .list(&list_params(label_selector, field_selector))
            .await
            .map_err(|e| Error::kube("list_pods", e))?;
        Ok(list.items)
    }

    async fn create_pod(
        &self,
        namespace: &str,
        name: &str,
        labels: &BTreeMap<String, String>,
        spec: &PodSpec,
    ) -> Result<Pod, Error> {
        debug!(namespace, name, "Creating pod");
        let pod = Pod {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                labels: Some(labels.clone()),
                ..Default::default()
            },
            spec: Some(spec.clone()),
            status: None,
        };
        self.pods(namespace)
            .create(&PostParams::default(), &pod)
            .await
            .map_err(|e| Error::kube("create_pod", e))
    }

    async fn update_pod_status(&self, namespace: &str, pod: &Pod) -> Result<Pod, Error> {
        let name = pod.name_any();
        debug!(namespace, name = %name, "Updating pod status");
        let patch = serde_json::json!({ "status": pod.status });
        self.pods(namespace)
            .patch_status(&name, &PatchParams::apply(FIELD_MANAGER), &Patch::Merge(&patch))
            .await
            .map_err(|e| Error::kube("update_pod_status", e))
    }

    async fn delete_node(&self, name: &str) -> Result<(), Error> {
        debug!(name, "Deleting node");
        self.nodes()
            .delete(name, &DeleteParams::default())
            .await
            .map_err(|e| Error::kube("delete_node", e))?;
        Ok(())
    }

    async fn delete_pod(&self, namespace: &str, name: &str) -> Result<(), Error> {
        debug!(namespace, name, "Deleting pod");
        self.pods(namespace)
            .delete(name, &DeleteParams::default())
            .await
            .map_err(|e| Error::kube("delete_pod", e))?;
        Ok(())
    }

    async fn register_fake_node(
        &self,
        name: &str,
        class: &str,
        labels: &BTreeMap<String, String>,
        resources: &BTreeMap<String, Quantity>,
    ) -> Result<(), Error> {
        debug!(name, class, "Registering fake node");
        let mut labels = labels.clone();
        labels
            .entry(CLASS_LABEL_KEY.to_string())
            .or_insert_with(|| class.to_string());

        let node = Node {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                labels: Some(labels),
                annotations: Some(BTreeMap::from([(
                    FAKE_NODE_ANNOTATION.to_string(),
                    "true".to_string(),
                )])),
                ..Default::default()
            },
            spec: None,
            status: None,
        };
        let nodes = self.nodes();
        nodes
            .create(&PostParams::default(), &node)
            .await
            .map_err(|e| Error::kube("register_fake_node", e))?;

        // status is a subresource; the create above ignores it
        let patch = serde_json::json!({ "status": fake_node_status(resources) });
        nodes
            .patch_status(name, &PatchParams::apply(FIELD_MANAGER), &Patch::Merge(&patch))
            .await
            .map_err(|e| Error::kube("register_fake_node", e))?;
        Ok(())
    }
}
