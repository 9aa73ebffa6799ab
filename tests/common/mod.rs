//! In-memory cluster for driving the runner without a control plane
//!
//! Writes are visible to the next query, label selectors support
//! comma-separated `key=value` terms and field selectors support
//! `status.phase=<phase>`.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Node, Pod, PodSpec, PodStatus};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::ResourceExt;

use nodus::catalog::{ClassCatalog, NodeClass, NodeConfig, PodClass, PodConfig};
use nodus::gateway::ResourceGateway;
use nodus::retry::Sleeper;
use nodus::runner::ScenarioRunner;
use nodus::Error;

pub const NAMESPACE: &str = "scenarios";

#[derive(Default)]
struct State {
    nodes: Vec<Node>,
    pods: Vec<Pod>,
}

/// Gateway backed by in-process vectors
#[derive(Default)]
pub struct FakeCluster {
    state: Mutex<State>,
    writes: AtomicU32,
    status_updates: AtomicU32,
    lists: AtomicU32,
}

impl FakeCluster {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Create, update, delete and register calls that reached the cluster
    pub fn writes(&self) -> u32 {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn status_updates(&self) -> u32 {
        self.status_updates.load(Ordering::SeqCst)
    }

    pub fn lists(&self) -> u32 {
        self.lists.load(Ordering::SeqCst)
    }

    /// Pod count per phase
    pub fn pod_phases(&self) -> BTreeMap<String, usize> {
        let state = self.state.lock().unwrap();
        let mut phases = BTreeMap::new();
        for pod in &state.pods {
            *phases.entry(phase_of(pod).to_string()).or_insert(0) += 1;
        }
        phases
    }

    pub fn node_names(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.nodes.iter().map(|n| n.name_any()).collect()
    }
}

fn phase_of(pod: &Pod) -> &str {
    pod.status
        .as_ref()
        .and_then(|s| s.phase.as_deref())
        .unwrap_or_default()
}

fn labels_match(labels: &BTreeMap<String, String>, selector: &str) -> bool {
    selector
        .split(',')
        .filter(|term| !term.is_empty())
        .all(|term| match term.split_once('=') {
            Some((key, value)) => labels.get(key).map(String::as_str) == Some(value),
            None => labels.contains_key(term),
        })
}

fn fields_match(pod: &Pod, selector: &str) -> bool {
    selector
        .split(',')
        .filter(|term| !term.is_empty())
        .all(|term| match term.split_once('=') {
            Some(("status.phase", phase)) => phase_of(pod) == phase,
            _ => panic!("unsupported field selector: {term}"),
        })
}

#[async_trait]
impl ResourceGateway for FakeCluster {
    async fn list_nodes(&self, label_selector: &str) -> Result<Vec<Node>, Error> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        Ok(state
            .nodes
            .iter()
            .filter(|n| labels_match(n.labels(), label_selector))
            .cloned()
            .collect())
    }

    async fn list_pods(
        &self,
        namespace: &str,
        label_selector: &str,
        field_selector: &str,
    ) -> Result<Vec<Pod>, Error> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        Ok(state
            .pods
            .iter()
            .filter(|p| p.namespace().as_deref() == Some(namespace))
            .filter(|p| labels_match(p.labels(), label_selector))
            .filter(|p| fields_match(p, field_selector))
            .cloned()
            .collect())
    }

    async fn create_pod(
        &self,
        namespace: &str,
        name: &str,
        labels: &BTreeMap<String, String>,
        spec: &PodSpec,
    ) -> Result<Pod, Error> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        if state.pods.iter().any(|p| p.name_any() == name) {
            return Err(Error::gateway("create_pod", format!("pods \"{name}\" already exists")));
        }
        let pod = Pod {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                labels: Some(labels.clone()),
                ..Default::default()
            },
            spec: Some(spec.clone()),
            status: Some(PodStatus {
                phase: Some("Pending".to_string()),
                ..Default::default()
            }),
        };
        state.pods.push(pod.clone());
        Ok(pod)
    }

    async fn update_pod_status(&self, namespace: &str, pod: &Pod) -> Result<Pod, Error> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.status_updates.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        let name = pod.name_any();
        let stored = state
            .pods
            .iter_mut()
            .find(|p| p.name_any() == name && p.namespace().as_deref() == Some(namespace))
            .ok_or_else(|| Error::gateway("update_pod_status", format!("pod {name} not found")))?;
        stored.status = pod.status.clone();
        Ok(stored.clone())
    }

    async fn delete_node(&self, name: &str) -> Result<(), Error> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        let before = state.nodes.len();
        state.nodes.retain(|n| n.name_any() != name);
        if state.nodes.len() == before {
            return Err(Error::gateway("delete_node", format!("node {name} not found")));
        }
        Ok(())
    }

    async fn delete_pod(&self, namespace: &str, name: &str) -> Result<(), Error> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        let before = state.pods.len();
        state
            .pods
            .retain(|p| !(p.name_any() == name && p.namespace().as_deref() == Some(namespace)));
        if state.pods.len() == before {
            return Err(Error::gateway("delete_pod", format!("pod {name} not found")));
        }
        Ok(())
    }

    async fn register_fake_node(
        &self,
        name: &str,
        _class: &str,
        labels: &BTreeMap<String, String>,
        _resources: &BTreeMap<String, Quantity>,
    ) -> Result<(), Error> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        if state.nodes.iter().any(|n| n.name_any() == name) {
            return Err(Error::gateway("register_fake_node", format!("node {name} already exists")));
        }
        state.nodes.push(Node {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                labels: Some(labels.clone()),
                ..Default::default()
            },
            ..Default::default()
        });
        Ok(())
    }
}

/// Sleeper that returns at once and counts how often it was asked to wait
#[derive(Default)]
pub struct InstantSleeper {
    sleeps: AtomicU32,
}

impl InstantSleeper {
    pub fn sleeps(&self) -> u32 {
        self.sleeps.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Sleeper for InstantSleeper {
    async fn sleep(&self, _duration: Duration) {
        self.sleeps.fetch_add(1, Ordering::SeqCst);
    }
}

/// Catalog with a `worker` node class, a `worker` pod class and a `batch` pod class
pub fn catalog() -> Arc<ClassCatalog> {
    let nodes = NodeConfig {
        node_classes: vec![NodeClass {
            name: "worker".to_string(),
            labels: BTreeMap::from([("tier".to_string(), "compute".to_string())]),
            resources: BTreeMap::from([("cpu".to_string(), Quantity("4".to_string()))]),
        }],
    };
    let pods = PodConfig {
        pod_classes: vec![
            PodClass {
                name: "worker".to_string(),
                ..Default::default()
            },
            PodClass {
                name: "batch".to_string(),
                ..Default::default()
            },
        ],
    };
    Arc::new(ClassCatalog::new(nodes, pods).expect("catalog is valid"))
}

/// Runner over `cluster` with an instant sleeper
pub fn runner(cluster: Arc<FakeCluster>, sleeper: Arc<InstantSleeper>) -> ScenarioRunner {
    ScenarioRunner::new(cluster, catalog(), NAMESPACE).with_sleeper(sleeper)
}
