//! Class catalog: templates for the nodes and pods a scenario creates
//!
//! Loaded once from YAML before any scenario runs and shared read-only
//! afterwards. Node classes and pod classes are separate namespaces, so a
//! `worker` node class and a `worker` pod class can coexist.
//!
//! ```yaml
//! # nodes.yaml
//! nodeClasses:
//!   - name: worker
//!     labels: { tier: compute }
//!     resources: { cpu: "4", memory: 8Gi, pods: "110" }
//! ---
//! # pods.yaml
//! podClasses:
//!   - name: worker
//!     labels: { app: worker }
//!     spec:
//!       containers:
//!         - name: main
//!           image: busybox
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use k8s_openapi::api::core::v1::PodSpec;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::scenario::{ObjectKind, Scenario, Step};
use crate::{Error, Result, CLASS_LABEL_KEY};

/// Template for fake nodes of one class
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct NodeClass {
    /// Class name
    pub name: String,
    /// Labels applied to every node of the class
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Capacity advertised by every node of the class
    #[serde(default)]
    pub resources: BTreeMap<String, Quantity>,
}

impl NodeClass {
    /// Labels for a new node, including the class label
    pub fn labels(&self) -> BTreeMap<String, String> {
        with_class_label(&self.labels, &self.name)
    }
}

/// Template for pods of one class
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct PodClass {
    /// Class name
    pub name: String,
    /// Labels applied to every pod of the class
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Pod spec used for every pod of the class
    #[serde(default)]
    pub spec: PodSpec,
}

impl PodClass {
    /// Labels for a new pod, including the class label
    pub fn labels(&self) -> BTreeMap<String, String> {
        with_class_label(&self.labels, &self.name)
    }
}

/// Node catalog file
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeConfig {
    /// Node classes in declaration order
    #[serde(default)]
    pub node_classes: Vec<NodeClass>,
}

/// Pod catalog file
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PodConfig {
    /// Pod classes in declaration order
    #[serde(default)]
    pub pod_classes: Vec<PodClass>,
}

/// Read-only lookup from class name to template
#[derive(Clone, Debug, Default)]
pub struct ClassCatalog {
    nodes: Vec<NodeClass>,
    pods: Vec<PodClass>,
}

impl ClassCatalog {
    /// Build a catalog, rejecting duplicate class names within a kind
    pub fn new(nodes: NodeConfig, pods: PodConfig) -> Result<Self> {
        ensure_unique(ObjectKind::Node, nodes.node_classes.iter().map(|c| &c.name))?;
        ensure_unique(ObjectKind::Pod, pods.pod_classes.iter().map(|c| &c.name))?;
        Ok(Self {
            nodes: nodes.node_classes,
            pods: pods.pod_classes,
        })
    }

    /// Load catalog files; an omitted file yields no classes of that kind
    pub fn load(node_config: Option<&Path>, pod_config: Option<&Path>) -> Result<Self> {
        let nodes: NodeConfig = match node_config {
            Some(path) => read_yaml(path)?,
            None => NodeConfig::default(),
        };
        let pods: PodConfig = match pod_config {
            Some(path) => read_yaml(path)?,
            None => PodConfig::default(),
        };
        let catalog = Self::new(nodes, pods)?;
        info!(
            node_classes = catalog.nodes.len(),
            pod_classes = catalog.pods.len(),
            "Loaded class catalog"
        );
        Ok(catalog)
    }

    /// Look up a node class
    pub fn node_class(&self, name: &str) -> Result<&NodeClass> {
        self.nodes
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| Error::ClassNotFound {
                kind: ObjectKind::Node,
                class: name.to_string(),
            })
    }

    /// Look up a pod class
    pub fn pod_class(&self, name: &str) -> Result<&PodClass> {
        self.pods
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| Error::ClassNotFound {
                kind: ObjectKind::Pod,
                class: name.to_string(),
            })
    }

    /// Check that every class a scenario creates exists in the catalog
    ///
    /// Only create steps need a template; other verbs select on the class
    /// label and may target resources created outside the harness.
    pub fn check_scenario(&self, scenario: &Scenario) -> Result<()> {
        for step in &scenario.steps {
            if let Step::Create(create) = step {
                match create.object {
                    ObjectKind::Node => self.node_class(&create.class).map(|_| ())?,
                    ObjectKind::Pod => self.pod_class(&create.class).map(|_| ())?,
                }
            }
        }
        Ok(())
    }
}

fn with_class_label(labels: &BTreeMap<String, String>, class: &str) -> BTreeMap<String, String> {
    let mut labels = labels.clone();
    labels.insert(CLASS_LABEL_KEY.to_string(), class.to_string());
    labels
}

fn ensure_unique<'a>(kind: ObjectKind, names: impl Iterator<Item = &'a String>) -> Result<()> {
    let mut seen = HashSet::new();
    for name in names {
        if name.is_empty() {
            return Err(Error::validation(format!("{kind} class with empty name")));
        }
        if !seen.insert(name) {
            return Err(Error::validation(format!(
                "duplicate {kind} class: {name}"
            )));
        }
    }
    Ok(())
}

fn read_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let origin = path.display().to_string();
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::config(&origin, format!("failed to read: {e}")))?;
    serde_yaml::from_str(&content).map_err(|e| Error::config(&origin, e.to_string()))
}
