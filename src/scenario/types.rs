//! Supporting types for scenario steps

use serde::{Deserialize, Serialize};

/// Resource kinds a step can act on
///
/// Parsed case-insensitively, singular or plural, from YAML and from text.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String")]
pub enum ObjectKind {
    /// Cluster node (registered as a fake node on create)
    Node,
    /// Pod in the scenario namespace
    Pod,
}

impl std::str::FromStr for ObjectKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "node" | "nodes" => Ok(Self::Node),
            "pod" | "pods" => Ok(Self::Pod),
            _ => Err(crate::Error::validation(format!(
                "invalid object kind: {s}, expected one of: node, pod"
            ))),
        }
    }
}

impl TryFrom<String> for ObjectKind {
    type Error = crate::Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Node => write!(f, "node"),
            Self::Pod => write!(f, "pod"),
        }
    }
}

/// Scenario verbs
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String")]
pub enum Verb {
    /// Verify the cluster matches an expected count
    Assert,
    /// Create resources from a catalog class
    Create,
    /// Move pods from one phase to another
    Change,
    /// Delete resources of a class
    Delete,
}

impl std::str::FromStr for Verb {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "assert" => Ok(Self::Assert),
            "create" => Ok(Self::Create),
            "change" => Ok(Self::Change),
            "delete" => Ok(Self::Delete),
            _ => Err(crate::Error::validation(format!(
                "invalid verb: {s}, expected one of: assert, create, change, delete"
            ))),
        }
    }
}

impl TryFrom<String> for Verb {
    type Error = crate::Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Assert => write!(f, "assert"),
            Self::Create => write!(f, "create"),
            Self::Change => write!(f, "change"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Pod lifecycle phase, spelled as Kubernetes reports it in `status.phase`
///
/// Input is case-insensitive; output always uses the Kubernetes spelling.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String")]
pub enum PodPhase {
    /// Accepted but not all containers are running
    Pending,
    /// Bound to a node with at least one container running
    Running,
    /// All containers terminated successfully
    Succeeded,
    /// All containers terminated, at least one in failure
    Failed,
    /// State could not be obtained
    Unknown,
}

impl PodPhase {
    /// Kubernetes string form of the phase
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Running => "Running",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
            Self::Unknown => "Unknown",
        }
    }

    /// Returns true for phases a pod never leaves on its own
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl std::str::FromStr for PodPhase {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "running" => Ok(Self::Running),
            "succeeded" => Ok(Self::Succeeded),
            "failed" => Ok(Self::Failed),
            "unknown" => Ok(Self::Unknown),
            _ => Err(crate::Error::validation(format!(
                "invalid pod phase: {s}, expected one of: Pending, Running, Succeeded, Failed, Unknown"
            ))),
        }
    }
}

impl TryFrom<String> for PodPhase {
    type Error = crate::Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl std::fmt::Display for PodPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Condition status following Kubernetes conventions
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConditionStatus {
    /// Condition is true
    True,
    /// Condition is false
    False,
    /// Condition status is unknown
    #[default]
    Unknown,
}

impl std::fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::True => write!(f, "True"),
            Self::False => write!(f, "False"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}
