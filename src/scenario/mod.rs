//! Scenarios and their steps
//!
//! A [`Scenario`] is an ordered list of [`Step`]s. Steps are a closed enum so
//! every verb carries exactly its own payload; the looser wire form
//! ([`StepSpec`]) is checked on conversion.
//!
//! Scenario files are YAML, one scenario per document:
//!
//! ```yaml
//! name: worker-lifecycle
//! steps:
//!   - verb: Create
//!     create: { object: Pod, class: worker, count: 3 }
//!   - verb: Assert
//!     assert: { object: Pod, class: worker, count: 3, within: 5 }
//! ```

mod types;

pub use types::{ConditionStatus, ObjectKind, PodPhase, Verb};

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Verify that `count` resources match the filters, polling for up to `within`
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AssertStep {
    /// Kind to count
    pub object: ObjectKind,
    /// Class filter; `None` counts every resource of the kind
    #[serde(default)]
    pub class: Option<String>,
    /// Phase filter, pods only
    #[serde(default)]
    pub phase: Option<PodPhase>,
    /// Expected number of matches
    pub count: u64,
    /// Wait budget (whole seconds in YAML)
    #[serde(default, with = "duration_secs")]
    pub within: Duration,
}

/// Create `count` resources of a catalog class
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CreateStep {
    /// Kind to create
    pub object: ObjectKind,
    /// Catalog class to instantiate
    pub class: String,
    /// Number of resources
    pub count: u64,
}

/// Move `count` pods of a class from one phase to another
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ChangeStep {
    /// Kind to change (only pods are supported)
    pub object: ObjectKind,
    /// Class to select
    pub class: String,
    /// Number of pods to transition
    pub count: u64,
    /// Phase the pods must currently be in
    pub from: PodPhase,
    /// Phase to move them to
    pub to: PodPhase,
}

/// Delete `count` resources of a class
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DeleteStep {
    /// Kind to delete
    pub object: ObjectKind,
    /// Class to select
    pub class: String,
    /// Number of resources
    pub count: u64,
}

/// One scenario step
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    /// See [`AssertStep`]
    Assert(AssertStep),
    /// See [`CreateStep`]
    Create(CreateStep),
    /// See [`ChangeStep`]
    Change(ChangeStep),
    /// See [`DeleteStep`]
    Delete(DeleteStep),
}

impl Step {
    /// The verb of this step
    pub fn verb(&self) -> Verb {
        match self {
            Self::Assert(_) => Verb::Assert,
            Self::Create(_) => Verb::Create,
            Self::Change(_) => Verb::Change,
            Self::Delete(_) => Verb::Delete,
        }
    }

    /// Object kind the step acts on
    pub fn object(&self) -> ObjectKind {
        match self {
            Self::Assert(s) => s.object,
            Self::Create(s) => s.object,
            Self::Change(s) => s.object,
            Self::Delete(s) => s.object,
        }
    }
}

/// Renders the step in scenario-grammar form, e.g.
/// `change 1 worker pod from Pending to Running`
impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Assert(s) => {
                write!(f, "assert {}", s.count)?;
                if let Some(class) = &s.class {
                    write!(f, " {class}")?;
                }
                write!(f, " {}", s.object)?;
                if let Some(phase) = s.phase {
                    write!(f, " is {phase}")?;
                }
                if !s.within.is_zero() {
                    write!(f, " within {} seconds", s.within.as_secs())?;
                }
                Ok(())
            }
            Self::Create(s) => write!(f, "create {} {} {}", s.count, s.class, s.object),
            Self::Change(s) => write!(
                f,
                "change {} {} {} from {} to {}",
                s.count, s.class, s.object, s.from, s.to
            ),
            Self::Delete(s) => write!(f, "delete {} {} {}", s.count, s.class, s.object),
        }
    }
}

/// A named, ordered list of steps
#[derive(Clone, Debug, PartialEq)]
pub struct Scenario {
    /// Scenario name, used in logs
    pub name: String,
    /// Steps in execution order
    pub steps: Vec<Step>,
}

impl Scenario {
    /// Create a scenario from already-typed steps
    pub fn new(name: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            name: name.into(),
            steps,
        }
    }
}

// =============================================================================
// Wire format
// =============================================================================

/// Step as written in a scenario file: a verb plus one payload per verb
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StepSpec {
    /// Which payload applies
    pub verb: Option<Verb>,
    /// Payload for `Assert`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assert: Option<AssertStep>,
    /// Payload for `Create`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<CreateStep>,
    /// Payload for `Change`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<ChangeStep>,
    /// Payload for `Delete`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<DeleteStep>,
}

impl TryFrom<StepSpec> for Step {
    type Error = Error;

    fn try_from(spec: StepSpec) -> Result<Self> {
        let verb = spec
            .verb
            .ok_or_else(|| Error::validation("step has no verb"))?;

        let extra = [
            (Verb::Assert, spec.assert.is_some()),
            (Verb::Create, spec.create.is_some()),
            (Verb::Change, spec.change.is_some()),
            (Verb::Delete, spec.delete.is_some()),
        ]
        .into_iter()
        .find(|(other, present)| *present && *other != verb);
        if let Some((other, _)) = extra {
            return Err(Error::validation(format!(
                "{verb} step also carries a {other} payload"
            )));
        }

        let missing = || Error::MissingPayload { verb };
        match verb {
            Verb::Assert => spec.assert.map(Step::Assert).ok_or_else(missing),
            Verb::Create => spec.create.map(Step::Create).ok_or_else(missing),
            Verb::Change => spec.change.map(Step::Change).ok_or_else(missing),
            Verb::Delete => spec.delete.map(Step::Delete).ok_or_else(missing),
        }
    }
}

/// Scenario as written in a scenario file
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioSpec {
    /// Scenario name
    pub name: String,
    /// Steps in execution order
    #[serde(default)]
    pub steps: Vec<StepSpec>,
}

impl TryFrom<ScenarioSpec> for Scenario {
    type Error = Error;

    fn try_from(spec: ScenarioSpec) -> Result<Self> {
        let steps = spec
            .steps
            .into_iter()
            .map(Step::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(Scenario::new(spec.name, steps))
    }
}

/// Parse every scenario document in `content`
///
/// `origin` names the source in error messages.
pub fn parse_scenarios(content: &str, origin: &str) -> Result<Vec<Scenario>> {
    let mut scenarios = Vec::new();
    for document in serde_yaml::Deserializer::from_str(content) {
        // empty documents (blank files, trailing `---`) carry no scenario
        let Some(spec) = Option::<ScenarioSpec>::deserialize(document)
            .map_err(|e| Error::config(origin, format!("invalid scenario: {e}")))?
        else {
            continue;
        };
        let name = spec.name.clone();
        let scenario = Scenario::try_from(spec)
            .map_err(|e| Error::config(origin, format!("scenario {name}: {e}")))?;
        scenarios.push(scenario);
    }
    Ok(scenarios)
}

/// Load every scenario in a YAML file
pub fn load_scenarios(path: &Path) -> Result<Vec<Scenario>> {
    let origin = path.display().to_string();
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::config(&origin, format!("failed to read: {e}")))?;
    parse_scenarios(&content, &origin)
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}
