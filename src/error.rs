//! Error types for scenario execution
//!
//! Errors carry the kind, class and phase involved so a failed step explains
//! itself without further digging.

use thiserror::Error;

use crate::scenario::{ObjectKind, PodPhase, Verb};

/// Main error type for Nodus operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The verb does not support this object kind
    #[error("{verb} object: {object} not supported")]
    UnsupportedObject {
        /// Verb of the rejected step
        verb: Verb,
        /// Object kind the step targeted
        object: ObjectKind,
    },

    /// A step declared a verb without the matching payload
    #[error("there is no {verb} payload in this step")]
    MissingPayload {
        /// Verb whose payload is absent
        verb: Verb,
    },

    /// The class is not defined in the catalog for this kind
    #[error("class: {class} not found in the {kind} config")]
    ClassNotFound {
        /// Kind whose catalog was searched
        kind: ObjectKind,
        /// Requested class name
        class: String,
    },

    /// A query required at least one match and found none
    #[error("found 0 {kind}s of class: {class}{}, expected: {expected}", phase_suffix(.phase))]
    NotFound {
        /// Kind that was queried
        kind: ObjectKind,
        /// Class that was queried
        class: String,
        /// Phase filter, pods only
        phase: Option<PodPhase>,
        /// Number of resources the step needed
        expected: u64,
    },

    /// A query matched fewer resources than the step needs
    #[error("expected at least {expected} {kind}s of class: {class}{}, but found: {found}", phase_suffix(.phase))]
    InsufficientCount {
        /// Kind that was queried
        kind: ObjectKind,
        /// Class that was queried
        class: String,
        /// Phase filter, pods only
        phase: Option<PodPhase>,
        /// Number of resources the step needed
        expected: u64,
        /// Number of resources the query returned
        found: usize,
    },

    /// An assertion never observed the expected count
    #[error("found {found} {kind}s{}{}, but {expected} expected", class_suffix(.class), phase_suffix(.phase))]
    CountMismatch {
        /// Kind that was asserted on
        kind: ObjectKind,
        /// Class filter, if any
        class: Option<String>,
        /// Phase filter, pods only
        phase: Option<PodPhase>,
        /// Expected number of resources
        expected: u64,
        /// Count seen by the last poll
        found: usize,
    },

    /// A change step asked for a transition to the phase it starts from
    #[error("the change requested is to the same phase: {phase}")]
    NoOpTransition {
        /// The source (and target) phase
        phase: PodPhase,
    },

    /// A control-plane call failed
    #[error("gateway error [{operation}]: {message}")]
    Gateway {
        /// Gateway operation that failed (e.g. "list_pods")
        operation: String,
        /// Description of the failure
        message: String,
    },

    /// Creating one resource of a batch failed; earlier resources remain
    #[error("could not create {kind} {index} of class: {class}: {source}")]
    CreateFailed {
        /// Kind being created
        kind: ObjectKind,
        /// Class being created
        class: String,
        /// Zero-based index of the failing resource
        index: u64,
        /// Underlying failure
        #[source]
        source: Box<Error>,
    },

    /// A scenario step failed; the scenario stopped here
    #[error("step [{index} / {total}] {verb} failed: {source}")]
    StepFailed {
        /// One-based index of the failing step
        index: usize,
        /// Number of steps in the scenario
        total: usize,
        /// Verb of the failing step
        verb: Verb,
        /// Underlying failure
        #[source]
        source: Box<Error>,
    },

    /// A step or catalog entry is malformed
    #[error("validation error: {0}")]
    Validation(String),

    /// A configuration or scenario file could not be loaded
    #[error("config error [{path}]: {message}")]
    Config {
        /// File being loaded
        path: String,
        /// Description of what failed
        message: String,
    },
}

impl Error {
    /// Create a validation error with the given message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a gateway error for the named operation
    pub fn gateway(operation: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Gateway {
            operation: operation.into(),
            message: msg.into(),
        }
    }

    /// Create a config error for the given file
    pub fn config(path: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Map a kube-rs error into a gateway error for the named operation
    pub fn kube(operation: &str, err: kube::Error) -> Self {
        Self::gateway(operation, err.to_string())
    }
}

fn class_suffix(class: &Option<String>) -> String {
    match class {
        Some(class) => format!(" of class {class}"),
        None => String::new(),
    }
}

fn phase_suffix(phase: &Option<PodPhase>) -> String {
    match phase {
        Some(phase) => format!(" and phase: {phase}"),
        None => String::new(),
    }
}
