//! Label and field selector construction
//!
//! Class-scoped queries select on [`CLASS_LABEL_KEY`]; phase-scoped pod
//! queries use the `status.phase` field selector. Empty selectors match
//! everything.

use kube::api::ListParams;

use crate::scenario::PodPhase;
use crate::CLASS_LABEL_KEY;

/// Label and field selector pair for one list query
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selector {
    /// Label selector, empty to match all
    pub label: String,
    /// Field selector, empty to match all
    pub field: String,
}

impl Selector {
    /// Selector for nodes of an optional class
    pub fn nodes(class: Option<&str>) -> Self {
        Self {
            label: class_selector(class),
            field: String::new(),
        }
    }

    /// Selector for pods of an optional class and phase
    pub fn pods(class: Option<&str>, phase: Option<PodPhase>) -> Self {
        Self {
            label: class_selector(class),
            field: phase_selector(phase),
        }
    }

    /// Convert into kube list parameters, setting only non-empty selectors
    pub fn list_params(&self) -> ListParams {
        let mut params = ListParams::default();
        if !self.label.is_empty() {
            params = params.labels(&self.label);
        }
        if !self.field.is_empty() {
            params = params.fields(&self.field);
        }
        params
    }
}

/// `np.class=<class>`, or empty when no class is given
pub fn class_selector(class: Option<&str>) -> String {
    match class {
        Some(class) if !class.is_empty() => format!("{CLASS_LABEL_KEY}={class}"),
        _ => String::new(),
    }
}

/// `status.phase=<phase>`, or empty when no phase is given
pub fn phase_selector(phase: Option<PodPhase>) -> String {
    phase
        .map(|phase| format!("status.phase={phase}"))
        .unwrap_or_default()
}
