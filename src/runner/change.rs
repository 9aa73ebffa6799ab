//! Change executor: move pods between lifecycle phases
//!
//! The executor performs exactly the requested transition. Whether that
//! transition is a legal edge of the pod lifecycle is up to the scenario
//! author.

use chrono::Utc;
use k8s_openapi::api::core::v1::{Pod, PodCondition};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use kube::ResourceExt;
use tracing::{debug, info};

use super::ScenarioRunner;
use crate::scenario::{ChangeStep, ConditionStatus, ObjectKind, PodPhase, Verb};
use crate::selector::Selector;
use crate::{Error, Result};

/// Status of the condition recorded for a `from -> to` transition
///
/// `True` when a pending pod starts running, `False` when a pod terminates,
/// `Unknown` for anything else.
pub fn transition_condition(from: PodPhase, to: PodPhase) -> ConditionStatus {
    if from == PodPhase::Pending && to == PodPhase::Running {
        ConditionStatus::True
    } else if to.is_terminal() {
        ConditionStatus::False
    } else {
        ConditionStatus::Unknown
    }
}

/// Copy of `pod` in phase `to` with the transition condition appended
fn transitioned(pod: &Pod, from: PodPhase, to: PodPhase) -> Pod {
    let mut pod = pod.clone();
    let status = pod.status.get_or_insert_with(Default::default);
    status.phase = Some(to.to_string());
    status
        .conditions
        .get_or_insert_with(Vec::new)
        .push(PodCondition {
            type_: to.to_string(),
            status: transition_condition(from, to).to_string(),
            last_transition_time: Some(Time(Utc::now())),
            ..Default::default()
        });
    pod
}

impl ScenarioRunner {
    /// Move `step.count` pods of a class from `step.from` to `step.to`
    ///
    /// Pods are taken in the order the query returns them. Nothing is
    /// updated unless enough pods are found.
    pub async fn run_change(&self, step: &ChangeStep) -> Result<()> {
        if step.object != ObjectKind::Pod {
            return Err(Error::UnsupportedObject {
                verb: Verb::Change,
                object: step.object,
            });
        }
        if step.from == step.to {
            return Err(Error::NoOpTransition { phase: step.from });
        }

        let selector = Selector::pods(Some(&step.class), Some(step.from));
        let pods = self
            .gateway
            .list_pods(&self.namespace, &selector.label, &selector.field)
            .await?;

        if pods.is_empty() {
            return Err(Error::NotFound {
                kind: ObjectKind::Pod,
                class: step.class.clone(),
                phase: Some(step.from),
                expected: step.count,
            });
        }
        if (pods.len() as u64) < step.count {
            return Err(Error::InsufficientCount {
                kind: ObjectKind::Pod,
                class: step.class.clone(),
                phase: Some(step.from),
                expected: step.count,
                found: pods.len(),
            });
        }

        for pod in pods.iter().take(step.count as usize) {
            debug!(pod = %pod.name_any(), from = %step.from, to = %step.to, "Changing pod phase");
            self.gateway
                .update_pod_status(&self.namespace, &transitioned(pod, step.from, step.to))
                .await?;
        }

        info!(
            class = %step.class,
            count = step.count,
            from = %step.from,
            to = %step.to,
            "Changed pod phases"
        );
        Ok(())
    }
}
