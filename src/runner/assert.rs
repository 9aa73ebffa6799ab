//! Assert executor: poll until the cluster shows the expected count

use tracing::debug;

use super::ScenarioRunner;
use crate::retry::{retry_with_interval, RetryConfig};
use crate::scenario::{AssertStep, ObjectKind};
use crate::selector::Selector;
use crate::{Error, Result};

impl ScenarioRunner {
    /// Verify that `step.count` resources match, retrying within the step's
    /// wait budget
    ///
    /// The budget is spent in whole poll intervals with at least one poll.
    /// A gateway error on one poll is retried like a mismatch.
    pub async fn run_assert(&self, step: &AssertStep) -> Result<()> {
        if step.object == ObjectKind::Node && step.phase.is_some() {
            return Err(Error::validation("node assertions do not take a phase"));
        }

        let config = RetryConfig::within(step.within, self.poll_interval);
        retry_with_interval(&config, self.sleeper.as_ref(), "assert", || {
            self.check_count(step)
        })
        .await
    }

    async fn check_count(&self, step: &AssertStep) -> Result<()> {
        let class = step.class.as_deref();
        let found = match step.object {
            ObjectKind::Node => {
                let selector = Selector::nodes(class);
                self.gateway.list_nodes(&selector.label).await?.len()
            }
            ObjectKind::Pod => {
                let selector = Selector::pods(class, step.phase);
                self.gateway
                    .list_pods(&self.namespace, &selector.label, &selector.field)
                    .await?
                    .len()
            }
        };

        if found as u64 != step.count {
            return Err(Error::CountMismatch {
                kind: step.object,
                class: step.class.clone(),
                phase: step.phase,
                expected: step.count,
                found,
            });
        }
        debug!(kind = %step.object, found, "Assertion satisfied");
        Ok(())
    }
}
