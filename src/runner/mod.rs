//! Scenario driver and step executors
//!
//! [`ScenarioRunner`] walks a scenario's steps in order. Each step goes to the
//! executor for its verb; the first failure stops the scenario and is
//! returned with the step's position. Only assertions retry, everything else
//! fails fast.
//!
//! Batched steps (create, change and delete of several resources) are not
//! transactional: resources handled before a failure stay as they are and
//! the remaining ones are not attempted.

mod assert;
mod change;
mod create;
mod delete;

pub use change::transition_condition;

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, instrument};

use crate::catalog::ClassCatalog;
use crate::gateway::ResourceGateway;
use crate::retry::{Sleeper, TokioSleeper};
use crate::scenario::{Scenario, Step};
use crate::{Error, Result, DEFAULT_POLL_INTERVAL};

/// Executes scenarios against a cluster
///
/// The runner holds no cluster state between steps; every step queries the
/// gateway afresh.
pub struct ScenarioRunner {
    gateway: Arc<dyn ResourceGateway>,
    catalog: Arc<ClassCatalog>,
    namespace: String,
    poll_interval: Duration,
    sleeper: Arc<dyn Sleeper>,
}

impl ScenarioRunner {
    /// Create a runner for pods in `namespace`
    pub fn new(
        gateway: Arc<dyn ResourceGateway>,
        catalog: Arc<ClassCatalog>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            catalog,
            namespace: namespace.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Override the interval between assertion polls
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Override how the runner waits between assertion polls
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Namespace pods are created and queried in
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Run every step of a scenario, stopping at the first failure
    #[instrument(skip_all, fields(scenario = %scenario.name))]
    pub async fn run_scenario(&self, scenario: &Scenario) -> Result<()> {
        let total = scenario.steps.len();
        info!(steps = total, "Running scenario");

        for (i, step) in scenario.steps.iter().enumerate() {
            let index = i + 1;
            info!(
                verb = %step.verb(),
                object = %step.object(),
                description = %step,
                "Running step [{index} / {total}]"
            );

            if let Err(e) = self.run_step(step).await {
                error!(step = index, error = %e, "Step failed, aborting scenario");
                return Err(Error::StepFailed {
                    index,
                    total,
                    verb: step.verb(),
                    source: Box::new(e),
                });
            }
        }

        info!("Scenario completed");
        Ok(())
    }

    /// Run a single step with the executor for its verb
    pub async fn run_step(&self, step: &Step) -> Result<()> {
        match step {
            Step::Assert(s) => self.run_assert(s).await,
            Step::Create(s) => self.run_create(s).await,
            Step::Change(s) => self.run_change(s).await,
            Step::Delete(s) => self.run_delete(s).await,
        }
    }
}
