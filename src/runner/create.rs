//! Create executor: instantiate catalog classes

use tracing::info;

use super::ScenarioRunner;
use crate::scenario::{CreateStep, ObjectKind};
use crate::{Error, Result};

impl ScenarioRunner {
    /// Create `step.count` resources named `<class>-<i>` from the catalog
    ///
    /// The class is resolved before anything is written. Pods are created
    /// in the runner's namespace; nodes are registered as fake nodes.
    pub async fn run_create(&self, step: &CreateStep) -> Result<()> {
        let failed = |index: u64, e: Error| Error::CreateFailed {
            kind: step.object,
            class: step.class.clone(),
            index,
            source: Box::new(e),
        };

        match step.object {
            ObjectKind::Node => {
                let class = self.catalog.node_class(&step.class)?;
                let labels = class.labels();
                for i in 0..step.count {
                    let name = format!("{}-{}", class.name, i);
                    self.gateway
                        .register_fake_node(&name, &class.name, &labels, &class.resources)
                        .await
                        .map_err(|e| failed(i, e))?;
                }
            }
            ObjectKind::Pod => {
                let class = self.catalog.pod_class(&step.class)?;
                let labels = class.labels();
                for i in 0..step.count {
                    let name = format!("{}-{}", class.name, i);
                    self.gateway
                        .create_pod(&self.namespace, &name, &labels, &class.spec)
                        .await
                        .map_err(|e| failed(i, e))?;
                }
            }
        }

        info!(kind = %step.object, class = %step.class, count = step.count, "Created resources");
        Ok(())
    }
}
