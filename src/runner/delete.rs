//! Delete executor: remove resources of a class

use kube::ResourceExt;
use tracing::{debug, info};

use super::ScenarioRunner;
use crate::scenario::{DeleteStep, ObjectKind};
use crate::selector::Selector;
use crate::{Error, Result};

impl ScenarioRunner {
    /// Delete the first `step.count` resources of a class, in query order
    ///
    /// A failed query surfaces as a gateway error, distinct from a query
    /// that found nothing.
    pub async fn run_delete(&self, step: &DeleteStep) -> Result<()> {
        let class = Some(step.class.as_str());
        let names: Vec<String> = match step.object {
            ObjectKind::Node => {
                let selector = Selector::nodes(class);
                self.gateway
                    .list_nodes(&selector.label)
                    .await?
                    .iter()
                    .map(|node| node.name_any())
                    .collect()
            }
            ObjectKind::Pod => {
                let selector = Selector::pods(class, None);
                self.gateway
                    .list_pods(&self.namespace, &selector.label, &selector.field)
                    .await?
                    .iter()
                    .map(|pod| pod.name_any())
                    .collect()
            }
        };

        if names.is_empty() && step.count > 0 {
            return Err(Error::NotFound {
                kind: step.object,
                class: step.class.clone(),
                phase: None,
                expected: step.count,
            });
        }
        if (names.len() as u64) < step.count {
            return Err(Error::InsufficientCount {
                kind: step.object,
                class: step.class.clone(),
                phase: None,
                expected: step.count,
                found: names.len(),
            });
        }

        for name in names.iter().take(step.count as usize) {
            debug!(kind = %step.object, name = %name, "Deleting");
            match step.object {
                ObjectKind::Node => self.gateway.delete_node(name).await?,
                ObjectKind::Pod => self.gateway.delete_pod(&self.namespace, name).await?,
            }
        }

        info!(kind = %step.object, class = %step.class, count = step.count, "Deleted resources");
        Ok(())
    }
}
