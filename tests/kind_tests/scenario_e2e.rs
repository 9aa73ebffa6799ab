//! Whole scenarios through the Kubernetes-backed gateway
//!
//! Each story uses its own class so runs do not see each other's resources.

use std::sync::Arc;
use std::time::Duration;

use k8s_openapi::api::core::v1::Node;
use kube::api::Api;
use kube::ResourceExt;

use nodus::gateway::{KubeGateway, FAKE_NODE_ANNOTATION};
use nodus::runner::ScenarioRunner;
use nodus::scenario::parse_scenarios;

use super::helpers::{cleanup_classes, e2e_catalog, ensure_test_cluster, E2E_NAMESPACE};

fn runner(client: kube::Client, class: &str) -> ScenarioRunner {
    ScenarioRunner::new(
        Arc::new(KubeGateway::new(client)),
        Arc::new(e2e_catalog(class)),
        E2E_NAMESPACE,
    )
    .with_poll_interval(Duration::from_millis(500))
}

/// Story: an operator runs the worker lifecycle scenario on a live cluster
///
/// Expected behavior:
/// - Three pods of the class are created and immediately listable
/// - One of them is moved to Running through the status subresource
/// - The phase-filtered assertion sees exactly that pod
#[tokio::test]
#[ignore = "requires kind cluster - run with: cargo test --test kind -- --ignored"]
async fn story_worker_lifecycle_on_live_cluster() {
    let client = ensure_test_cluster()
        .await
        .expect("failed to setup cluster");
    let class = "e2e-lifecycle";
    cleanup_classes(&client, &[class]).await;

    let scenarios = parse_scenarios(
        r#"
name: worker-lifecycle
steps:
  - verb: Create
    create: { object: Pod, class: e2e-lifecycle, count: 3 }
  - verb: Assert
    assert: { object: Pod, class: e2e-lifecycle, count: 3, within: 10 }
  - verb: Change
    change: { object: Pod, class: e2e-lifecycle, count: 1, from: Pending, to: Running }
  - verb: Assert
    assert: { object: Pod, class: e2e-lifecycle, phase: Running, count: 1, within: 10 }
  - verb: Assert
    assert: { object: Pod, class: e2e-lifecycle, phase: Pending, count: 2, within: 10 }
"#,
        "inline",
    )
    .expect("scenario parses");

    let result = runner(client.clone(), class)
        .run_scenario(&scenarios[0])
        .await;
    cleanup_classes(&client, &[class]).await;
    result.expect("scenario should pass");
}

/// Story: fake nodes join the cluster as Ready and can be removed again
#[tokio::test]
#[ignore = "requires kind cluster - run with: cargo test --test kind -- --ignored"]
async fn story_fake_nodes_register_and_delete() {
    let client = ensure_test_cluster()
        .await
        .expect("failed to setup cluster");
    let class = "e2e-nodes";
    cleanup_classes(&client, &[class]).await;

    let scenarios = parse_scenarios(
        r#"
name: fake-nodes
steps:
  - verb: Create
    create: { object: Node, class: e2e-nodes, count: 2 }
  - verb: Assert
    assert: { object: Node, class: e2e-nodes, count: 2, within: 10 }
"#,
        "inline",
    )
    .expect("scenario parses");
    runner(client.clone(), class)
        .run_scenario(&scenarios[0])
        .await
        .expect("nodes should register");

    let nodes: Api<Node> = Api::all(client.clone());
    let node = nodes.get("e2e-nodes-0").await.expect("node exists");
    assert!(node.annotations().contains_key(FAKE_NODE_ANNOTATION));
    let ready = node
        .status
        .and_then(|s| s.conditions)
        .unwrap_or_default()
        .into_iter()
        .any(|c| c.type_ == "Ready" && c.status == "True");
    assert!(ready, "fake node should report Ready");

    let scenarios = parse_scenarios(
        r#"
name: drain-fake-nodes
steps:
  - verb: Delete
    delete: { object: Node, class: e2e-nodes, count: 2 }
  - verb: Assert
    assert: { object: Node, class: e2e-nodes, count: 0, within: 30 }
"#,
        "inline",
    )
    .expect("scenario parses");
    let result = runner(client.clone(), class)
        .run_scenario(&scenarios[0])
        .await;
    cleanup_classes(&client, &[class]).await;
    result.expect("nodes should be deleted");
}
