//! Nodus - run cluster scenarios from the command line

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use nodus::catalog::ClassCatalog;
use nodus::gateway::{create_client, KubeGateway};
use nodus::runner::ScenarioRunner;
use nodus::scenario::{load_scenarios, Scenario};

/// Nodus - scenario-driven harness for Kubernetes control planes
#[derive(Parser, Debug)]
#[command(name = "nodus", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run scenarios against a cluster
    ///
    /// Scenarios run in the order given; the first failing scenario stops
    /// the run.
    Run(RunArgs),

    /// Check scenarios against the class catalog without touching a cluster
    Check(CatalogArgs),
}

/// Catalog and scenario inputs shared by every command
#[derive(Parser, Debug)]
struct CatalogArgs {
    /// Node class catalog (YAML with `nodeClasses`)
    #[arg(long, env = "NODUS_NODE_CONFIG")]
    node_config: Option<PathBuf>,

    /// Pod class catalog (YAML with `podClasses`)
    #[arg(long, env = "NODUS_POD_CONFIG")]
    pod_config: Option<PathBuf>,

    /// Scenario files
    #[arg(required = true)]
    scenarios: Vec<PathBuf>,
}

/// Run mode arguments
#[derive(Parser, Debug)]
struct RunArgs {
    #[command(flatten)]
    catalog: CatalogArgs,

    /// Path to a kubeconfig; inferred when omitted
    #[arg(long, env = "KUBECONFIG")]
    kubeconfig: Option<PathBuf>,

    /// Namespace pods are created in
    #[arg(short, long, env = "NODUS_NAMESPACE", default_value = nodus::DEFAULT_NAMESPACE)]
    namespace: String,

    /// Interval between assertion polls in milliseconds
    #[arg(long, default_value = "1000")]
    assert_interval_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => run(args).await,
        Commands::Check(args) => check(args),
    }
}

fn load_inputs(args: &CatalogArgs) -> anyhow::Result<(ClassCatalog, Vec<Scenario>)> {
    let catalog = ClassCatalog::load(args.node_config.as_deref(), args.pod_config.as_deref())?;
    let mut scenarios = Vec::new();
    for path in &args.scenarios {
        scenarios.extend(load_scenarios(path)?);
    }
    Ok((catalog, scenarios))
}

/// Validate inputs offline
fn check(args: CatalogArgs) -> anyhow::Result<()> {
    let (catalog, scenarios) = load_inputs(&args)?;
    for scenario in &scenarios {
        catalog
            .check_scenario(scenario)
            .map_err(|e| anyhow::anyhow!("scenario {}: {}", scenario.name, e))?;
        println!("ok: {} ({} steps)", scenario.name, scenario.steps.len());
    }
    Ok(())
}

/// Run scenarios in order against the configured cluster
async fn run(args: RunArgs) -> anyhow::Result<()> {
    let (catalog, scenarios) = load_inputs(&args.catalog)?;

    let client = create_client(args.kubeconfig.as_deref()).await?;
    let runner = ScenarioRunner::new(
        Arc::new(KubeGateway::new(client)),
        Arc::new(catalog),
        args.namespace,
    )
    .with_poll_interval(Duration::from_millis(args.assert_interval_ms));

    tracing::info!(
        scenarios = scenarios.len(),
        namespace = %runner.namespace(),
        "Starting run"
    );
    for scenario in &scenarios {
        runner
            .run_scenario(scenario)
            .await
            .map_err(|e| anyhow::anyhow!("scenario {} failed: {}", scenario.name, e))?;
    }
    tracing::info!("All scenarios passed");
    Ok(())
}
