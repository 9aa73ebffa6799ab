//! Nodus - scenario-driven harness for Kubernetes control planes
//!
//! Nodus interprets scripted scenarios of `assert`, `create`, `change` and
//! `delete` steps against a live cluster. Steps act on nodes and pods grouped
//! by a class label, so an operator can describe the cluster states they
//! expect (or want) and let the harness drive or verify them.
//!
//! # Architecture
//!
//! - A [`scenario::Scenario`] is an ordered list of typed steps
//! - The [`runner::ScenarioRunner`] executes steps one at a time and stops at
//!   the first failure
//! - Every call to the control plane goes through the
//!   [`gateway::ResourceGateway`] trait, so the engine can run against a real
//!   cluster or an in-memory one
//! - Resource templates for `create` come from the read-only
//!   [`catalog::ClassCatalog`]
//!
//! # Modules
//!
//! - [`scenario`] - Scenario and step types, YAML loading
//! - [`runner`] - Scenario driver and per-verb step executors
//! - [`gateway`] - Control-plane capability trait and its kube-rs implementation
//! - [`catalog`] - Node and pod class templates
//! - [`selector`] - Label/field selector construction
//! - [`retry`] - Bounded retry with an injectable sleeper
//! - [`error`] - Error types for the harness

#![deny(missing_docs)]

pub mod catalog;
pub mod error;
pub mod gateway;
pub mod retry;
pub mod runner;
pub mod scenario;
pub mod selector;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

// =============================================================================
// Default Configuration Constants
// =============================================================================

/// Label key that groups nodes and pods into classes
///
/// Every resource created from the class catalog carries `np.class=<class>`,
/// and every class-scoped query selects on it.
pub const CLASS_LABEL_KEY: &str = "np.class";

/// Namespace used for pods when none is configured
pub const DEFAULT_NAMESPACE: &str = "default";

/// Interval between assertion polls
pub const DEFAULT_POLL_INTERVAL: std::time::Duration = std::time::Duration::from_secs(1);
