//! Scenario runs against a kind cluster
//!
//! These tests tell the story of an operator pointing nodus at a live control
//! plane: fake nodes are registered, pods are created without a scheduler
//! placing them, and pod phases are driven through the status subresource.
//!
//! # Test Organization
//!
//! - `scenario_e2e`: Stories that run whole scenarios through the
//!   Kubernetes-backed gateway
//!
//! # Running These Tests
//!
//! ```bash
//! cargo test --test kind -- --ignored --nocapture
//! ```

mod scenario_e2e;
