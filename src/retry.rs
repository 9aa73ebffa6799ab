//! Bounded retry with an injectable sleeper.
//!
//! Assertions poll the cluster until it converges or the attempt budget runs
//! out. The wait between attempts goes through [`Sleeper`] so tests can run
//! the loop without wall-clock delay.
//!
//! # Example
//!
//! ```ignore
//! use nodus::retry::{retry_with_interval, RetryConfig, TokioSleeper};
//!
//! let nodes = retry_with_interval(
//!     &RetryConfig::fixed(5, Duration::from_secs(1)),
//!     &TokioSleeper,
//!     "list_nodes",
//!     || async { gateway.list_nodes("np.class=worker").await },
//! ).await?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, warn};

/// Suspends the caller between retry attempts
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Wait for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Configuration for a bounded, fixed-interval retry loop.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of attempts; at least one attempt always runs
    pub max_attempts: u32,
    /// Delay between attempts
    pub interval: Duration,
}

impl RetryConfig {
    /// Fixed-interval config with the given attempt budget
    pub fn fixed(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// Fixed-interval config that spends a wait budget in whole intervals
    ///
    /// A budget shorter than one interval still gets a single attempt.
    pub fn within(budget: Duration, interval: Duration) -> Self {
        let attempts = if interval.is_zero() {
            u128::from(budget.as_secs())
        } else {
            budget.as_nanos() / interval.as_nanos()
        };
        let attempts = u32::try_from(attempts).unwrap_or(u32::MAX).max(1);
        Self::fixed(attempts, interval)
    }
}

/// Execute an async operation until it succeeds or the attempts run out.
///
/// The sleeper waits between attempts, never after the last one.
///
/// # Arguments
/// * `config` - Retry configuration
/// * `sleeper` - Performs the wait between attempts
/// * `operation_name` - Name for logging purposes
/// * `operation` - The async operation to retry
///
/// # Returns
/// The result of the operation, or the last error once `max_attempts` is exhausted.
pub async fn retry_with_interval<F, Fut, T, E>(
    config: &RetryConfig,
    sleeper: &dyn Sleeper,
    operation_name: &str,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                if attempt >= max_attempts {
                    error!(
                        operation = %operation_name,
                        attempt = attempt,
                        error = %e,
                        "Operation failed after max retries"
                    );
                    return Err(e);
                }

                warn!(
                    operation = %operation_name,
                    attempt = attempt,
                    max_attempts = max_attempts,
                    error = %e,
                    delay_ms = config.interval.as_millis(),
                    "Operation failed, retrying"
                );

                sleeper.sleep(config.interval).await;
            }
        }
    }
}
