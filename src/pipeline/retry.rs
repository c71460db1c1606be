//! Bounded exponential-backoff retry.
//!
//! Runs a unit of work that reports success as a `bool`. Failed attempts are
//! retried after `d, 2d, 4d, ...` until the retry budget is spent. The budget
//! counts down from `max_attempts`, so the work runs at most
//! `max_attempts + 1` times; once the counter reaches zero the controller
//! stops immediately.
//!
//! Waiting uses `tokio::time::sleep`, so the runtime thread is never blocked
//! during a backoff.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::models::RetryConfig;

/// Retry policy for [`run_with_backoff`].
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Give up instead of sleeping past this instant
    pub deadline: Option<Instant>,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            deadline: None,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, config.initial_delay())
    }

    /// Stop retrying when the next backoff would end after `deadline`.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    fn allows_wait(&self, delay: Duration) -> bool {
        match self.deadline {
            Some(deadline) => Instant::now()
                .checked_add(delay)
                .is_some_and(|resume_at| resume_at <= deadline),
            None => true,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

/// Final result of a retried run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryOutcome {
    pub success: bool,
    /// Number of times the unit of work ran
    pub attempts: u32,
}

/// Run `unit_of_work` under `policy`, calling `on_done` exactly once with the
/// final result.
pub async fn run_with_backoff<W, Fut, D>(
    policy: &RetryPolicy,
    mut unit_of_work: W,
    on_done: D,
) -> RetryOutcome
where
    W: FnMut() -> Fut,
    Fut: Future<Output = bool>,
    D: FnOnce(bool),
{
    let mut remaining = policy.max_attempts;
    let mut delay = policy.initial_delay;
    let mut attempts = 0;

    loop {
        attempts += 1;

        if unit_of_work().await {
            log::info!("Attempt {} succeeded", attempts);
            on_done(true);
            return RetryOutcome {
                success: true,
                attempts,
            };
        }

        if remaining == 0 {
            log::error!("Giving up after {} attempts", attempts);
            on_done(false);
            return RetryOutcome {
                success: false,
                attempts,
            };
        }

        if !policy.allows_wait(delay) {
            log::error!(
                "Giving up after {} attempts: next retry in {:?} would pass the deadline",
                attempts,
                delay
            );
            on_done(false);
            return RetryOutcome {
                success: false,
                attempts,
            };
        }

        log::warn!(
            "Attempt {} failed; retrying in {:?} ({} retries left)",
            attempts,
            delay,
            remaining
        );
        tokio::time::sleep(delay).await;

        delay = delay.saturating_mul(2);
        remaining -= 1;
    }
}
