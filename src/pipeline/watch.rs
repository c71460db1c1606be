// src/pipeline/watch.rs

//! Single watch run: fetch -> parse -> load previous -> diff -> save + notify.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::models::Snapshot;
use crate::notify::Notifier;
use crate::pipeline::diff::{DiffCalculator, DiffResult};
use crate::pipeline::retry::{RetryOutcome, RetryPolicy, run_with_backoff};
use crate::services::{DocumentFetcher, FloorPlanParser};
use crate::storage::SnapshotStore;

/// Summary of one successful run.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    /// Whether the page differed from the stored snapshot
    pub changed: bool,
    pub plan_count: usize,
    pub unit_count: usize,
    /// Fingerprint of the fetched snapshot
    pub fingerprint: String,
    pub diff: DiffResult,
    pub checked_at: DateTime<Utc>,
}

/// Change-detection pipeline over pluggable collaborators.
pub struct Watcher {
    url: String,
    fetcher: Arc<dyn DocumentFetcher>,
    parser: FloorPlanParser,
    store: Box<dyn SnapshotStore>,
    notifier: Box<dyn Notifier>,
    diff: DiffCalculator,
}

impl Watcher {
    pub fn new(
        url: impl Into<String>,
        fetcher: Arc<dyn DocumentFetcher>,
        parser: FloorPlanParser,
        store: Box<dyn SnapshotStore>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            url: url.into(),
            fetcher,
            parser,
            store,
            notifier,
            diff: DiffCalculator::new(),
        }
    }

    /// Replace the default order-sensitive diff calculator.
    pub fn with_diff(mut self, diff: DiffCalculator) -> Self {
        self.diff = diff;
        self
    }

    pub fn store(&self) -> &dyn SnapshotStore {
        self.store.as_ref()
    }

    /// Fetch and parse the target page without touching the store.
    pub async fn fetch_snapshot(&self) -> Result<Snapshot> {
        let document = self.fetcher.fetch(&self.url).await?;
        self.parser.parse(&document)
    }

    /// Run the pipeline once, propagating the first failure.
    ///
    /// The snapshot is saved before notifying; a failed save skips the
    /// notification so the next run reports the same change again.
    pub async fn execute(&self) -> Result<RunOutcome> {
        let current = self.fetch_snapshot().await?;
        let previous = self.store.load().await;

        let diff = self.diff.calculate(&previous, &current);
        if diff.has_changes() {
            log::info!(
                "Availability changed ({}); saving to {}",
                diff.summary(),
                self.store.location()
            );
            self.store.save(&current).await?;
            self.notifier.notify(&current).await?;
            log::info!("Sent notification via {}", self.notifier.transport());
        } else {
            log::info!("No availability changes across {} floor plans", current.len());
        }

        Ok(RunOutcome {
            changed: diff.has_changes(),
            plan_count: current.len(),
            unit_count: current.unit_count(),
            fingerprint: current.fingerprint(),
            diff,
            checked_at: Utc::now(),
        })
    }

    /// Run the pipeline once, reducing any failure to `false`.
    ///
    /// Returns `true` whenever the run completed, changed or not.
    pub async fn run_once(&self) -> bool {
        match self.execute().await {
            Ok(outcome) => {
                log::debug!(
                    "Run complete: {} plans, {} units, fingerprint {}",
                    outcome.plan_count,
                    outcome.unit_count,
                    outcome.fingerprint
                );
                true
            }
            Err(e) => {
                log::error!("Watch run failed: {}", e);
                false
            }
        }
    }

    /// Run the pipeline under the retry controller.
    pub async fn run_with_retry<D>(&self, policy: &RetryPolicy, on_done: D) -> RetryOutcome
    where
        D: FnOnce(bool),
    {
        run_with_backoff(policy, || self.run_once(), on_done).await
    }
}
