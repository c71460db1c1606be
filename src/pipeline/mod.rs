//! Watch pipeline.
//!
//! - `watch`: one fetch -> parse -> diff -> save -> notify run
//! - `retry`: bounded exponential backoff around a run
//! - `diff`: snapshot comparison
//! - `build`: wiring a watcher from configuration

pub mod build;
pub mod diff;
pub mod retry;
pub mod watch;

pub use build::{build_store, build_watcher};
pub use diff::{DiffCalculator, DiffResult, calculate_diff, has_changed};
pub use retry::{RetryOutcome, RetryPolicy, run_with_backoff};
pub use watch::{RunOutcome, Watcher};
