// src/lambda/mod.rs

//! AWS Lambda handler for the watcher.
//!
//! Each invocation:
//! 1. Loads config from S3 (when `CONFIG_S3_BUCKET`/`CONFIG_S3_KEY` are set)
//!    or defaults, then applies environment overrides
//! 2. Checks the backends suit the read-only Lambda filesystem (S3, or a
//!    local file under `/tmp`) and actually deliver (webhook or SNS)
//! 3. Builds the watcher
//! 4. Runs it under the retry policy, bounded by the invocation deadline

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use lambda_runtime::{Error as LambdaError, LambdaEvent};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, instrument};

use crate::config::{S3ConfigLoader, load_sdk_config};
use crate::error::{AppError, Result};
use crate::models::{Config, NotifierBackend, StorageBackend};
use crate::pipeline::{RetryOutcome, RetryPolicy, build_watcher};

/// Only writable directory in the Lambda execution environment.
const WRITABLE_DIR: &str = "/tmp/";

/// Time kept in reserve for returning the response before the function times out.
const DEADLINE_MARGIN: Duration = Duration::from_secs(5);

/// Lambda response payload.
#[derive(Debug, Serialize, Default)]
pub struct WatchResponse {
    /// Whether a run completed within the retry budget
    pub success: bool,

    /// Number of pipeline attempts made
    pub attempts: u32,

    /// Error message if setup failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Execution time in milliseconds
    pub execution_time_ms: u64,
}

/// Main Lambda handler function.
#[instrument(skip(event))]
pub async fn handler(event: LambdaEvent<Value>) -> std::result::Result<WatchResponse, LambdaError> {
    let start = std::time::Instant::now();
    let (_payload, context) = event.into_parts();

    let budget = retry_budget(context.deadline, epoch_millis());
    info!("Starting watch run, retry budget {:?}", budget);

    match run_watch(budget).await {
        Ok(outcome) => {
            let response = WatchResponse {
                success: outcome.success,
                attempts: outcome.attempts,
                error: None,
                execution_time_ms: start.elapsed().as_millis() as u64,
            };
            info!(
                "Watch finished: success={} after {} attempts in {}ms",
                response.success, response.attempts, response.execution_time_ms
            );
            Ok(response)
        }
        Err(e) => {
            error!("Watch setup failed: {}", e);
            Ok(WatchResponse {
                error: Some(e.to_string()),
                execution_time_ms: start.elapsed().as_millis() as u64,
                ..Default::default()
            })
        }
    }
}

/// Internal watch logic.
async fn run_watch(budget: Option<Duration>) -> Result<RetryOutcome> {
    let mut config = load_lambda_config().await?;
    config.apply_env_overrides();
    config.validate()?;
    check_lambda_backends(&config)?;

    let watcher = build_watcher(&config).await?;

    let mut policy = RetryPolicy::from_config(&config.retry);
    if let Some(budget) = budget {
        policy = policy.with_deadline(tokio::time::Instant::now() + budget);
    }

    Ok(watcher
        .run_with_retry(&policy, |success| {
            if success {
                info!("Availability check completed");
            } else {
                error!("Availability check failed after all retries");
            }
        })
        .await)
}

async fn load_lambda_config() -> Result<Config> {
    let mut bootstrap = Config::default();
    bootstrap.apply_env_overrides();
    let sdk_config = load_sdk_config(&bootstrap.aws).await;
    match S3ConfigLoader::from_env(&sdk_config) {
        Some(loader) => loader.load_config().await,
        None => {
            info!("CONFIG_S3_BUCKET/CONFIG_S3_KEY not set; using defaults");
            Ok(Config::default())
        }
    }
}

/// Reject backends that cannot work inside Lambda.
pub fn check_lambda_backends(config: &Config) -> Result<()> {
    if config.storage.backend == StorageBackend::Local
        && !config.storage.path.starts_with(WRITABLE_DIR)
    {
        return Err(AppError::config(format!(
            "local snapshot path '{}' is not writable in Lambda; set S3_BUCKET or a path under {}",
            config.storage.path, WRITABLE_DIR
        )));
    }
    if config.notifier.backend == NotifierBackend::Log {
        return Err(AppError::config(
            "the log notifier delivers nothing in Lambda; set SNS_TOPIC_ARN or WEBHOOK_URL",
        ));
    }
    Ok(())
}

/// Time left for retries given the invocation deadline, both in epoch
/// milliseconds. `None` when the runtime reported no deadline.
pub fn retry_budget(deadline_ms: u64, now_ms: u64) -> Option<Duration> {
    if deadline_ms == 0 {
        return None;
    }
    let remaining = Duration::from_millis(deadline_ms.saturating_sub(now_ms));
    Some(remaining.saturating_sub(DEADLINE_MARGIN))
}

fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deployable_config() -> Config {
        let mut config = Config::default();
        config.storage.backend = StorageBackend::S3;
        config.storage.bucket = "plans-bucket".to_string();
        config.notifier.backend = NotifierBackend::Sns;
        config.notifier.topic_arn = "arn:aws:sns:us-east-1:123456789012:plans".to_string();
        config
    }

    #[test]
    fn test_default_config_is_rejected() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        let err = check_lambda_backends(&config).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("storage/snapshot.json"));
    }

    #[test]
    fn test_log_notifier_is_rejected() {
        let mut config = deployable_config();
        config.notifier.backend = NotifierBackend::Log;
        assert!(matches!(
            check_lambda_backends(&config),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_lambda_backends_accepted() {
        assert!(check_lambda_backends(&deployable_config()).is_ok());

        let mut config = deployable_config();
        config.storage.backend = StorageBackend::Local;
        config.storage.path = "/tmp/snapshot.json".to_string();
        config.notifier.backend = NotifierBackend::Webhook;
        config.notifier.webhook_url = "https://hooks.example.com/plans".to_string();
        assert!(check_lambda_backends(&config).is_ok());
    }

    #[test]
    fn test_retry_budget_keeps_margin() {
        assert_eq!(
            retry_budget(100_000, 40_000),
            Some(Duration::from_secs(55))
        );
    }

    #[test]
    fn test_retry_budget_past_deadline_is_zero() {
        assert_eq!(retry_budget(10_000, 8_000), Some(Duration::ZERO));
        assert_eq!(retry_budget(10_000, 20_000), Some(Duration::ZERO));
    }

    #[test]
    fn test_retry_budget_without_deadline() {
        assert_eq!(retry_budget(0, 1_000), None);
    }

    #[test]
    fn test_response_serialization() {
        let ok = WatchResponse {
            success: true,
            attempts: 2,
            error: None,
            execution_time_ms: 1234,
        };
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": true, "attempts": 2, "execution_time_ms": 1234})
        );

        let failed = WatchResponse {
            error: Some("Config error: missing".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Config error: missing");
    }
}
