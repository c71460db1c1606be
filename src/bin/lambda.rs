//! AWS Lambda entry point for floorplan-watch
//!
//! Deploy with `cargo lambda build --release --features lambda`
//! and schedule the function with an EventBridge rule.

use lambda_runtime::{Error as LambdaError, service_fn};

use floorplan_watch::lambda::handler;
use floorplan_watch::models::Config;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the AWS Lambda function.
#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let mut config = Config::default();
        config.apply_env_overrides();
        EnvFilter::new(config.logging.level())
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("floorplan-watch Lambda starting...");
    lambda_runtime::run(service_fn(handler)).await
}
