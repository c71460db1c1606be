// src/pipeline/build.rs

//! Wiring a [`Watcher`] from configuration.

use std::sync::Arc;

#[cfg(any(feature = "s3", feature = "sns"))]
use aws_config::SdkConfig;

use crate::error::{AppError, Result};
use crate::models::{Config, NotifierBackend, StorageBackend};
use crate::notify::{LogNotifier, Notifier, WebhookNotifier};
use crate::pipeline::diff::DiffCalculator;
use crate::pipeline::watch::Watcher;
use crate::services::{FloorPlanParser, HttpFetcher};
use crate::storage::{LocalStore, SnapshotStore};
use crate::utils::http::create_async_client;

/// Lazily resolved AWS SDK configuration.
///
/// Only loaded when a selected backend actually talks to AWS.
#[derive(Default)]
struct AwsContext {
    #[cfg(any(feature = "s3", feature = "sns"))]
    sdk_config: Option<SdkConfig>,
}

impl AwsContext {
    #[cfg(any(feature = "s3", feature = "sns"))]
    async fn sdk_config(&mut self, config: &Config) -> &SdkConfig {
        let sdk_config = match self.sdk_config.take() {
            Some(sdk_config) => sdk_config,
            None => crate::config::load_sdk_config(&config.aws).await,
        };
        self.sdk_config.insert(sdk_config)
    }
}

/// Build the complete watcher for `config`.
pub async fn build_watcher(config: &Config) -> Result<Watcher> {
    let mut aws = AwsContext::default();

    let client = create_async_client(&config.target)?;
    let fetcher = Arc::new(HttpFetcher::new(client.clone()));
    let parser = FloorPlanParser::new(&config.selectors)?;
    let store = store_from(config, &mut aws).await?;
    let notifier = notifier_from(config, &mut aws, client).await?;

    log::info!(
        "Watching {} (store: {}, notifier: {})",
        config.target.url,
        store.location(),
        notifier.transport()
    );

    Ok(
        Watcher::new(config.target.url.clone(), fetcher, parser, store, notifier)
            .with_diff(DiffCalculator::from_config(&config.diff)),
    )
}

/// Build only the configured snapshot store.
pub async fn build_store(config: &Config) -> Result<Box<dyn SnapshotStore>> {
    store_from(config, &mut AwsContext::default()).await
}

#[allow(unused_variables)]
async fn store_from(config: &Config, aws: &mut AwsContext) -> Result<Box<dyn SnapshotStore>> {
    match config.storage.backend {
        StorageBackend::Local => Ok(Box::new(LocalStore::new(&config.storage.path))),
        #[cfg(feature = "s3")]
        StorageBackend::S3 => {
            let sdk_config = aws.sdk_config(config).await;
            Ok(Box::new(crate::storage::S3Store::from_sdk_config(
                sdk_config,
                &config.storage.bucket,
                &config.storage.key,
            )))
        }
        #[cfg(not(feature = "s3"))]
        StorageBackend::S3 => Err(AppError::config(
            "storage.backend = \"s3\" requires the `s3` feature",
        )),
    }
}

#[allow(unused_variables)]
async fn notifier_from(
    config: &Config,
    aws: &mut AwsContext,
    client: reqwest::Client,
) -> Result<Box<dyn Notifier>> {
    let subject = &config.notifier.subject;
    match config.notifier.backend {
        NotifierBackend::Log => Ok(Box::new(LogNotifier::new(subject))),
        NotifierBackend::Webhook => {
            if config.notifier.webhook_url.trim().is_empty() {
                return Err(AppError::config("notifier.webhook_url is required"));
            }
            Ok(Box::new(WebhookNotifier::new(
                client,
                &config.notifier.webhook_url,
                subject,
            )))
        }
        #[cfg(feature = "sns")]
        NotifierBackend::Sns => {
            let sdk_config = aws.sdk_config(config).await;
            Ok(Box::new(crate::notify::SnsNotifier::from_sdk_config(
                sdk_config,
                &config.notifier.topic_arn,
                subject,
            )))
        }
        #[cfg(not(feature = "sns"))]
        NotifierBackend::Sns => Err(AppError::config(
            "notifier.backend = \"sns\" requires the `sns` feature",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.storage.path = dir.path().join("snapshot.json").display().to_string();

        let watcher = build_watcher(&config).await.unwrap();
        assert!(watcher.store().location().ends_with("snapshot.json"));
    }

    #[tokio::test]
    async fn test_build_rejects_bad_selector() {
        let mut config = Config::default();
        config.selectors.heading = "!!".to_string();
        assert!(matches!(
            build_watcher(&config).await,
            Err(AppError::Selector { .. })
        ));
    }

    #[tokio::test]
    async fn test_webhook_requires_url() {
        let mut config = Config::default();
        config.notifier.backend = NotifierBackend::Webhook;
        assert!(matches!(
            build_watcher(&config).await,
            Err(AppError::Config(_))
        ));
    }
}
