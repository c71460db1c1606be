//! AWS SNS notifier.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_sns::Client;

use crate::error::{AppError, Result};
use crate::models::Snapshot;
use crate::notify::{Notifier, format_message};

/// Publishes notifications to an SNS topic with a fixed subject.
#[derive(Clone)]
pub struct SnsNotifier {
    client: Client,
    topic_arn: String,
    subject: String,
}

impl SnsNotifier {
    pub fn new(client: Client, topic_arn: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            client,
            topic_arn: topic_arn.into(),
            subject: subject.into(),
        }
    }

    /// Create a notifier from an already-resolved SDK configuration.
    pub fn from_sdk_config(
        sdk_config: &SdkConfig,
        topic_arn: impl Into<String>,
        subject: impl Into<String>,
    ) -> Self {
        Self::new(Client::new(sdk_config), topic_arn, subject)
    }
}

#[async_trait]
impl Notifier for SnsNotifier {
    async fn notify(&self, snapshot: &Snapshot) -> Result<()> {
        let output = self
            .client
            .publish()
            .topic_arn(&self.topic_arn)
            .subject(&self.subject)
            .message(format_message(snapshot))
            .send()
            .await
            .map_err(|e| AppError::notify(self.transport(), e.into_service_error()))?;

        log::info!(
            "Published availability notification to {} (message id {})",
            self.topic_arn,
            output.message_id().unwrap_or("unknown")
        );
        Ok(())
    }

    fn transport(&self) -> &'static str {
        "sns"
    }
}
