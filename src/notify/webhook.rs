//! HTTP webhook notifier.
//!
//! Posts `{"subject": ..., "text": ...}` as JSON, which chat services with
//! incoming-webhook support accept directly.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::Snapshot;
use crate::notify::{Notifier, format_message};

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    subject: &'a str,
    text: String,
}

/// Notifier posting messages to an HTTP endpoint.
#[derive(Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: String,
    subject: String,
}

impl WebhookNotifier {
    pub fn new(client: Client, url: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            subject: subject.into(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, snapshot: &Snapshot) -> Result<()> {
        let payload = WebhookPayload {
            subject: &self.subject,
            text: format_message(snapshot),
        };

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::notify(self.transport(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::notify(
                self.transport(),
                format!("endpoint answered HTTP {}", status.as_u16()),
            ));
        }

        log::info!("Posted availability notification to webhook");
        Ok(())
    }

    fn transport(&self) -> &'static str {
        "webhook"
    }
}
