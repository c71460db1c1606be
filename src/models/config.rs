//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::FloorPlanSelectors;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Page to watch and HTTP behavior
    #[serde(default)]
    pub target: TargetConfig,

    /// Markup selectors for the target page
    #[serde(default)]
    pub selectors: FloorPlanSelectors,

    /// Where the last snapshot is persisted
    #[serde(default)]
    pub storage: StorageConfig,

    /// How change notifications are delivered
    #[serde(default)]
    pub notifier: NotifierConfig,

    /// Backoff policy for the whole pipeline
    #[serde(default)]
    pub retry: RetryConfig,

    /// Snapshot comparison settings
    #[serde(default)]
    pub diff: DiffConfig,

    /// Logging toggles
    #[serde(default)]
    pub logging: LoggingConfig,

    /// AWS client settings (region/profile); credentials use the default chain
    #[serde(default)]
    pub aws: AwsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Override values from process environment variables.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Override values from a key lookup (environment-style names).
    ///
    /// A non-empty `S3_BUCKET` switches storage to S3. A non-empty
    /// `WEBHOOK_URL` switches notifications to the webhook, and a non-empty
    /// `SNS_TOPIC_ARN` switches them to SNS, taking precedence over the webhook.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("TARGET_URL") {
            self.target.url = url;
        }
        if let Some(path) = get("SNAPSHOT_PATH") {
            self.storage.path = path;
        }
        if let Some(bucket) = get("S3_BUCKET") {
            self.storage.bucket = bucket;
            self.storage.backend = StorageBackend::S3;
        }
        if let Some(key) = get("S3_KEY") {
            self.storage.key = key;
        }
        if let Some(url) = get("WEBHOOK_URL") {
            self.notifier.webhook_url = url;
            self.notifier.backend = NotifierBackend::Webhook;
        }
        if let Some(arn) = get("SNS_TOPIC_ARN") {
            self.notifier.topic_arn = arn;
            self.notifier.backend = NotifierBackend::Sns;
        }
        if let Some(subject) = get("NOTIFY_SUBJECT") {
            self.notifier.subject = subject;
        }
        if let Some(n) = get("MAX_ATTEMPTS").and_then(|v| v.parse().ok()) {
            self.retry.max_attempts = n;
        }
        if let Some(ms) = get("INITIAL_DELAY_MS").and_then(|v| v.parse().ok()) {
            self.retry.initial_delay_ms = ms;
        }
        if let Some(debug) = get("DEBUG") {
            self.logging.debug = matches!(debug.to_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Some(profile) = get("AWS_PROFILE_NAME") {
            self.aws.profile = Some(profile);
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.target.url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::validation(format!(
                "target.url must be http(s), got '{}'",
                url.scheme()
            )));
        }
        if self.target.user_agent.trim().is_empty() {
            return Err(AppError::validation("target.user_agent is empty"));
        }
        if self.target.timeout_secs == 0 {
            return Err(AppError::validation("target.timeout_secs must be > 0"));
        }
        for (name, value) in self.selectors.named() {
            if value.trim().is_empty() {
                return Err(AppError::validation(format!("selectors.{name} is empty")));
            }
        }

        match self.storage.backend {
            StorageBackend::Local if self.storage.path.trim().is_empty() => {
                return Err(AppError::validation("storage.path is empty"));
            }
            StorageBackend::S3 if self.storage.bucket.trim().is_empty() => {
                return Err(AppError::validation("storage.bucket is required for s3"));
            }
            StorageBackend::S3 if self.storage.key.trim().is_empty() => {
                return Err(AppError::validation("storage.key is required for s3"));
            }
            _ => {}
        }

        match self.notifier.backend {
            NotifierBackend::Sns if self.notifier.topic_arn.trim().is_empty() => {
                return Err(AppError::validation("notifier.topic_arn is required for sns"));
            }
            NotifierBackend::Webhook => {
                url::Url::parse(&self.notifier.webhook_url).map_err(|e| {
                    AppError::validation(format!("notifier.webhook_url is invalid: {e}"))
                })?;
            }
            _ => {}
        }
        if self.notifier.subject.trim().is_empty() {
            return Err(AppError::validation("notifier.subject is empty"));
        }

        Ok(())
    }
}

/// Target page and HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Page listing floor plans and availability
    #[serde(default = "defaults::url")]
    pub url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            url: defaults::url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Snapshot storage backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Local,
    S3,
}

/// Snapshot storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// File path for the local backend
    #[serde(default = "defaults::snapshot_path")]
    pub path: String,

    /// Bucket for the S3 backend
    #[serde(default)]
    pub bucket: String,

    /// Object key for the S3 backend
    #[serde(default = "defaults::snapshot_key")]
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: defaults::snapshot_path(),
            bucket: String::new(),
            key: defaults::snapshot_key(),
        }
    }
}

/// Notification transport.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotifierBackend {
    /// Write the message to the log only
    #[default]
    Log,
    Webhook,
    Sns,
}

/// Notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    #[serde(default)]
    pub backend: NotifierBackend,

    /// Fixed subject line for every message
    #[serde(default = "defaults::subject")]
    pub subject: String,

    /// SNS topic ARN
    #[serde(default)]
    pub topic_arn: String,

    /// Webhook endpoint receiving `{"subject", "text"}` JSON
    #[serde(default)]
    pub webhook_url: String,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            backend: NotifierBackend::default(),
            subject: defaults::subject(),
            topic_arn: String::new(),
            webhook_url: String::new(),
        }
    }
}

/// Retry policy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt
    #[serde(default = "defaults::max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry; doubled after each failure
    #[serde(default = "defaults::initial_delay")]
    pub initial_delay_ms: u64,
}

impl RetryConfig {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: defaults::max_attempts(),
            initial_delay_ms: defaults::initial_delay(),
        }
    }
}

/// Snapshot comparison settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffConfig {
    /// Treat reordered plans or units as a change
    #[serde(default = "defaults::order_sensitive")]
    pub order_sensitive: bool,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            order_sensitive: defaults::order_sensitive(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    /// Enable debug-level output
    #[serde(default)]
    pub debug: bool,
}

impl LoggingConfig {
    /// Default filter directive for the log backends.
    pub fn level(&self) -> &'static str {
        if self.debug { "debug" } else { "info" }
    }
}

/// AWS SDK settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AwsConfig {
    #[serde(default)]
    pub region: Option<String>,

    #[serde(default)]
    pub profile: Option<String>,
}

mod defaults {
    pub fn url() -> String {
        "https://example.com/floorplans".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; floorplan-watch/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn snapshot_path() -> String {
        "storage/snapshot.json".into()
    }
    pub fn snapshot_key() -> String {
        "floorplans/snapshot.json".into()
    }
    pub fn subject() -> String {
        "Floor plan availability changed".into()
    }
    pub fn max_attempts() -> u32 {
        3
    }
    pub fn initial_delay() -> u64 {
        2_000
    }
    pub fn order_sensitive() -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.target.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_http_url() {
        let mut config = Config::default();
        config.target.url = "ftp://example.com/plans".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_requires_backend_fields() {
        let mut config = Config::default();
        config.storage.backend = StorageBackend::S3;
        assert!(config.validate().is_err());
        config.storage.bucket = "snapshots".to_string();
        assert!(config.validate().is_ok());

        config.notifier.backend = NotifierBackend::Sns;
        assert!(config.validate().is_err());
        config.notifier.topic_arn = "arn:aws:sns:us-east-1:123456789012:plans".to_string();
        assert!(config.validate().is_ok());

        config.notifier.backend = NotifierBackend::Webhook;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_selector() {
        let mut config = Config::default();
        config.selectors.unit_row = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("selectors.unit_row"));
    }

    #[test]
    fn parse_partial_toml_uses_defaults() {
        let config = Config::from_toml(
            r#"
            [target]
            url = "https://apartments.example.com/floorplans"

            [storage]
            backend = "s3"
            bucket = "watch-bucket"

            [retry]
            max_attempts = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.target.url, "https://apartments.example.com/floorplans");
        assert_eq!(config.target.timeout_secs, 30);
        assert_eq!(config.storage.backend, StorageBackend::S3);
        assert_eq!(config.storage.key, "floorplans/snapshot.json");
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.initial_delay_ms, 2_000);
        assert_eq!(config.selectors.container_index, 1);
        assert!(config.diff.order_sensitive);
    }

    #[test]
    fn overrides_switch_backends() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("S3_BUCKET", "plans-bucket"),
            ("SNS_TOPIC_ARN", "arn:aws:sns:us-east-1:123456789012:plans"),
            ("MAX_ATTEMPTS", "7"),
            ("DEBUG", "true"),
            ("TARGET_URL", ""),
        ]);

        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.storage.backend, StorageBackend::S3);
        assert_eq!(config.storage.bucket, "plans-bucket");
        assert_eq!(config.notifier.backend, NotifierBackend::Sns);
        assert_eq!(config.retry.max_attempts, 7);
        assert!(config.logging.debug);
        assert_eq!(config.logging.level(), "debug");
        // Empty values are ignored
        assert_eq!(config.target.url, "https://example.com/floorplans");
    }

    #[test]
    fn webhook_override_switches_notifier() {
        let mut config = Config::default();
        config.apply_overrides(|key| {
            (key == "WEBHOOK_URL").then(|| "https://hooks.example.com/plans".to_string())
        });
        assert_eq!(config.notifier.backend, NotifierBackend::Webhook);
        assert_eq!(config.notifier.webhook_url, "https://hooks.example.com/plans");
        assert!(config.validate().is_ok());

        let env: HashMap<&str, &str> = HashMap::from([
            ("WEBHOOK_URL", "https://hooks.example.com/plans"),
            ("SNS_TOPIC_ARN", "arn:aws:sns:us-east-1:123456789012:plans"),
        ]);
        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.notifier.backend, NotifierBackend::Sns);
    }
}
