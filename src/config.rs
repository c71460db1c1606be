// src/config.rs

//! Configuration loading for deployed environments.
//!
//! Locally the CLI reads a TOML file. In Lambda the same TOML can live in S3
//! (`CONFIG_S3_BUCKET` / `CONFIG_S3_KEY`); environment variables are applied
//! on top either way.

#[cfg(any(feature = "s3", feature = "sns"))]
use aws_config::{BehaviorVersion, Region, SdkConfig};

#[cfg(feature = "s3")]
use aws_sdk_s3::Client;

#[cfg(feature = "s3")]
use crate::error::{AppError, Result};
#[cfg(any(feature = "s3", feature = "sns"))]
use crate::models::AwsConfig;
#[cfg(feature = "s3")]
use crate::models::Config;
#[cfg(feature = "s3")]
use crate::storage::s3::read_bytes_optional;

/// Resolve the shared AWS SDK configuration.
///
/// Credentials always come from the default provider chain; only region and
/// profile can be pinned.
#[cfg(any(feature = "s3", feature = "sns"))]
pub async fn load_sdk_config(aws: &AwsConfig) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = &aws.region {
        loader = loader.region(Region::new(region.clone()));
    }
    if let Some(profile) = &aws.profile {
        loader = loader.profile_name(profile);
    }
    loader.load().await
}

/// Config loader reading a TOML object from S3.
#[cfg(feature = "s3")]
pub struct S3ConfigLoader {
    client: Client,
    bucket: String,
    key: String,
}

#[cfg(feature = "s3")]
impl S3ConfigLoader {
    pub fn new(client: Client, bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Build a loader from `CONFIG_S3_BUCKET` and `CONFIG_S3_KEY`, if both are set.
    pub fn from_env(sdk_config: &SdkConfig) -> Option<Self> {
        let bucket = non_empty_env("CONFIG_S3_BUCKET")?;
        let key = non_empty_env("CONFIG_S3_KEY")?;
        Some(Self::new(Client::new(sdk_config), bucket, key))
    }

    pub fn location(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }

    pub async fn load_config(&self) -> Result<Config> {
        log::info!("Loading config file from S3: {}", self.location());
        let bytes = read_bytes_optional(&self.client, &self.bucket, &self.key)
            .await?
            .ok_or_else(|| {
                AppError::config(format!("Config file not found in S3: {}", self.location()))
            })?;

        let content = String::from_utf8(bytes).map_err(|e| {
            AppError::config(format!(
                "Config file {} is not valid UTF-8: {}",
                self.location(),
                e
            ))
        })?;
        Config::from_toml(&content)
    }
}

#[cfg(feature = "s3")]
fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
