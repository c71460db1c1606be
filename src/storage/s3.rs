//! AWS S3 storage implementation.
//!
//! The snapshot lives under a single fixed key and is overwritten on every
//! detected change; bucket versioning is not required.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;

use crate::error::{AppError, Result};
use crate::models::Snapshot;
use crate::storage::SnapshotStore;

/// S3-backed snapshot store.
#[derive(Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
    key: String,
}

impl S3Store {
    /// Create a new S3 store instance.
    pub fn new(client: Client, bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Create a store from an already-resolved SDK configuration.
    pub fn from_sdk_config(
        sdk_config: &SdkConfig,
        bucket: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self::new(Client::new(sdk_config), bucket, key)
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    async fn try_load(&self) -> Result<Option<Snapshot>> {
        match read_bytes_optional(&self.client, &self.bucket, &self.key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

/// Read an object, returning `None` when the key does not exist.
pub async fn read_bytes_optional(
    client: &Client,
    bucket: &str,
    key: &str,
) -> Result<Option<Vec<u8>>> {
    let result = client.get_object().bucket(bucket).key(key).send().await;

    match result {
        Ok(output) => {
            let bytes = output
                .body
                .collect()
                .await
                .map_err(|e| AppError::S3(e.to_string()))?;
            Ok(Some(bytes.into_bytes().to_vec()))
        }
        Err(err) => {
            // Check if it's a "not found" error
            let service_err = err.into_service_error();
            if service_err.is_no_such_key() {
                Ok(None)
            } else {
                Err(AppError::S3(service_err.to_string()))
            }
        }
    }
}

#[async_trait]
impl SnapshotStore for S3Store {
    async fn load(&self) -> Snapshot {
        match self.try_load().await {
            Ok(Some(snapshot)) => {
                log::debug!("Loaded {} floor plans from {}", snapshot.len(), self.location());
                snapshot
            }
            Ok(None) => {
                log::info!("No existing data at {}; starting empty", self.location());
                Snapshot::empty()
            }
            Err(e) => {
                log::warn!(
                    "Failed to read snapshot from {}: {}; starting empty",
                    self.location(),
                    e
                );
                Snapshot::empty()
            }
        }
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let bytes = ByteStream::from(snapshot.to_pretty_json()?);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .body(bytes)
            .content_type("application/json")
            .send()
            .await
            .map_err(|e| AppError::storage(self.location(), e.into_service_error()))?;

        log::info!("Wrote {} floor plans to {}", snapshot.len(), self.location());
        Ok(())
    }

    fn location(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }
}
