//! Storage abstractions for snapshot persistence.
//!
//! Exactly one snapshot is kept: the last one that was observed to differ
//! from its predecessor. It is stored as indented JSON so it can be diffed by
//! hand.
//!
//! ## Layout
//!
//! ```text
//! local:  {path}                      # e.g. storage/snapshot.json
//! s3:     s3://{bucket}/{key}         # e.g. floorplans/snapshot.json
//! ```

pub mod local;
#[cfg(feature = "s3")]
pub mod s3;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Snapshot;

// Re-export for convenience
pub use local::LocalStore;
#[cfg(feature = "s3")]
pub use s3::S3Store;

/// Trait for snapshot storage backends.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the last persisted snapshot.
    ///
    /// Never fails: a missing object, malformed content or transport error
    /// is logged and yields an empty snapshot.
    async fn load(&self) -> Snapshot;

    /// Persist `snapshot`, replacing the previous one.
    async fn save(&self, snapshot: &Snapshot) -> Result<()>;

    /// Human-readable location for logs.
    fn location(&self) -> String;
}
