// src/models/mod.rs

//! Domain models for the watcher.
//!
//! This module contains the snapshot data model and the configuration
//! structures, organized by their primary purpose.

mod config;
mod floor_plan;
mod selectors;

// Re-export all public types
pub use config::{
    AwsConfig, Config, DiffConfig, LoggingConfig, NotifierBackend, NotifierConfig, RetryConfig,
    StorageBackend, StorageConfig, TargetConfig,
};
pub use floor_plan::{FloorPlan, Snapshot, UnitAvailability};
pub use selectors::FloorPlanSelectors;
