//! Service layer for the watcher.
//!
//! This module contains the page-facing logic:
//! - Document fetching (`DocumentFetcher`, `HttpFetcher`)
//! - Floor plan parsing (`FloorPlanParser`)

mod fetcher;
mod parser;

pub use fetcher::{DocumentFetcher, HttpFetcher};
pub use parser::{FloorPlanParser, split_heading};
