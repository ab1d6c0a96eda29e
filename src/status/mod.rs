//! Dataset status feed
//!
//! Loading, classifying and querying the DAC status document.
//!
//! # Example
//!
//! ```rust,no_run
//! use dac_status::status::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let loader = StatusFeedLoader::new(Arc::new(FileSource::new("json/status.json")));
//!     let document = loader.load().await?;
//!
//!     let now = chrono::Utc::now().timestamp_millis();
//!     let records = classify(&document.datasets, now);
//!     println!("{} incomplete datasets", incomplete(&records).len());
//!     Ok(())
//! }
//! ```

pub mod classifier;
pub mod deployment;
pub mod error;
pub mod loader;
pub mod types;

pub use classifier::{
    classify, created_status, data_status, distinct_group_values, filter_by_field, incomplete,
    latest_updated, sort_by_name, time_coverage_status, LATEST_LIMIT,
};
pub use deployment::{Deployment, DeploymentClient};
pub use error::{StatusError, StatusResult};
pub use loader::{
    fetch_json, FeedLocation, FeedSource, FileSource, HttpSource, MemorySource, StatusFeedLoader,
};
pub use types::{
    DataStatus, DatasetRecord, FeedMeta, GroupField, RawRecord, Severity, StatusDocument,
    StatusFeed,
};
