//! # DAC Status
//!
//! Status dashboard for the Glider Data Assembly Center. Loads the
//! periodically generated status document, tags every dataset with freshness
//! and completeness severities, and serves navigable views over it together
//! with a trajectory map.
//!
//! ## Modules
//!
//! - [`status`]: feed loading, classification and the deployment API client
//! - [`dashboard`]: view-mode controller and HTML rendering
//! - [`map`]: trajectory map presenter and Leaflet page
//! - [`api`]: HTTP server with Axum
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dac_status::dashboard::{DashboardController, HtmlRenderer};
//! use dac_status::status::{FileSource, StatusFeedLoader};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let loader = StatusFeedLoader::new(Arc::new(FileSource::new("json/status.json")));
//!     let mut dashboard = DashboardController::new(loader, Arc::new(HtmlRenderer));
//!
//!     let view = dashboard.load(chrono::Utc::now()).await?;
//!     println!("{}", view.caption);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod dashboard;
pub mod map;
pub mod status;

// Re-export top-level types for convenience
pub use status::{
    classify, DatasetRecord, GroupField, RawRecord, Severity, StatusDocument, StatusError,
    StatusFeed, StatusFeedLoader, StatusResult,
};

pub use dashboard::{
    DashboardController, DashboardError, DashboardResult, HtmlRenderer, NavItem, Renderer,
    ViewMode,
};

pub use map::{MapError, MapEvent, MapPresenter, MapResult, Viewport};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{Config, ConfigError};
