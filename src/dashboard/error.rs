//! Dashboard error types

use thiserror::Error;

use crate::status::StatusError;

/// Errors reported by the dashboard controller
#[derive(Error, Debug)]
pub enum DashboardError {
    /// The feed has not been loaded yet, so there is nothing to show
    #[error("Status feed not loaded")]
    NotLoaded,

    /// Fetching or decoding the feed failed
    #[error("Feed error: {0}")]
    Feed(#[from] StatusError),
}

/// Result type alias for dashboard operations
pub type DashboardResult<T> = Result<T, DashboardError>;
