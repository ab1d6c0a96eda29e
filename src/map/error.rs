//! Map error types

use thiserror::Error;

use crate::status::StatusError;

/// Errors reported by the map presenter and trajectory loading
#[derive(Error, Debug)]
pub enum MapError {
    /// A marker was requested without latitude or longitude
    #[error("lat and lon are required options")]
    MissingCoordinates,

    /// The trajectory could not be fetched or decoded
    #[error("Trajectory error: {0}")]
    Trajectory(#[from] StatusError),
}

/// Result type alias for map operations
pub type MapResult<T> = Result<T, MapError>;
