//! Trajectory map
//!
//! - [`presenter`]: widget options, trajectory, markers and click events
//! - [`trajectory`]: GeoJSON types and trajectory loading
//! - [`page`]: the Leaflet document served at `/map`

pub mod error;
pub mod page;
pub mod presenter;
pub mod trajectory;

pub use error::{MapError, MapResult};
pub use page::render_map_page;
pub use presenter::{
    default_basemaps, Bounds, FeatureStyle, LatLng, MapEvent, MapOptions, MapPresenter, Marker,
    MarkerIcon, MarkerOptions, TileLayer, Viewport,
};
pub use trajectory::{
    erddap_trajectory_url, line_string_from_table, ErddapResponse, ErddapTable, ErddapTrajectory,
    Feature, FeatureKind, Geometry, Position, TrajectoryLoader, LOCATION_FLAG,
};
