//! Glider trajectories as GeoJSON
//!
//! The map shows a single trajectory feature. Features are either read as
//! ready-made GeoJSON (`static/json/trajectories.json`) or built from an
//! ERDDAP tabledap query ordered by time.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;

use super::error::MapResult;
use crate::status::{fetch_json, FeedLocation, FeedSource, StatusError};

/// ERDDAP variable carrying the QARTOD location test result
pub const LOCATION_FLAG: &str = "qartod_location_test_flag";

/// QARTOD "pass"
const FLAG_PASS: f64 = 1.0;

/// GeoJSON position: longitude, latitude and optional altitude
pub type Position = Vec<f64>;

/// The geometries a glider track can take
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: Position },
    LineString { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
}

impl Geometry {
    /// Number of positions in the geometry
    pub fn len(&self) -> usize {
        match self {
            Geometry::Point { .. } => 1,
            Geometry::LineString { coordinates } => coordinates.len(),
            Geometry::MultiLineString { coordinates } => coordinates.iter().map(Vec::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FeatureKind {
    Feature,
}

/// A GeoJSON Feature
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: FeatureKind,
    #[serde(default)]
    pub properties: Map<String, Value>,
    pub geometry: Option<Geometry>,
}

impl Feature {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            kind: FeatureKind::Feature,
            properties: Map::new(),
            geometry: Some(geometry),
        }
    }

    /// Text shown in the feature's popup
    pub fn popup_content(&self) -> Option<&str> {
        self.properties.get("popupContent").and_then(Value::as_str)
    }

    /// Builder method: set the popup text
    pub fn with_popup_content(mut self, content: impl Into<String>) -> Self {
        self.properties
            .insert("popupContent".to_string(), Value::String(content.into()));
        self
    }
}

/// ERDDAP `.json` response body
#[derive(Debug, Deserialize)]
pub struct ErddapResponse {
    pub table: ErddapTable,
}

#[derive(Debug, Deserialize)]
pub struct ErddapTable {
    #[serde(rename = "columnNames", default)]
    pub column_names: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
}

/// Tabledap query returning the track ordered by time
///
/// ERDDAP needs the sort variable in the variable list, so `time` is
/// requested and dropped when the track is built. `with_flag` adds the
/// location QC flag between latitude and time.
pub fn erddap_trajectory_url(erddap_url: &str, with_flag: bool) -> String {
    let flag = if with_flag {
        format!("{},", LOCATION_FLAG)
    } else {
        String::new()
    };
    format!(
        "{}?longitude,latitude,{}time&orderBy(%22time%22)",
        erddap_url.replace("html", "json"),
        flag
    )
}

/// Keep the first two columns (longitude, latitude) of every row
///
/// When the table carries the location flag, only rows that passed the
/// location test are kept.
pub fn line_string_from_table(table: &ErddapTable) -> Geometry {
    let flag_column = table.column_names.iter().position(|c| c == LOCATION_FLAG);

    let coordinates = table
        .rows
        .iter()
        .filter_map(|row| {
            if let Some(column) = flag_column {
                if row.get(column).and_then(Value::as_f64) != Some(FLAG_PASS) {
                    return None;
                }
            }
            let lon = row.first().and_then(Value::as_f64)?;
            let lat = row.get(1).and_then(Value::as_f64)?;
            Some(vec![lon, lat])
        })
        .collect::<Vec<Position>>();

    let skipped = table.rows.len() - coordinates.len();
    if skipped > 0 {
        tracing::debug!(
            skipped,
            flagged = flag_column.is_some(),
            "Dropped trajectory rows without good coordinates"
        );
    }

    Geometry::LineString { coordinates }
}

/// Fetches trajectory features
pub struct TrajectoryLoader {
    source: Arc<dyn FeedSource>,
}

impl TrajectoryLoader {
    pub fn new(source: Arc<dyn FeedSource>) -> Self {
        Self { source }
    }

    /// Fetch a ready-made GeoJSON feature
    pub async fn load_feature(&self) -> MapResult<Feature> {
        let feature: Feature = fetch_json(self.source.as_ref()).await?;
        tracing::info!(
            source = %self.source.describe(),
            positions = feature.geometry.as_ref().map(Geometry::len).unwrap_or(0),
            "Trajectory loaded"
        );
        Ok(feature)
    }
}

/// Builds a track from an ERDDAP dataset
///
/// The query with the location flag runs first. Datasets without the flag
/// variable reject it, so a failed fetch retries without the flag.
pub struct ErddapTrajectory {
    flagged: Arc<dyn FeedSource>,
    plain: Arc<dyn FeedSource>,
}

impl ErddapTrajectory {
    /// Queries against the tabledap dataset page `erddap_url`
    pub fn new(erddap_url: &str, timeout: Duration) -> MapResult<Self> {
        let flagged =
            FeedLocation::parse(&erddap_trajectory_url(erddap_url, true)).into_source(timeout)?;
        let plain =
            FeedLocation::parse(&erddap_trajectory_url(erddap_url, false)).into_source(timeout)?;
        Ok(Self::from_sources(flagged, plain))
    }

    pub fn from_sources(flagged: Arc<dyn FeedSource>, plain: Arc<dyn FeedSource>) -> Self {
        Self { flagged, plain }
    }

    /// Fetch the track; a body that fails to decode is not retried
    pub async fn load(&self) -> MapResult<Geometry> {
        let body = match self.flagged.fetch().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(
                    source = %self.flagged.describe(),
                    error = %e,
                    "Flagged trajectory query failed, retrying without {}",
                    LOCATION_FLAG
                );
                self.plain.fetch().await?
            }
        };

        let response: ErddapResponse = serde_json::from_slice(&body).map_err(StatusError::from)?;
        let geometry = line_string_from_table(&response.table);
        tracing::info!(positions = geometry.len(), "Trajectory built from ERDDAP");
        Ok(geometry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::MapError;
    use crate::status::{FileSource, MemorySource};

    const DATASET: &str = "https://gliders.ioos.us/erddap/tabledap/ru01-20140104T1621.html";

    #[test]
    fn test_erddap_trajectory_url() {
        assert_eq!(
            erddap_trajectory_url(DATASET, false),
            "https://gliders.ioos.us/erddap/tabledap/ru01-20140104T1621.json?longitude,latitude,time&orderBy(%22time%22)"
        );
        assert_eq!(
            erddap_trajectory_url(DATASET, true),
            "https://gliders.ioos.us/erddap/tabledap/ru01-20140104T1621.json?longitude,latitude,qartod_location_test_flag,time&orderBy(%22time%22)"
        );
    }

    #[test]
    fn test_flagged_rows_filtered() {
        let table: ErddapTable = serde_json::from_str(
            r#"{
                "columnNames": ["longitude", "latitude", "qartod_location_test_flag", "time"],
                "rows": [
                    [-64.5, 17.5, 1, "2014-01-04T16:21:00Z"],
                    [-10.0, 80.0, 4, "2014-01-04T17:21:00Z"],
                    [-64.6, 17.6, null, "2014-01-04T18:21:00Z"],
                    [-64.7, 17.7, 1, "2014-01-04T19:21:00Z"]
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(
            line_string_from_table(&table),
            Geometry::LineString {
                coordinates: vec![vec![-64.5, 17.5], vec![-64.7, 17.7]]
            }
        );
    }

    #[test]
    fn test_line_string_from_table() {
        let table: ErddapTable = serde_json::from_str(
            r#"{
                "columnNames": ["longitude", "latitude", "time"],
                "rows": [
                    [-64.5, 17.5, "2014-01-04T16:21:00Z"],
                    [-64.6, 17.6, "2014-01-04T17:21:00Z"],
                    [null, null, "2014-01-04T18:21:00Z"]
                ]
            }"#,
        )
        .unwrap();

        let geometry = line_string_from_table(&table);
        assert_eq!(
            geometry,
            Geometry::LineString {
                coordinates: vec![vec![-64.5, 17.5], vec![-64.6, 17.6]]
            }
        );
    }

    #[tokio::test]
    async fn test_load_feature() {
        let body = r#"{
            "type": "Feature",
            "properties": {"name": "ng292"},
            "geometry": {"type": "LineString", "coordinates": [[-65.0, 17.2], [-64.9, 17.3, 0.0]]}
        }"#;
        let loader = TrajectoryLoader::new(Arc::new(MemorySource::new(body)));

        let feature = loader.load_feature().await.unwrap();
        assert_eq!(feature.geometry.as_ref().unwrap().len(), 2);
        assert_eq!(feature.popup_content(), None);
    }

    #[tokio::test]
    async fn test_non_feature_rejected() {
        let body = r#"{"type": "FeatureCollection", "features": []}"#;
        let loader = TrajectoryLoader::new(Arc::new(MemorySource::new(body)));
        assert!(loader.load_feature().await.is_err());
    }

    #[tokio::test]
    async fn test_erddap_prefers_flagged_query() {
        let flagged = r#"{"table": {"columnNames": ["longitude", "latitude", "qartod_location_test_flag", "time"],
            "rows": [[-64.5, 17.5, 1, "t"], [-64.6, 17.6, 3, "t"]]}}"#;
        let plain = r#"{"table": {"columnNames": ["longitude", "latitude", "time"],
            "rows": [[-64.5, 17.5, "t"], [-64.6, 17.6, "t"]]}}"#;
        let trajectory = ErddapTrajectory::from_sources(
            Arc::new(MemorySource::new(flagged)),
            Arc::new(MemorySource::new(plain)),
        );
        assert_eq!(trajectory.load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_erddap_falls_back_without_flag() {
        let dir = tempfile::tempdir().unwrap();
        let plain = r#"{"table": {"columnNames": ["longitude", "latitude", "time"], "rows": [[-64.5, 17.5, "t"]]}}"#;
        let trajectory = ErddapTrajectory::from_sources(
            Arc::new(FileSource::new(dir.path().join("missing.json"))),
            Arc::new(MemorySource::new(plain)),
        );
        assert_eq!(trajectory.load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_erddap_errors_when_both_queries_fail() {
        let dir = tempfile::tempdir().unwrap();
        let trajectory = ErddapTrajectory::from_sources(
            Arc::new(FileSource::new(dir.path().join("flagged.json"))),
            Arc::new(FileSource::new(dir.path().join("plain.json"))),
        );
        let err = trajectory.load().await.unwrap_err();
        assert!(matches!(err, MapError::Trajectory(StatusError::Io { .. })));

        let trajectory = ErddapTrajectory::from_sources(
            Arc::new(MemorySource::new("<html>")),
            Arc::new(MemorySource::new("{}")),
        );
        let err = trajectory.load().await.unwrap_err();
        assert!(matches!(err, MapError::Trajectory(StatusError::Malformed(_))));
    }

    #[test]
    fn test_popup_content_builder() {
        let feature = Feature::new(Geometry::Point {
            coordinates: vec![-64.5, 17.5],
        })
        .with_popup_content("Glider ng292");
        assert_eq!(feature.popup_content(), Some("Glider ng292"));
    }
}
