//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use serde::Serialize;

use crate::dashboard::{DashboardController, DashboardState, ViewMode};
use crate::status::DatasetRecord;

// ============================================
// STATUS DTOs
// ============================================

/// Current dashboard view
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// "loading" or "loaded"
    pub state: String,
    /// View mode, absent while loading
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<ModeDto>,
    /// `meta.fetch_time` of the loaded document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_time: Option<String>,
    pub caption: String,
    /// The all-complete banner is shown
    pub banner: bool,
    /// Datasets in the feed
    pub total: usize,
    /// Datasets missing an endpoint
    pub incomplete: usize,
    /// Rows currently displayed
    pub records: Vec<DatasetRecord>,
}

/// View mode as JSON
#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ModeDto {
    Incomplete,
    All,
    Latest,
    Group { field: String, value: String },
}

impl From<&ViewMode> for ModeDto {
    fn from(mode: &ViewMode) -> Self {
        match mode {
            ViewMode::AllIncomplete => ModeDto::Incomplete,
            ViewMode::AllDatasets => ModeDto::All,
            ViewMode::Latest => ModeDto::Latest,
            ViewMode::GroupFilter { field, value } => ModeDto::Group {
                field: field.to_string(),
                value: value.clone(),
            },
        }
    }
}

impl StatusResponse {
    pub fn from_controller(controller: &DashboardController) -> Self {
        let state = match controller.state() {
            DashboardState::Loading => "loading",
            DashboardState::Loaded(_) => "loaded",
        };
        let feed = controller.feed();
        let view = controller.view();

        Self {
            state: state.to_string(),
            mode: controller.mode().map(ModeDto::from),
            fetch_time: feed.map(|f| f.fetch_time.clone()),
            caption: view.map(|v| v.caption.clone()).unwrap_or_default(),
            banner: view.map(|v| v.banner).unwrap_or(false),
            total: feed.map(|f| f.len()).unwrap_or(0),
            incomplete: feed
                .map(|f| f.records.iter().filter(|r| r.raw.is_incomplete()).count())
                .unwrap_or(0),
            records: view.map(|v| v.records.clone()).unwrap_or_default(),
        }
    }
}

// ============================================
// MAP DTOs
// ============================================

/// Map click acknowledgement
#[derive(Debug, Serialize)]
pub struct ClickResponse {
    /// Subscribers the click was delivered to
    pub delivered: usize,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: healthy, degraded
    pub status: String,
    /// Status feed: loaded, loading
    pub feed: String,
    /// Trajectory: ok, missing
    pub trajectory: String,
    /// Datasets in the loaded feed
    pub datasets: usize,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}
