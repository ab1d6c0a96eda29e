//! Map Routes
//!
//! - GET /map - Leaflet page
//! - GET /static/json/trajectories.json - Trajectory feature
//! - POST /api/map/click - Viewport reported by a click
//! - POST /api/map/markers - Draw a marker
//! - DELETE /api/map/markers - Remove every marker

use axum::{extract::State, http::StatusCode, response::Html, Json};
use std::sync::Arc;

use crate::api::dto::ClickResponse;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::map::{render_map_page, Feature, Marker, MarkerOptions, Viewport};

/// GET /map
pub async fn map_page(State(state): State<Arc<AppState>>) -> Html<String> {
    let presenter = state.map.read().await;
    Html(render_map_page(&presenter, &state.config.map.title))
}

/// GET /static/json/trajectories.json
pub async fn trajectory(State(state): State<Arc<AppState>>) -> ApiResult<Json<Feature>> {
    let presenter = state.map.read().await;

    presenter
        .trajectory()
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("No trajectory loaded".to_string()))
}

/// POST /api/map/click
pub async fn click(
    State(state): State<Arc<AppState>>,
    Json(viewport): Json<Viewport>,
) -> Json<ClickResponse> {
    let presenter = state.map.read().await;
    Json(ClickResponse {
        delivered: presenter.click(viewport),
    })
}

/// POST /api/map/markers
pub async fn draw_marker(
    State(state): State<Arc<AppState>>,
    Json(options): Json<MarkerOptions>,
) -> ApiResult<(StatusCode, Json<Marker>)> {
    let mut presenter = state.map.write().await;
    let marker = presenter.draw_marker(options)?;

    Ok((StatusCode::CREATED, Json(marker)))
}

/// DELETE /api/map/markers
pub async fn clear_markers(State(state): State<Arc<AppState>>) -> StatusCode {
    let removed = state.map.write().await.clear_markers();
    tracing::debug!(removed, "Markers cleared");
    StatusCode::NO_CONTENT
}
