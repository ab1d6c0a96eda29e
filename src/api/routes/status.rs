//! Status Routes
//!
//! - GET /api/status - Current dashboard view as JSON
//! - POST /api/status/reload - Fetch the feed again

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::StatusResponse;
use crate::api::error::ApiResult;
use crate::api::state::AppState;

/// GET /api/status
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let controller = state.dashboard.read().await;
    Json(StatusResponse::from_controller(&controller))
}

/// POST /api/status/reload
///
/// On failure the previously loaded feed stays in place.
pub async fn reload(State(state): State<Arc<AppState>>) -> ApiResult<Json<StatusResponse>> {
    state.reload().await?;

    let controller = state.dashboard.read().await;
    Ok(Json(StatusResponse::from_controller(&controller)))
}
