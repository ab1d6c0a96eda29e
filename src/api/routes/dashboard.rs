//! Dashboard Routes
//!
//! Server-rendered dashboard pages. Each navigation link is a transition
//! on the shared controller followed by a render of the whole page.
//!
//! - GET / - Current view
//! - GET /view/:nav - Switch to `incomplete`, `all` or `latest`
//! - GET /group/:field/:value - Filter by institution, operator, provider or WMO ID

use axum::{
    extract::{Path, State},
    response::Html,
};
use chrono::Utc;
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::dashboard::{render_page, DashboardController, NavItem};
use crate::status::GroupField;

/// GET /
pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let controller = state.dashboard.read().await;
    Html(page_html(&state, &controller))
}

/// GET /view/:nav
pub async fn show_view(
    State(state): State<Arc<AppState>>,
    Path(nav): Path<String>,
) -> ApiResult<Html<String>> {
    let nav: NavItem = nav.parse().map_err(ApiError::NotFound)?;

    let mut controller = state.dashboard.write().await;
    controller.show(nav)?;

    Ok(Html(page_html(&state, &controller)))
}

/// GET /group/:field/:value
///
/// A value nothing matches leaves the current view on screen.
pub async fn select_group(
    State(state): State<Arc<AppState>>,
    Path((field, value)): Path<(String, String)>,
) -> ApiResult<Html<String>> {
    let field: GroupField = field.parse().map_err(ApiError::NotFound)?;

    let mut controller = state.dashboard.write().await;
    controller.select_group(field, &value)?;

    Ok(Html(page_html(&state, &controller)))
}

fn page_html(state: &AppState, controller: &DashboardController) -> String {
    render_page(&controller.page(&state.config.feed.title, Utc::now()))
}
