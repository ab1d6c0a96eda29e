//! Glider DAC status HTTP server
//!
//! HTTP layer for the dashboard and the trajectory map, built with Axum.
//!
//! # Endpoints
//!
//! ## Dashboard
//! - `GET /` - Current view
//! - `GET /view/:nav` - Incomplete, all or latest datasets
//! - `GET /group/:field/:value` - Datasets of one institution, operator, provider or WMO ID
//!
//! ## Status
//! - `GET /api/status` - Current view as JSON
//! - `POST /api/status/reload` - Fetch the feed again
//!
//! ## Map
//! - `GET /map` - Trajectory map page
//! - `GET /static/json/trajectories.json` - Trajectory feature
//! - `POST /api/map/click` - Viewport notification
//! - `POST /api/map/markers` - Draw a marker (replacing one with the same title)
//! - `DELETE /api/map/markers` - Remove every marker
//!
//! ## Health
//! - `GET /health/live` - Liveness check
//! - `GET /health/ready` - Readiness check
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use dac_status::api::{serve, AppState};
//! use dac_status::config::Config;
//! use dac_status::dashboard::{DashboardController, HtmlRenderer};
//! use dac_status::map::MapPresenter;
//! use dac_status::status::{FeedLocation, StatusFeedLoader};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default()?;
//!     let source = FeedLocation::parse(&config.feed.status_url).into_source(config.feed.timeout())?;
//!     let dashboard = DashboardController::new(StatusFeedLoader::new(source), Arc::new(HtmlRenderer));
//!     let map = MapPresenter::new(config.map.options());
//!
//!     let api = config.api.clone();
//!     serve(AppState::new(dashboard, map, config), &api).await?;
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::ApiConfig;
use crate::map::page::{CLICK_PATH, TRAJECTORY_PATH};

/// Build the router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/status", get(routes::status::get_status))
        .route("/status/reload", post(routes::status::reload))
        .route(
            "/map/markers",
            post(routes::map::draw_marker).delete(routes::map::clear_markers),
        );

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .route("/", get(routes::dashboard::index))
        .route("/view/:nav", get(routes::dashboard::show_view))
        .route("/group/:field/:value", get(routes::dashboard::select_group))
        .route("/map", get(routes::map::map_page))
        .route(TRAJECTORY_PATH, get(routes::map::trajectory))
        .route(CLICK_PATH, post(routes::map::click))
        .nest("/api", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the HTTP server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("DAC status server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("DAC status server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
