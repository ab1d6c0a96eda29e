//! DAC status server
//!
//! Loads the status feed and the trajectory, then serves the dashboard and
//! the map.

use chrono::Utc;
use dac_status::api::{serve, AppState};
use dac_status::config::Config;
use dac_status::dashboard::{DashboardController, HtmlRenderer};
use dac_status::map::{MapEvent, MapPresenter, TrajectoryLoader};
use dac_status::status::{FeedLocation, StatusFeedLoader};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A broken config file fails startup; logging depends on the config
    let (config, config_path) = Config::resolve(&Config::default_paths())?;
    init_tracing(&config);

    tracing::info!("Starting DAC status server v{}", env!("CARGO_PKG_VERSION"));
    match &config_path {
        Some(path) => tracing::info!("Loaded config from {:?}", path),
        None => tracing::info!("Using default config with environment overrides"),
    }

    // Dashboard
    let source = FeedLocation::parse(&config.feed.status_url).into_source(config.feed.timeout())?;
    let mut dashboard = DashboardController::new(StatusFeedLoader::new(source), Arc::new(HtmlRenderer))
        .latest_limit(config.feed.latest_limit);

    tracing::info!("Status feed: {}", dashboard.loader().describe());
    if let Ok(view) = dashboard.load(Utc::now()).await {
        tracing::info!("{}", view.caption);
    }

    // Map
    let mut map = MapPresenter::new(config.map.options());
    load_trajectory(&config, &mut map).await;
    spawn_click_logger(&map);

    let refresh = config.feed.refresh_interval();
    let api_config = config.api.clone();
    let state = AppState::new(dashboard, map, config);

    let refresh_handle = refresh.map(|interval| state.start_background_refresh(interval));

    serve(state, &api_config).await?;

    if let Some(handle) = refresh_handle {
        handle.abort();
    }

    tracing::info!("DAC status server shutdown complete");
    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.filter().into());

    if config.logging.is_json() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// A trajectory that cannot be loaded is dropped; the map still works
async fn load_trajectory(config: &Config, map: &mut MapPresenter) {
    let source = match FeedLocation::parse(&config.map.trajectory_url)
        .into_source(config.feed.timeout())
    {
        Ok(source) => source,
        Err(e) => {
            tracing::warn!(error = %e, "Trajectory source unavailable");
            return;
        }
    };

    match TrajectoryLoader::new(source).load_feature().await {
        Ok(feature) => {
            let feature = match &config.map.trajectory_label {
                Some(label) => feature.with_popup_content(label.clone()),
                None => feature,
            };
            map.add_trajectory(feature);
        }
        Err(e) => {
            tracing::warn!(
                url = %config.map.trajectory_url,
                error = %e,
                "Failed to load trajectory"
            );
        }
    }
}

fn spawn_click_logger(map: &MapPresenter) {
    let mut events = map.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(MapEvent::Clicked(viewport)) => {
                    tracing::info!(
                        zoom = viewport.zoom,
                        south_west = ?viewport.bounds.south_west,
                        north_east = ?viewport.bounds.north_east,
                        "Map clicked"
                    );
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Map click logger lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}
