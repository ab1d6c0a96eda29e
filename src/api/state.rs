//! Application State
//!
//! Shared state accessible by all API handlers.
//! The dashboard and map are single sessions behind async locks.

use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::dashboard::{DashboardController, DashboardResult};
use crate::map::MapPresenter;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Dashboard session over the status feed
    pub dashboard: Arc<RwLock<DashboardController>>,
    /// Trajectory map session
    pub map: Arc<RwLock<MapPresenter>>,
    /// Loaded configuration
    pub config: Arc<Config>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(dashboard: DashboardController, map: MapPresenter, config: Config) -> Self {
        Self {
            dashboard: Arc::new(RwLock::new(dashboard)),
            map: Arc::new(RwLock::new(map)),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Fetch the status feed again and apply it
    ///
    /// The fetch runs with no lock held so pages keep rendering the current
    /// view; the write lock is taken only to apply the new document. On
    /// failure the previous feed stays in place.
    pub async fn reload(&self) -> DashboardResult<()> {
        let loader = self.dashboard.read().await.loader().clone();

        match loader.load().await {
            Ok(document) => {
                let mut controller = self.dashboard.write().await;
                let view = controller.apply(document, Utc::now());
                tracing::debug!(caption = %view.caption, "Status feed applied");
                Ok(())
            }
            Err(e) => Err(self.dashboard.read().await.load_failed(e)),
        }
    }

    /// Start reloading the status feed on an interval
    ///
    /// A failed reload is logged and the previous feed stays on screen.
    pub fn start_background_refresh(&self, interval: Duration) -> JoinHandle<()> {
        tracing::info!(
            interval_secs = interval.as_secs(),
            "Starting status feed background refresh"
        );

        let state = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);

            // Skip the first immediate tick
            ticker.tick().await;

            loop {
                ticker.tick().await;

                tracing::debug!("Running scheduled status feed reload");
                if state.reload().await.is_ok() {
                    tracing::info!("Status feed refreshed");
                }
            }
        })
    }
}
