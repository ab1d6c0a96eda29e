//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::map::{Bounds, MapOptions};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,

    #[serde(default)]
    pub map: MapConfig,

    #[serde(default)]
    pub deployments: DeploymentsConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Status feed configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// URL or file path of the status document
    #[serde(default = "default_status_url")]
    pub status_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Reload the feed periodically; 0 loads once
    #[serde(default)]
    pub refresh_interval_secs: u64,

    #[serde(default = "default_latest_limit")]
    pub latest_limit: usize,

    #[serde(default = "default_title")]
    pub title: String,
}

fn default_status_url() -> String {
    "./json/status.json".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_latest_limit() -> usize {
    crate::status::LATEST_LIMIT
}

fn default_title() -> String {
    "Glider DAC Status".to_string()
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            status_url: default_status_url(),
            request_timeout_secs: default_request_timeout(),
            refresh_interval_secs: 0,
            latest_limit: default_latest_limit(),
            title: default_title(),
        }
    }
}

impl FeedConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.refresh_interval_secs > 0).then(|| Duration::from_secs(self.refresh_interval_secs))
    }
}

/// Trajectory map configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MapConfig {
    /// URL or file path of the trajectory feature
    #[serde(default = "default_trajectory_url")]
    pub trajectory_url: String,

    #[serde(default = "default_center")]
    pub center: [f64; 2],

    #[serde(default = "default_zoom")]
    pub zoom: u8,

    #[serde(default = "default_max_zoom")]
    pub max_zoom: u8,

    /// `[[south, west], [north, east]]` to fit on load
    #[serde(default = "default_bbox")]
    pub bbox: Option<[[f64; 2]; 2]>,

    /// Popup text for the trajectory
    #[serde(default)]
    pub trajectory_label: Option<String>,

    #[serde(default = "default_map_title")]
    pub title: String,
}

fn default_trajectory_url() -> String {
    "static/json/trajectories.json".to_string()
}

fn default_center() -> [f64; 2] {
    [41.505, -80.09]
}

fn default_zoom() -> u8 {
    3
}

fn default_max_zoom() -> u8 {
    18
}

fn default_bbox() -> Option<[[f64; 2]; 2]> {
    Some([
        [17.15260066514817, -65.04798889160156],
        [17.85851867611398, -63.949356079101555],
    ])
}

fn default_map_title() -> String {
    "Glider Trajectory".to_string()
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            trajectory_url: default_trajectory_url(),
            center: default_center(),
            zoom: default_zoom(),
            max_zoom: default_max_zoom(),
            bbox: default_bbox(),
            trajectory_label: None,
            title: default_map_title(),
        }
    }
}

impl MapConfig {
    pub fn options(&self) -> MapOptions {
        MapOptions {
            center: self.center,
            zoom: self.zoom,
            max_zoom: self.max_zoom,
            bbox: self.bbox.map(|[sw, ne]| Bounds::new(sw, ne)),
        }
    }
}

/// Deployment API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentsConfig {
    #[serde(default = "default_deployment_api")]
    pub api_url: String,
}

fn default_deployment_api() -> String {
    "https://gliders.ioos.us/providers/api/deployment".to_string()
}

impl Default for DeploymentsConfig {
    fn default() -> Self {
        Self {
            api_url: default_deployment_api(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8082
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ApiConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub fn filter(&self) -> String {
        format!("dac_status={},tower_http=debug", self.level)
    }

    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { error, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            error: e.to_string(),
        })
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Standard config file locations, in search order
    pub fn default_paths() -> Vec<PathBuf> {
        [
            dirs::config_dir().map(|p| p.join("dac-status").join("config.toml")),
            Some(PathBuf::from("/etc/dac-status/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Load the first file of `paths` that exists, with environment overrides
    ///
    /// Returns the path the config came from, or `None` when no file exists
    /// and defaults were used. A file that exists but is broken is an error.
    pub fn resolve(paths: &[PathBuf]) -> Result<(Self, Option<PathBuf>), ConfigError> {
        match paths.iter().find(|path| path.exists()) {
            Some(path) => Ok((Self::load_with_env(path)?, Some(path.clone()))),
            None => Ok((Self::from_env(), None)),
        }
    }

    /// Load from default locations or environment
    pub fn load_default() -> Result<Self, ConfigError> {
        let (config, path) = Self::resolve(&Self::default_paths())?;
        match path {
            Some(path) => tracing::info!("Loaded config from {:?}", path),
            None => tracing::info!("Using default config with environment overrides"),
        }
        Ok(config)
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("DAC_STATUS_FEED_URL") {
            self.feed.status_url = url;
        }
        if let Ok(secs) = std::env::var("DAC_STATUS_REFRESH_SECS") {
            if let Ok(s) = secs.parse() {
                self.feed.refresh_interval_secs = s;
            }
        }

        if let Ok(url) = std::env::var("DAC_STATUS_TRAJECTORY_URL") {
            self.map.trajectory_url = url;
        }

        if let Ok(url) = std::env::var("DAC_STATUS_DEPLOYMENT_API") {
            self.deployments.api_url = url;
        }

        if let Ok(host) = std::env::var("DAC_STATUS_API_HOST") {
            self.api.host = host;
        }
        if let Ok(port) = std::env::var("DAC_STATUS_API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }

        if let Ok(level) = std::env::var("DAC_STATUS_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("DAC_STATUS_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Glider DAC Status Configuration
#
# Environment variables override these settings:
# - DAC_STATUS_FEED_URL
# - DAC_STATUS_REFRESH_SECS
# - DAC_STATUS_TRAJECTORY_URL
# - DAC_STATUS_DEPLOYMENT_API
# - DAC_STATUS_API_HOST
# - DAC_STATUS_API_PORT
# - DAC_STATUS_LOG_LEVEL
# - DAC_STATUS_LOG_FORMAT

[feed]
# Status document: an http(s) URL or a file path
status_url = "./json/status.json"

# Request timeout in seconds
request_timeout_secs = 30

# Reload the feed every N seconds (0 = load once at startup)
refresh_interval_secs = 0

# Rows in the latest-updates view
latest_limit = 15

# Dashboard title
title = "Glider DAC Status"

[map]
# Trajectory GeoJSON feature: an http(s) URL or a file path
trajectory_url = "static/json/trajectories.json"

# Initial view
center = [41.505, -80.09]
zoom = 3
max_zoom = 18

# Extent fitted on load: [[south, west], [north, east]]
bbox = [[17.15260066514817, -65.04798889160156], [17.85851867611398, -63.949356079101555]]

# Popup text for the trajectory
# trajectory_label = "Glider ng292"

title = "Glider Trajectory"

[deployments]
# Deployment collection of the DAC providers API
api_url = "https://gliders.ioos.us/providers/api/deployment"

[api]
# HTTP server host
host = "0.0.0.0"

# HTTP server port
port = 8082

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.feed.status_url, "./json/status.json");
        assert_eq!(config.feed.latest_limit, 15);
        assert_eq!(config.api.port, 8082);
        assert_eq!(config.map.bbox, default_bbox());
        assert!(config.feed.refresh_interval().is_none());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::parse(
            r#"
            [feed]
            status_url = "https://gliders.ioos.us/status/json/status.json"
            refresh_interval_secs = 900
            "#,
        )
        .unwrap();

        assert_eq!(config.feed.request_timeout_secs, 30);
        assert_eq!(config.feed.refresh_interval(), Some(Duration::from_secs(900)));
        assert_eq!(config.map.zoom, 3);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_map_options_from_config() {
        let options = MapConfig::default().options();
        assert_eq!(options.center, [41.505, -80.09]);
        assert_eq!(
            options.bbox.unwrap().north_east,
            [17.85851867611398, -63.949356079101555]
        );
    }

    #[test]
    fn test_load_reports_path_on_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[feed\nstatus_url = 1").unwrap();

        match Config::load(file.path()) {
            Err(ConfigError::Parse { path, .. }) => assert_eq!(path, file.path()),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_uses_first_existing_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[feed]\nlatest_limit = 20\n").unwrap();
        let paths = vec![
            PathBuf::from("/nonexistent/dac-status/config.toml"),
            file.path().to_path_buf(),
        ];

        let (config, path) = Config::resolve(&paths).unwrap();
        assert_eq!(path.as_deref(), Some(file.path()));
        assert_eq!(config.feed.latest_limit, 20);
    }

    #[test]
    fn test_resolve_without_files_uses_defaults() {
        let (config, path) =
            Config::resolve(&[PathBuf::from("/nonexistent/dac-status/config.toml")]).unwrap();
        assert!(path.is_none());
        assert_eq!(config.feed.latest_limit, 15);
    }

    #[test]
    fn test_resolve_reports_broken_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[api]\nport = \"not a port\"\n").unwrap();

        let result = Config::resolve(&[file.path().to_path_buf()]);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_logging_filter() {
        let logging = LoggingConfig {
            level: "debug".to_string(),
            format: "JSON".to_string(),
        };
        assert_eq!(logging.filter(), "dac_status=debug,tower_http=debug");
        assert!(logging.is_json());
    }
}
