//! DAC status CLI
//!
//! Command-line interface for one-shot work against the status feed:
//! - Render a dashboard view to HTML
//! - Classify the feed
//! - List group values and deployments
//! - Build a trajectory from ERDDAP

use anyhow::{bail, Context};
use chrono::Utc;
use clap::{Parser, Subcommand};
use dac_status::config::{generate_default_config, Config};
use dac_status::dashboard::{render_page, DashboardController, HtmlRenderer, NavItem};
use dac_status::map::{ErddapTrajectory, Feature};
use dac_status::status::{
    classify, distinct_group_values, sort_by_name, DatasetRecord, DeploymentClient, FeedLocation,
    GroupField, StatusFeedLoader,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "dac-status")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Glider DAC dataset status tools")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Status feed URL or path, overriding the config
    #[arg(long, global = true)]
    pub feed: Option<String>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a dashboard view to HTML
    Render {
        /// View to render (incomplete, all, latest)
        #[arg(short, long)]
        view: Option<String>,
        /// Group filter in field=value form, e.g. institution=Rutgers
        #[arg(short, long)]
        group: Option<String>,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Classify every dataset in the feed
    Classify {
        /// Only datasets missing an endpoint
        #[arg(long)]
        incomplete: bool,
    },

    /// List distinct values of a group field
    Groups {
        /// institution, operator, provider or wmo-id
        #[arg(short = 'F', long, default_value = "institution")]
        field: String,
    },

    /// List deployments registered with the providers API
    Deployments {
        /// Deployment API URL, overriding the config
        #[arg(long)]
        api_url: Option<String>,
    },

    /// Build a trajectory GeoJSON feature from an ERDDAP dataset
    Trajectory {
        /// ERDDAP tabledap dataset page, e.g. https://.../tabledap/ru01-20140104T1621.html
        #[arg(long)]
        erddap_url: String,
        /// Popup text for the feature
        #[arg(long)]
        label: Option<String>,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dac_status=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default()?,
    };
    if let Some(feed) = &cli.feed {
        config.feed.status_url = feed.clone();
    }
    let json = cli.format.eq_ignore_ascii_case("json");

    match cli.command {
        Commands::Render {
            view,
            group,
            output,
        } => {
            let mut dashboard = DashboardController::new(feed_loader(&config)?, Arc::new(HtmlRenderer))
                .latest_limit(config.feed.latest_limit);
            dashboard
                .load(Utc::now())
                .await
                .context("Failed to load status feed")?;

            if let Some(view) = view {
                let nav: NavItem = view.parse().map_err(anyhow::Error::msg)?;
                dashboard.show(nav)?;
            }
            if let Some(group) = group {
                let (field, value) = group
                    .split_once('=')
                    .context("Group filter must be field=value")?;
                let field: GroupField = field.parse().map_err(anyhow::Error::msg)?;
                if !dashboard.select_group(field, value)? {
                    eprintln!("No datasets with {} '{}', keeping current view", field, value);
                }
            }

            let html = render_page(&dashboard.page(&config.feed.title, Utc::now()));
            write_output(output, &html)?;
        }

        Commands::Classify { incomplete } => {
            let document = feed_loader(&config)?.load().await?;
            let mut records = classify(&document.datasets, Utc::now().timestamp_millis());
            sort_by_name(&mut records);
            if incomplete {
                records.retain(|r| r.raw.is_incomplete());
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                print_records(&records);
                println!();
                println!("{} datasets as of {}", records.len(), document.meta.fetch_time);
            }
        }

        Commands::Groups { field } => {
            let field: GroupField = field.parse().map_err(anyhow::Error::msg)?;
            let document = feed_loader(&config)?.load().await?;
            let records = classify(&document.datasets, Utc::now().timestamp_millis());
            let values = distinct_group_values(&records, field);

            if json {
                println!("{}", serde_json::to_string_pretty(&values)?);
            } else if values.is_empty() {
                println!("No {} values in the feed.", field);
            } else {
                for value in values {
                    println!("{}", value);
                }
            }
        }

        Commands::Deployments { api_url } => {
            let url = api_url.unwrap_or_else(|| config.deployments.api_url.clone());
            let source = FeedLocation::parse(&url).into_source(config.feed.timeout())?;
            let deployments = DeploymentClient::new(source)
                .list()
                .await
                .with_context(|| format!("Failed to fetch deployments from {}", url))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&deployments)?);
            } else if deployments.is_empty() {
                println!("No deployments registered.");
            } else {
                println!("{:<32} {:<24} {:<16} {}", "Name", "Operator", "Provider", "Completed");
                println!("{}", "-".repeat(84));

                for d in deployments {
                    println!(
                        "{:<32} {:<24} {:<16} {}",
                        d.name,
                        d.operator,
                        d.username,
                        match d.completed {
                            Some(true) => "yes",
                            Some(false) => "no",
                            None => "-",
                        }
                    );
                }
            }
        }

        Commands::Trajectory {
            erddap_url,
            label,
            output,
        } => {
            if !erddap_url.starts_with("http") {
                bail!("ERDDAP URL must be http(s): {}", erddap_url);
            }
            let geometry = ErddapTrajectory::new(&erddap_url, config.feed.timeout())?
                .load()
                .await
                .with_context(|| format!("Failed to fetch trajectory from {}", erddap_url))?;

            let mut feature = Feature::new(geometry);
            if let Some(label) = label {
                feature = feature.with_popup_content(label);
            }
            write_output(output, &serde_json::to_string(&feature)?)?;
        }

        Commands::Config { output } => {
            let config = generate_default_config();
            write_output(output, &config)?;
        }
    }

    Ok(())
}

fn feed_loader(config: &Config) -> anyhow::Result<StatusFeedLoader> {
    let source =
        FeedLocation::parse(&config.feed.status_url).into_source(config.feed.timeout())?;
    Ok(StatusFeedLoader::new(source))
}

fn write_output(output: Option<PathBuf>, content: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            // Create parent directory if needed
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, content)
                .with_context(|| format!("Failed to write {:?}", path))?;
            eprintln!("Written to {:?}", path);
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}

fn print_records(records: &[DatasetRecord]) {
    println!(
        "{:<32} {:<16} {:<8} {:<8} {:<6} {:<6}",
        "Name", "Provider", "Created", "Coverage", "TDS", "ERDDAP"
    );
    println!("{}", "-".repeat(82));

    for r in records {
        println!(
            "{:<32} {:<16} {:<8} {:<8} {:<6} {:<6}",
            r.name(),
            r.raw.username.as_deref().unwrap_or("-"),
            r.created_status.map(|s| s.to_string()).unwrap_or_else(|| "-".into()),
            r.time_coverage_status
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".into()),
            if r.raw.tds.is_some() { "ok" } else { "missing" },
            if r.raw.tabledap.is_some() { "ok" } else { "missing" },
        );
    }
}
