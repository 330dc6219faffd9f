//! Dashboard route service and CLI.
//!
//! # Architecture Overview
//!
//! ```text
//!     dashboard URL
//!     ────────────────▶ ┌──────────┐   ┌──────────────┐   ┌──────────────┐
//!                       │ routing  │──▶│    views     │──▶│    lapis     │──▶ LAPIS
//!                       │ registry │   │ parse/write  │   │ filter+client│
//!                       └──────────┘   └──────────────┘   └──────────────┘
//!                             ▲               │
//!                             │               ▼
//!                       ┌──────────┐   ┌──────────────┐
//!                       │  config  │   │   http API   │
//!                       │ + watcher│   │  / CLI JSON  │
//!                       └──────────┘   └──────────────┘
//! ```

use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use dashboard_routes::config::watcher::ConfigWatcher;
use dashboard_routes::config::{load_or_default, DashboardConfig};
use dashboard_routes::http::handlers::{organism_summaries, parse_dashboard_url, GroupCounts};
use dashboard_routes::http::HttpServer;
use dashboard_routes::lapis::LapisClient;
use dashboard_routes::lifecycle::{signals, Shutdown};
use dashboard_routes::observability::{logging, metrics};
use dashboard_routes::Registry;

#[derive(Parser)]
#[command(name = "dashboard-routes", version)]
#[command(about = "Parse, canonicalize and query genomic surveillance dashboard URLs", long_about = None)]
struct Cli {
    /// TOML config file; built-in organisms are used when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve,
    /// Parse a dashboard URL and print its route and canonical URL
    Parse { url: String },
    /// Print the LAPIS filters of a dashboard URL
    LapisFilter {
        url: String,
        /// Date that relative ranges end on (default: today, UTC)
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Fetch aggregated counts for every filter group of a dashboard URL
    Aggregated {
        url: String,
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// List organisms and their view pathnames
    Organisms,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ParseOutput<T> {
    route: T,
    canonical_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config = load_or_default(cli.config.as_deref())?;
    logging::init_logging(&config.observability.log_level);

    let registry = Registry::from_config(&config.organisms);
    let today = |today: Option<NaiveDate>| today.unwrap_or_else(|| Utc::now().date_naive());

    match cli.command {
        Commands::Serve => serve(config, cli.config.as_deref()).await?,
        Commands::Parse { url } => {
            let (view, route) = parse_dashboard_url(&registry, &url)?;
            print_json(&ParseOutput {
                canonical_url: view.to_url(&route),
                route,
            })?;
        }
        Commands::LapisFilter { url, today: date } => {
            let (view, route) = parse_dashboard_url(&registry, &url)?;
            print_json(&view.to_lapis_filters(&route, today(date)))?;
        }
        Commands::Aggregated {
            url,
            fields,
            today: date,
        } => {
            let (view, route) = parse_dashboard_url(&registry, &url)?;
            let client = LapisClient::new(Duration::from_secs(config.lapis.timeout_secs))?;
            let organism = view.organism();

            let mut results = Vec::new();
            for entry in view.to_lapis_filters(&route, today(date)) {
                let data = client
                    .aggregated(&organism.key, &organism.lapis_url, &entry.filter, &fields)
                    .await?;
                results.push(GroupCounts {
                    group: entry.group,
                    data,
                });
            }
            print_json(&results)?;
        }
        Commands::Organisms => print_json(&organism_summaries(&registry))?,
    }

    Ok(())
}

async fn serve(config: DashboardConfig, config_path: Option<&Path>) -> Result<(), Box<dyn Error>> {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        organisms = config.organisms.len(),
        "dashboard-routes starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    // The watcher stops delivering events once dropped.
    let (updates, _watcher) = match config_path {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (updates, Some(watcher.run()?))
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (updates, None)
        }
    };

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    let handle = tokio::spawn(server.run(listener, updates, shutdown.subscribe()));

    signals::trigger_on_signal(&shutdown).await;
    handle.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
