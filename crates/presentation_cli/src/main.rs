//! MGT CLI
//!
//! Command-line lookup of Moscow public transport stops and arrival forecasts.

#![allow(clippy::print_stdout)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use integration_mgt::{
    MgtApiClient, MgtConfig, StopData, StopDataClient, TracingDiagnostics, format_arrivals,
    upcoming_arrivals,
};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// MGT CLI
#[derive(Parser)]
#[command(name = "mgt-cli")]
#[command(author, version, about = "Moscow transport stop forecasts", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (TOML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Overrides for the API connection
#[derive(Args)]
struct ConnectionArgs {
    /// API base URL, terminated by a slash
    #[arg(long)]
    base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a stop, its routes and upcoming arrivals
    Stop {
        /// Stop identifier (UUID)
        stop_id: String,

        /// Print the decoded response as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        connection: ConnectionArgs,
    },

    /// Show only the upcoming arrivals at a stop
    Arrivals {
        /// Stop identifier (UUID)
        stop_id: String,

        /// Maximum number of arrivals to show
        #[arg(short, long, default_value = "10")]
        limit: usize,

        #[command(flatten)]
        connection: ConnectionArgs,
    },
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Load client configuration from an optional file, falling back to defaults
fn load_config(path: Option<&Path>) -> Result<MgtConfig, config::ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }
    builder.build()?.try_deserialize()
}

/// Apply command-line overrides and validate the result
fn resolve_config(
    file: Option<&Path>,
    connection: &ConnectionArgs,
) -> anyhow::Result<MgtConfig> {
    let mut config = load_config(file).context("failed to load configuration")?;

    if let Some(base_url) = &connection.base_url {
        config.base_url.clone_from(base_url);
    }
    if let Some(timeout) = connection.timeout {
        config.timeout_secs = timeout;
    }

    config.validate().map_err(anyhow::Error::msg)?;
    Ok(config)
}

fn build_client(config: &MgtConfig, verbose: u8) -> anyhow::Result<MgtApiClient> {
    let client = MgtApiClient::new(config)?;
    if verbose >= 2 {
        return Ok(client.with_diagnostics(Arc::new(TracingDiagnostics)));
    }
    Ok(client)
}

/// Format stop header and route list
fn format_stop(stop: &StopData) -> String {
    let mut out = format!("🚏 {} [{}]\n   id: {}", stop.name, stop.stop_type, stop.id);
    for route in &stop.route_path {
        out.push_str(&format!(
            "\n   {route} ({} forecasts)",
            route.external_forecast.len()
        ));
    }
    out
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = log_filter_from_verbosity(cli.verbose);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Stop {
            stop_id,
            json,
            connection,
        } => {
            let config = resolve_config(cli.config.as_deref(), &connection)?;
            debug!(base_url = %config.base_url, "Configuration resolved");
            let client = build_client(&config, cli.verbose)?;

            let stop = client
                .get_stop_data(&stop_id)
                .await
                .with_context(|| format!("failed to fetch stop {stop_id}"))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&stop)?);
            } else {
                println!("{}", format_stop(&stop));
                println!();
                println!("{}", format_arrivals(&upcoming_arrivals(&stop, Utc::now(), 10)));
            }
        },

        Commands::Arrivals {
            stop_id,
            limit,
            connection,
        } => {
            let config = resolve_config(cli.config.as_deref(), &connection)?;
            let client = build_client(&config, cli.verbose)?;

            let arrivals =
                integration_mgt::fetch_arrivals(&client, &stop_id, Utc::now(), limit)
                    .await
                    .with_context(|| format!("failed to fetch arrivals for {stop_id}"))?;

            println!("{}", format_arrivals(&arrivals));
        },
    }

    Ok(())
}
