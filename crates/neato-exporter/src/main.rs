//! Neato Exporter - Prometheus metrics for Neato robot vacuums.
//!
//! Run with: `cargo run -p neato-exporter -- --token <token>`

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing::info;

use neato_core::{CloudClient, RobotApi, Selection};
use neato_exporter::{AppState, Collector, Config, FailurePolicy, RobotMetrics, api, startup};

/// Neato Exporter - Prometheus metrics for Neato robot vacuums.
#[derive(Parser, Debug)]
#[command(name = "neato-exporter")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// HTTP path where to expose metrics to.
    #[arg(short, long)]
    path: Option<String>,

    /// Address to listen to (e.g. ":9110" or "127.0.0.1:9110").
    #[arg(short, long = "listen-address")]
    listen_address: Option<String>,

    /// Authorization token.
    #[arg(short, long, env = "NEATO_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Comma-separated list of bot numbers, e.g. "1,3". Use 0 or leave it
    /// empty to use all bots. Bot numbering starts at 1.
    #[arg(short, long)]
    bots: Option<String>,

    /// Interval between sensor readings, e.g. "1m", "30s" or "1h 30m".
    #[arg(short, long)]
    interval: Option<String>,

    /// What a failed state fetch does to the rest of the poll cycle.
    #[arg(long, value_enum)]
    failure_policy: Option<FailurePolicy>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("neato_exporter=info".parse()?)
                .add_directive("neato_core=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    if let Err(e) = run(args).await {
        tracing::error!("{:#}", e);
        return Err(e);
    }
    Ok(())
}

async fn run(args: Args) -> anyhow::Result<()> {
    // Load configuration
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };

    // Override config with CLI args
    if let Some(path) = args.path {
        config.server.path = path;
    }
    if let Some(listen) = args.listen_address {
        config.server.listen = listen;
    }
    if let Some(token) = args.token {
        config.cloud.token = token;
    }
    if let Some(bots) = args.bots {
        config.collector.bots = bots;
    }
    if let Some(interval) = args.interval {
        config.collector.interval = interval;
    }
    if let Some(policy) = args.failure_policy {
        config.collector.failure_policy = policy;
    }

    config.validate()?;
    let interval = config.collector.interval()?;
    let addr = config.server.socket_addr()?;

    let selection = Selection::parse(&config.collector.bots).map_err(startup::StartupError::from)?;

    let client = CloudClient::with_timeout(
        &config.cloud.endpoint,
        &config.cloud.token,
        config.cloud.timeout(),
    )
    .context("Failed to create Neato cloud client")?;
    info!("Using Neato cloud at {}", client.endpoint());

    let api: Arc<dyn RobotApi> = Arc::new(client);
    let robots = startup::select_robots(api.as_ref(), &selection).await?;

    let metrics = RobotMetrics::new().map_err(startup::StartupError::from)?;
    let state = AppState::new(metrics);

    // Start the background collector
    Collector::new(api, robots, Arc::clone(&state), interval)
        .with_failure_policy(config.collector.failure_policy)
        .start();

    let app = api::router(&config.server.path)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = startup::bind(addr).await?;
    info!(
        "Starting server on {} (metrics at {})",
        addr, config.server.path
    );

    axum::serve(listener, app).await?;

    Ok(())
}
