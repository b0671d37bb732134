use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::{fmt::Debug, path::PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use playrank_server::background_jobs::{
    create_scheduler,
    jobs::{ViewBufferFlushJob, ViewCapRefreshJob},
};
use playrank_server::config;
use playrank_server::server::{metrics, run_server, RequestsLoggingLevel, ServerConfig, ServerState};
use playrank_server::{RecommendationEngine, SqliteMusicStore, ViewBuffer, ViewCapCache};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Path to the SQLite database holding songs, users and reactions.
    /// Created if missing. Can also be specified in config file.
    #[clap(long, value_parser = parse_path)]
    pub db_path: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            db_path: args.db_path.clone(),
            port: args.port,
            metrics_port: args.metrics_port,
            logging_level: args.logging_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    // Load TOML config if provided
    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    // Resolve final configuration (TOML overrides CLI)
    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = config::AppConfig::resolve(&cli_config, file_config)?;

    info!("Configuration loaded:");
    info!("  db_path: {:?}", app_config.db_path);
    info!("  port: {}", app_config.port);
    info!("  recommendation: {:?}", app_config.recommendation);
    info!("  view_buffer: {:?}", app_config.view_buffer);
    info!("  view_cap: {:?}", app_config.view_cap);

    info!("Initializing metrics...");
    metrics::init_metrics();

    if !app_config.db_path.exists() {
        info!("Creating new database at {:?}", app_config.db_path);
    }
    let store = Arc::new(SqliteMusicStore::new(&app_config.db_path)?);

    let view_cap = Arc::new(ViewCapCache::new(
        store.clone(),
        app_config.view_cap.percentile,
    )?);
    let view_buffer = Arc::new(ViewBuffer::new(
        store.clone(),
        app_config.view_buffer.requeue_failed,
    ));
    let engine = Arc::new(RecommendationEngine::new(
        store.clone(),
        store.clone(),
        view_cap.clone(),
        app_config.recommendation,
    ));

    // Set up background job scheduler
    let shutdown_token = CancellationToken::new();
    let (mut scheduler, scheduler_handle) = create_scheduler(shutdown_token.clone());
    scheduler
        .register_job(Arc::new(ViewCapRefreshJob::new(
            view_cap.clone(),
            app_config.view_cap.refresh_interval(),
        )))
        .await;
    scheduler
        .register_job(Arc::new(ViewBufferFlushJob::new(
            view_buffer.clone(),
            app_config.view_buffer.flush_interval(),
        )))
        .await;
    let scheduler_task = tokio::spawn(async move { scheduler.run().await });

    let server_config = ServerConfig {
        requests_logging_level: app_config.logging_level.clone(),
        port: app_config.port,
        metrics_port: app_config.metrics_port,
    };
    let state = ServerState::new(
        server_config,
        engine,
        view_buffer.clone(),
        Some(scheduler_handle),
    );
    let mut server_task = tokio::spawn(run_server(state, shutdown_token.clone()));

    let server_result = tokio::select! {
        result = &mut server_task => {
            info!("HTTP server stopped");
            shutdown_token.cancel();
            result.context("HTTP server task panicked")?
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, initiating graceful shutdown");
            shutdown_token.cancel();
            server_task.await.context("HTTP server task panicked")?
        }
    };

    if let Err(e) = scheduler_task.await {
        error!("Scheduler task failed: {}", e);
    }

    // Anything recorded after the last scheduled flush
    let report = view_buffer.flush();
    info!(
        "Final flush persisted {} views across {} songs ({} failed)",
        report.views, report.songs, report.failed
    );

    server_result
}
