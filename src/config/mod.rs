mod file_config;

pub use file_config::{FileConfig, RecommendationConfig, ViewBufferConfig, ViewCapConfig};

use crate::background_jobs::jobs::{DEFAULT_FLUSH_INTERVAL, DEFAULT_REFRESH_INTERVAL};
use crate::recommendation::RecommendationSettings;
use crate::server::RequestsLoggingLevel;
use crate::views::DEFAULT_VIEW_CAP_PERCENTILE;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;

/// Longest accepted interval for the periodic jobs (one week).
pub const MAX_JOB_INTERVAL_SECS: u64 = 7 * 24 * 60 * 60;

fn check_interval(name: &str, secs: u64) -> Result<()> {
    if secs == 0 || secs > MAX_JOB_INTERVAL_SECS {
        bail!(
            "{} must be between 1 and {} seconds, got {}",
            name,
            MAX_JOB_INTERVAL_SECS,
            secs
        );
    }
    Ok(())
}

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_path: Option<PathBuf>,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Core settings
    pub db_path: PathBuf,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,

    // Feature configs (with defaults)
    pub recommendation: RecommendationSettings,
    pub view_buffer: ViewBufferSettings,
    pub view_cap: ViewCapSettings,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        // TOML overrides CLI for each field
        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_path must be specified via --db-path or in config file")
            })?;

        if db_path.is_dir() {
            bail!("db_path is a directory: {:?}", db_path);
        }
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                bail!("Database directory does not exist: {:?}", parent);
            }
        }

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let defaults = RecommendationSettings::default();
        let rec_file = file.recommendation.unwrap_or_default();
        let recommendation = RecommendationSettings {
            candidate_pool_size: rec_file
                .candidate_pool_size
                .unwrap_or(defaults.candidate_pool_size),
            min_candidates: rec_file.min_candidates.unwrap_or(defaults.min_candidates),
            backfill_pool_size: rec_file
                .backfill_pool_size
                .unwrap_or(defaults.backfill_pool_size),
        };
        if recommendation.candidate_pool_size == 0 {
            bail!("recommendation.candidate_pool_size must be greater than 0");
        }
        if recommendation.backfill_pool_size == 0 {
            bail!("recommendation.backfill_pool_size must be greater than 0");
        }

        let vb_file = file.view_buffer.unwrap_or_default();
        let view_buffer = ViewBufferSettings {
            flush_interval_secs: vb_file
                .flush_interval_secs
                .unwrap_or(DEFAULT_FLUSH_INTERVAL.as_secs()),
            requeue_failed: vb_file.requeue_failed.unwrap_or(false),
        };
        check_interval(
            "view_buffer.flush_interval_secs",
            view_buffer.flush_interval_secs,
        )?;

        let vc_file = file.view_cap.unwrap_or_default();
        let view_cap = ViewCapSettings {
            refresh_interval_secs: vc_file
                .refresh_interval_secs
                .unwrap_or(DEFAULT_REFRESH_INTERVAL.as_secs()),
            percentile: vc_file.percentile.unwrap_or(DEFAULT_VIEW_CAP_PERCENTILE),
        };
        check_interval(
            "view_cap.refresh_interval_secs",
            view_cap.refresh_interval_secs,
        )?;
        if !(view_cap.percentile > 0.0 && view_cap.percentile <= 1.0) {
            bail!(
                "view_cap.percentile must be in (0, 1], got {}",
                view_cap.percentile
            );
        }

        Ok(Self {
            db_path,
            port,
            metrics_port,
            logging_level,
            recommendation,
            view_buffer,
            view_cap,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewBufferSettings {
    pub flush_interval_secs: u64,
    pub requeue_failed: bool,
}

impl ViewBufferSettings {
    pub fn flush_interval(&self) -> Duration {
        Duration::from_secs(self.flush_interval_secs)
    }
}

impl Default for ViewBufferSettings {
    fn default() -> Self {
        Self {
            flush_interval_secs: DEFAULT_FLUSH_INTERVAL.as_secs(),
            requeue_failed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewCapSettings {
    pub refresh_interval_secs: u64,
    pub percentile: f64,
}

impl ViewCapSettings {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

impl Default for ViewCapSettings {
    fn default() -> Self {
        Self {
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL.as_secs(),
            percentile: DEFAULT_VIEW_CAP_PERCENTILE,
        }
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
