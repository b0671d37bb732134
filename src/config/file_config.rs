use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub db_path: Option<String>,
    pub port: Option<u16>,
    pub metrics_port: Option<u16>,
    pub logging_level: Option<String>,

    // Feature configs
    pub recommendation: Option<RecommendationConfig>,
    pub view_buffer: Option<ViewBufferConfig>,
    pub view_cap: Option<ViewCapConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct RecommendationConfig {
    pub candidate_pool_size: Option<usize>,
    pub min_candidates: Option<usize>,
    pub backfill_pool_size: Option<usize>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ViewBufferConfig {
    pub flush_interval_secs: Option<u64>,
    /// Merge counts that failed to persist back into the buffer instead of dropping them.
    pub requeue_failed: Option<bool>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ViewCapConfig {
    pub refresh_interval_secs: Option<u64>,
    pub percentile: Option<f64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_all_sections() {
        let config: FileConfig = toml::from_str(
            r#"
            db_path = "/data/playrank.db"
            port = 4000
            logging_level = "headers"

            [recommendation]
            candidate_pool_size = 300
            min_candidates = 20

            [view_buffer]
            flush_interval_secs = 5
            requeue_failed = true

            [view_cap]
            percentile = 0.95
            "#,
        )
        .unwrap();

        assert_eq!(config.db_path.as_deref(), Some("/data/playrank.db"));
        assert_eq!(config.port, Some(4000));
        assert_eq!(config.metrics_port, None);

        let recommendation = config.recommendation.unwrap();
        assert_eq!(recommendation.candidate_pool_size, Some(300));
        assert_eq!(recommendation.min_candidates, Some(20));
        assert_eq!(recommendation.backfill_pool_size, None);

        let view_buffer = config.view_buffer.unwrap();
        assert_eq!(view_buffer.flush_interval_secs, Some(5));
        assert_eq!(view_buffer.requeue_failed, Some(true));

        let view_cap = config.view_cap.unwrap();
        assert_eq!(view_cap.percentile, Some(0.95));
        assert_eq!(view_cap.refresh_interval_secs, None);
    }

    #[test]
    fn load_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = \"not a number\"").unwrap();

        let err = FileConfig::load(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config file"));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = FileConfig::load(Path::new("/nonexistent/playrank.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
