use axum::{http::StatusCode, response::IntoResponse};
use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Encoder, Gauge, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry,
    TextEncoder,
};
use std::time::Duration;

/// Metric name prefix for all Playrank metrics
const PREFIX: &str = "playrank";

lazy_static! {
    // Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Request Metrics
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_http_requests_total"), "Total number of HTTP requests"),
        &["method", "path", "status"]
    ).expect("Failed to create http_requests_total metric");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_http_request_duration_seconds"),
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]),
        &["method", "path"]
    ).expect("Failed to create http_request_duration_seconds metric");

    // Recommendation Metrics
    pub static ref RECOMMENDATION_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(
            format!("{PREFIX}_recommendation_requests_total"),
            "Recommendation requests by serving path"
        ),
        &["path", "status"]
    ).expect("Failed to create recommendation_requests_total metric");

    pub static ref RECOMMENDATION_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_recommendation_duration_seconds"),
            "Time spent computing a recommendation page"
        )
        .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
        &["path"]
    ).expect("Failed to create recommendation_duration_seconds metric");

    // View Metrics
    pub static ref VIEW_EVENTS_BUFFERED_TOTAL: Counter = Counter::new(
        format!("{PREFIX}_view_events_buffered_total"),
        "View events recorded into the in-memory buffer"
    ).expect("Failed to create view_events_buffered_total metric");

    pub static ref VIEW_SONGS_FLUSHED_TOTAL: Counter = Counter::new(
        format!("{PREFIX}_view_songs_flushed_total"),
        "Per-song view count increments written to the catalog"
    ).expect("Failed to create view_songs_flushed_total metric");

    pub static ref VIEW_FLUSH_FAILURES_TOTAL: Counter = Counter::new(
        format!("{PREFIX}_view_flush_failures_total"),
        "Per-song view count increments that failed to persist"
    ).expect("Failed to create view_flush_failures_total metric");

    pub static ref VIEW_CAP: Gauge = Gauge::new(
        format!("{PREFIX}_view_cap"),
        "Current view count cap used to normalize view popularity"
    ).expect("Failed to create view_cap metric");

    // Background Job Metrics
    pub static ref BACKGROUND_JOB_EXECUTIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(
            format!("{PREFIX}_background_job_executions_total"),
            "Total background job executions"
        ),
        &["job_id", "status"]
    ).expect("Failed to create background_job_executions_total metric");

    pub static ref BACKGROUND_JOB_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_background_job_duration_seconds"),
            "Background job execution duration in seconds"
        )
        .buckets(vec![0.01, 0.1, 0.5, 1.0, 5.0, 10.0, 60.0]),
        &["job_id"]
    ).expect("Failed to create background_job_duration_seconds metric");

    pub static ref BACKGROUND_JOB_RUNNING: GaugeVec = GaugeVec::new(
        Opts::new(
            format!("{PREFIX}_background_job_running"),
            "Whether a background job is currently running"
        ),
        &["job_id"]
    ).expect("Failed to create background_job_running metric");
}

/// Initialize all metrics and register them with the Prometheus registry
pub fn init_metrics() {
    // Ignore errors if already registered (for tests)
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(RECOMMENDATION_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(RECOMMENDATION_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(VIEW_EVENTS_BUFFERED_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(VIEW_SONGS_FLUSHED_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(VIEW_FLUSH_FAILURES_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(VIEW_CAP.clone()));
    let _ = REGISTRY.register(Box::new(BACKGROUND_JOB_EXECUTIONS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(BACKGROUND_JOB_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(BACKGROUND_JOB_RUNNING.clone()));

    tracing::info!("Metrics system initialized successfully");
}

/// Record an HTTP request
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration.as_secs_f64());
}

/// Record a recommendation request served through `path` (anonymous, cold_start, personalized)
pub fn record_recommendation(path: &str, success: bool, duration: Duration) {
    let status = if success { "success" } else { "error" };
    RECOMMENDATION_REQUESTS_TOTAL
        .with_label_values(&[path, status])
        .inc();

    RECOMMENDATION_DURATION_SECONDS
        .with_label_values(&[path])
        .observe(duration.as_secs_f64());
}

pub fn record_view_buffered() {
    VIEW_EVENTS_BUFFERED_TOTAL.inc();
}

/// Record the outcome of one view buffer flush
pub fn record_view_flush(flushed_songs: usize, failed_songs: usize) {
    VIEW_SONGS_FLUSHED_TOTAL.inc_by(flushed_songs as f64);
    VIEW_FLUSH_FAILURES_TOTAL.inc_by(failed_songs as f64);
}

pub fn set_view_cap(cap: f64) {
    VIEW_CAP.set(cap);
}

/// Record a background job execution
pub fn record_background_job_execution(job_id: &str, status: &str, duration: Duration) {
    BACKGROUND_JOB_EXECUTIONS_TOTAL
        .with_label_values(&[job_id, status])
        .inc();

    BACKGROUND_JOB_DURATION_SECONDS
        .with_label_values(&[job_id])
        .observe(duration.as_secs_f64());
}

pub fn set_background_job_running(job_id: &str, running: bool) {
    BACKGROUND_JOB_RUNNING
        .with_label_values(&[job_id])
        .set(if running { 1.0 } else { 0.0 });
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = vec![];
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => {
            let response = String::from_utf8(buffer).unwrap_or_default();
            (StatusCode::OK, response)
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}
