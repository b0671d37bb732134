use anyhow::{Context, Result};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::background_jobs::JobError;
use crate::catalog_store::SongId;
use crate::recommendation::RecommendationError;
use crate::user::UserId;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::metrics::metrics_handler;
use super::{log_requests, state::*};

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub pending_view_songs: usize,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Deserialize, Debug, Default)]
struct RecommendationsQuery {
    pub page: Option<usize>,
    pub size: Option<usize>,
    pub user_id: Option<UserId>,
}

impl RecommendationsQuery {
    fn page_size(&self) -> usize {
        self.size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        pending_view_songs: state.view_buffer.pending_songs(),
    };
    Json(stats)
}

async fn get_recommendations(
    State(engine): State<GuardedRecommendationEngine>,
    Query(query): Query<RecommendationsQuery>,
) -> Response {
    let page = query.page.unwrap_or(0);
    let size = query.page_size();

    match engine.get_recommendations(query.user_id, page, size) {
        Ok(page) => Json(page).into_response(),
        Err(RecommendationError::UserNotFound(user_id)) => {
            error_response(StatusCode::NOT_FOUND, format!("User {} not found", user_id))
        }
        Err(RecommendationError::InvalidRequest(msg)) => {
            error_response(StatusCode::BAD_REQUEST, msg)
        }
        Err(err) => {
            error!("Failed to compute recommendations: {:#}", err);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to compute recommendations",
            )
        }
    }
}

async fn post_song_view(
    State(view_buffer): State<GuardedViewBuffer>,
    Path(song_id): Path<SongId>,
) -> StatusCode {
    view_buffer.record(song_id);
    StatusCode::NO_CONTENT
}

fn scheduler_unavailable() -> Response {
    error_response(
        StatusCode::SERVICE_UNAVAILABLE,
        "Job scheduler not available",
    )
}

/// GET /v1/admin/jobs
async fn admin_list_jobs(State(scheduler): State<OptionalSchedulerHandle>) -> Response {
    match scheduler {
        Some(handle) => Json(handle.list_jobs().await).into_response(),
        None => scheduler_unavailable(),
    }
}

/// GET /v1/admin/jobs/{id}
async fn admin_get_job(
    State(scheduler): State<OptionalSchedulerHandle>,
    Path(job_id): Path<String>,
) -> Response {
    let Some(handle) = scheduler else {
        return scheduler_unavailable();
    };
    match handle.get_job(&job_id).await {
        Some(job) => Json(job).into_response(),
        None => error_response(StatusCode::NOT_FOUND, format!("Job not found: {}", job_id)),
    }
}

/// POST /v1/admin/jobs/{id}/trigger
async fn admin_trigger_job(
    State(scheduler): State<OptionalSchedulerHandle>,
    Path(job_id): Path<String>,
) -> Response {
    let Some(handle) = scheduler else {
        return scheduler_unavailable();
    };
    match handle.trigger_job(&job_id).await {
        Ok(()) => {
            info!("Job {} triggered manually", job_id);
            StatusCode::ACCEPTED.into_response()
        }
        Err(JobError::NotFound) => {
            error_response(StatusCode::NOT_FOUND, format!("Job not found: {}", job_id))
        }
        Err(JobError::AlreadyRunning) => {
            error_response(StatusCode::CONFLICT, "Job is already running")
        }
        Err(err) => {
            warn!("Failed to trigger job {}: {}", job_id, err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

pub fn make_app(state: ServerState) -> Router {
    let recommendation_routes: Router = Router::new()
        .route("/recommendations", get(get_recommendations))
        .route("/songs/{id}/view", post(post_song_view))
        .with_state(state.clone());

    let admin_routes: Router = Router::new()
        .route("/jobs", get(admin_list_jobs))
        .route("/jobs/{id}", get(admin_get_job))
        .route("/jobs/{id}/trigger", post(admin_trigger_job))
        .with_state(state.clone());

    let app: Router = Router::new()
        .route("/", get(home))
        .with_state(state.clone())
        .nest("/v1", recommendation_routes)
        .nest("/v1/admin", admin_routes);

    app.layer(middleware::from_fn_with_state(state, log_requests))
}

pub fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

/// Serves the API and the metrics endpoint until `shutdown_token` is cancelled.
pub async fn run_server(state: ServerState, shutdown_token: CancellationToken) -> Result<()> {
    let port = state.config.port;
    let metrics_port = state.config.metrics_port;

    let app = make_app(state);
    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;

    let metrics_listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", metrics_port))
        .await
        .with_context(|| format!("Failed to bind metrics port {}", metrics_port))?;

    info!("Ready to serve at port {}!", port);
    info!("Metrics available at port {}!", metrics_port);

    let api_token = shutdown_token.clone();
    let api_server = async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { api_token.cancelled().await })
            .await
            .context("API server failed")
    };

    let metrics_token = shutdown_token;
    let metrics_server = async move {
        axum::serve(metrics_listener, make_metrics_app())
            .with_graceful_shutdown(async move { metrics_token.cancelled().await })
            .await
            .context("Metrics server failed")
    };

    tokio::try_join!(api_server, metrics_server)?;
    Ok(())
}
