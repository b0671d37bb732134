use axum::extract::FromRef;

use crate::background_jobs::SchedulerHandle;
use crate::recommendation::RecommendationEngine;
use crate::views::ViewBuffer;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedRecommendationEngine = Arc<RecommendationEngine>;
pub type GuardedViewBuffer = Arc<ViewBuffer>;
pub type OptionalSchedulerHandle = Option<SchedulerHandle>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub engine: GuardedRecommendationEngine,
    pub view_buffer: GuardedViewBuffer,
    pub scheduler_handle: OptionalSchedulerHandle,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        engine: GuardedRecommendationEngine,
        view_buffer: GuardedViewBuffer,
        scheduler_handle: OptionalSchedulerHandle,
    ) -> Self {
        ServerState {
            config,
            start_time: Instant::now(),
            engine,
            view_buffer,
            scheduler_handle,
        }
    }
}

impl FromRef<ServerState> for GuardedRecommendationEngine {
    fn from_ref(input: &ServerState) -> Self {
        input.engine.clone()
    }
}

impl FromRef<ServerState> for GuardedViewBuffer {
    fn from_ref(input: &ServerState) -> Self {
        input.view_buffer.clone()
    }
}

impl FromRef<ServerState> for OptionalSchedulerHandle {
    fn from_ref(input: &ServerState) -> Self {
        input.scheduler_handle.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
