//! Periodic view cap recomputation.

use crate::background_jobs::{
    context::JobContext,
    job::{BackgroundJob, JobError, ShutdownBehavior},
};
use crate::views::ViewCapCache;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Default interval between cap refreshes (1 hour).
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Recomputes the view count percentile the scorer normalizes against.
///
/// The cache computes its first value when constructed, before the server accepts
/// requests, so the job only runs on its interval.
pub struct ViewCapRefreshJob {
    cache: Arc<ViewCapCache>,
    interval: Duration,
}

impl ViewCapRefreshJob {
    pub fn new(cache: Arc<ViewCapCache>, interval: Duration) -> Self {
        Self { cache, interval }
    }
}

impl BackgroundJob for ViewCapRefreshJob {
    fn id(&self) -> &'static str {
        "view_cap_refresh"
    }

    fn name(&self) -> &'static str {
        "View Cap Refresh"
    }

    fn description(&self) -> &'static str {
        "Recompute the view count percentile used to normalize view popularity"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn shutdown_behavior(&self) -> ShutdownBehavior {
        // Nothing is lost if a refresh is skipped
        ShutdownBehavior::Cancellable
    }

    fn execute(&self, ctx: &JobContext) -> Result<(), JobError> {
        if ctx.is_cancelled() {
            return Err(JobError::Cancelled);
        }

        let cap = self
            .cache
            .refresh()
            .map_err(|e| JobError::ExecutionFailed(format!("{:#}", e)))?;
        debug!("View cap is now {}", cap.cap());
        Ok(())
    }
}
