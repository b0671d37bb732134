//! Periodic persistence of buffered view events.

use crate::background_jobs::{
    context::JobContext,
    job::{BackgroundJob, JobError, ShutdownBehavior},
};
use crate::views::ViewBuffer;
use std::sync::Arc;
use std::time::Duration;

/// Default interval between flushes.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(10);

/// Drains the view buffer into the catalog's persisted view counts.
pub struct ViewBufferFlushJob {
    buffer: Arc<ViewBuffer>,
    interval: Duration,
}

impl ViewBufferFlushJob {
    pub fn new(buffer: Arc<ViewBuffer>, interval: Duration) -> Self {
        Self { buffer, interval }
    }
}

impl BackgroundJob for ViewBufferFlushJob {
    fn id(&self) -> &'static str {
        "view_buffer_flush"
    }

    fn name(&self) -> &'static str {
        "View Buffer Flush"
    }

    fn description(&self) -> &'static str {
        "Write buffered view events to the catalog as per-song increments"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn shutdown_behavior(&self) -> ShutdownBehavior {
        // A flush in progress has already detached its snapshot
        ShutdownBehavior::WaitForCompletion
    }

    fn execute(&self, ctx: &JobContext) -> Result<(), JobError> {
        if ctx.is_cancelled() {
            return Err(JobError::Cancelled);
        }

        let report = self.buffer.flush();
        if report.failed > 0 {
            return Err(JobError::ExecutionFailed(format!(
                "{} of {} songs failed to persist",
                report.failed,
                report.failed + report.songs
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog_store::{InMemoryMusicStore, SongSummary};
    use tokio_util::sync::CancellationToken;

    fn setup() -> (Arc<InMemoryMusicStore>, Arc<ViewBuffer>, ViewBufferFlushJob) {
        let catalog = Arc::new(InMemoryMusicStore::new());
        catalog.add_song(SongSummary {
            id: 42,
            title: "Song".to_string(),
            genres: vec![],
            author_id: 1,
            view_count: 0,
        });
        let buffer = Arc::new(ViewBuffer::new(catalog.clone(), false));
        let job = ViewBufferFlushJob::new(buffer.clone(), DEFAULT_FLUSH_INTERVAL);
        (catalog, buffer, job)
    }

    #[test]
    fn test_job_metadata() {
        let (_, _, job) = setup();
        assert_eq!(job.id(), "view_buffer_flush");
        assert_eq!(job.shutdown_behavior(), ShutdownBehavior::WaitForCompletion);
        assert_eq!(job.interval(), Duration::from_secs(10));
    }

    #[test]
    fn test_execute_flushes_buffer() {
        let (catalog, buffer, job) = setup();
        buffer.record(42);
        buffer.record(42);

        job.execute(&JobContext::new(CancellationToken::new()))
            .unwrap();
        assert_eq!(catalog.increment_calls(), vec![(42, 2)]);
        assert_eq!(buffer.pending_songs(), 0);
    }

    #[test]
    fn test_partial_failure_is_reported() {
        let (catalog, buffer, job) = setup();
        buffer.record(42);
        buffer.record(7);

        let err = job
            .execute(&JobContext::new(CancellationToken::new()))
            .unwrap_err();
        assert!(err.to_string().contains("1 of 2 songs failed"));
        assert_eq!(catalog.view_count(42), Some(1));
    }
}
