use super::context::JobContext;
use std::time::Duration;
use thiserror::Error;

/// How a job should be handled during server shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShutdownBehavior {
    /// Job can be cancelled immediately
    #[default]
    Cancellable,
    /// Wait for job to complete before shutdown
    WaitForCompletion,
}

/// Errors that can occur during job execution.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Job not found")]
    NotFound,
    #[error("Job is already running")]
    AlreadyRunning,
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
    #[error("Job was cancelled")]
    Cancelled,
}

/// Trait for background jobs.
///
/// Jobs are executed synchronously in a blocking context.
pub trait BackgroundJob: Send + Sync {
    /// Unique identifier for this job.
    fn id(&self) -> &'static str;

    /// Human-readable name for this job.
    fn name(&self) -> &'static str;

    /// Description of what this job does.
    fn description(&self) -> &'static str;

    /// Time between runs. The first run is one interval after registration.
    fn interval(&self) -> Duration;

    /// How this job should be handled during shutdown.
    fn shutdown_behavior(&self) -> ShutdownBehavior {
        ShutdownBehavior::Cancellable
    }

    /// Execute the job.
    ///
    /// This method is called from a blocking context using `spawn_blocking`.
    /// Implementations should check `ctx.is_cancelled()` before doing work
    /// and return `JobError::Cancelled` if set.
    fn execute(&self, ctx: &JobContext) -> Result<(), JobError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_shutdown_behavior_is_cancellable() {
        assert_eq!(ShutdownBehavior::default(), ShutdownBehavior::Cancellable);
    }

    #[test]
    fn job_error_messages() {
        assert_eq!(JobError::NotFound.to_string(), "Job not found");
        assert_eq!(
            JobError::ExecutionFailed("boom".to_string()).to_string(),
            "Execution failed: boom"
        );
    }
}
