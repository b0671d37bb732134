//! Background job scheduling and execution system.
//!
//! This module runs the periodic maintenance of the recommendation core:
//! flushing buffered views and recomputing the view cap.

mod context;
mod handle;
mod job;
pub mod jobs;
mod scheduler;

pub use context::JobContext;
pub use handle::{JobInfo, JobRunInfo, SchedulerHandle};
pub use job::{BackgroundJob, JobError, ShutdownBehavior};
pub use scheduler::{create_scheduler, JobScheduler};
