//! Specific background job implementations.

pub mod view_buffer_flush;
pub mod view_cap_refresh;

pub use view_buffer_flush::{ViewBufferFlushJob, DEFAULT_FLUSH_INTERVAL};
pub use view_cap_refresh::{ViewCapRefreshJob, DEFAULT_REFRESH_INTERVAL};
