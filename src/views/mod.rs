mod view_buffer;
mod view_cap;

pub use view_buffer::{FlushReport, ViewBuffer};
pub use view_cap::{ViewCap, ViewCapCache, ViewCapProvider, DEFAULT_VIEW_CAP_PERCENTILE};
