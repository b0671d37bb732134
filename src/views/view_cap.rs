//! View count cap used to normalize the view-popularity score term.

use crate::catalog_store::CandidateCatalog;
use crate::server::metrics;
use anyhow::Result;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

pub const DEFAULT_VIEW_CAP_PERCENTILE: f64 = 0.9;

/// A view count cap and its precomputed `log10(1 + cap)`.
///
/// The cap is never below 1, so `log_cap` is always at least `log10(2)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewCap {
    cap: f64,
    log_cap: f64,
}

impl ViewCap {
    /// Builds a cap from a raw percentile value. Missing, non-finite and sub-1 values clamp to 1.
    pub fn new(raw: Option<f64>) -> Self {
        let cap = match raw {
            Some(value) if value.is_finite() && value >= 1.0 => value,
            _ => 1.0,
        };
        ViewCap {
            cap,
            log_cap: (1.0 + cap).log10(),
        }
    }

    pub fn cap(&self) -> f64 {
        self.cap
    }

    pub fn log_cap(&self) -> f64 {
        self.log_cap
    }
}

impl Default for ViewCap {
    fn default() -> Self {
        ViewCap::new(None)
    }
}

/// Source of the cap read by the scorer.
pub trait ViewCapProvider: Send + Sync {
    fn current(&self) -> ViewCap;

    fn current_log_cap(&self) -> f64 {
        self.current().log_cap()
    }
}

/// A fixed cap.
impl ViewCapProvider for ViewCap {
    fn current(&self) -> ViewCap {
        *self
    }
}

/// Process-wide cap recomputed from the catalog's view count distribution.
pub struct ViewCapCache {
    catalog: Arc<dyn CandidateCatalog>,
    percentile: f64,
    current: RwLock<ViewCap>,
}

impl ViewCapCache {
    /// Creates the cache and computes the first cap synchronously.
    pub fn new(catalog: Arc<dyn CandidateCatalog>, percentile: f64) -> Result<Self> {
        let cache = ViewCapCache {
            catalog,
            percentile,
            current: RwLock::new(ViewCap::default()),
        };
        cache.refresh()?;
        Ok(cache)
    }

    /// Recomputes the cap and swaps it in. On error the previous cap stays in place.
    pub fn refresh(&self) -> Result<ViewCap> {
        let raw = self.catalog.view_count_percentile(self.percentile)?;
        let cap = ViewCap::new(raw);
        *self.current.write() = cap;

        metrics::set_view_cap(cap.cap());
        info!(
            "View cap refreshed: p{} = {:?}, cap = {}, log cap = {:.4}",
            self.percentile * 100.0,
            raw,
            cap.cap(),
            cap.log_cap()
        );
        Ok(cap)
    }

    pub fn percentile(&self) -> f64 {
        self.percentile
    }
}

impl ViewCapProvider for ViewCapCache {
    fn current(&self) -> ViewCap {
        *self.current.read()
    }
}
