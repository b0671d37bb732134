//! In-memory coalescing of view events.
//!
//! Views are counted per song in a concurrent map and periodically written to the
//! catalog as one increment per distinct song.

use crate::catalog_store::{CandidateCatalog, SongId};
use crate::server::metrics;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, error, info};

/// What a single flush did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Distinct songs successfully incremented.
    pub songs: usize,
    /// Views persisted across those songs.
    pub views: u64,
    /// Songs whose increment failed.
    pub failed: usize,
}

impl FlushReport {
    pub fn is_empty(&self) -> bool {
        self.songs == 0 && self.failed == 0
    }
}

pub struct ViewBuffer {
    catalog: Arc<dyn CandidateCatalog>,
    // Writers share the read side and go through DashMap's per-shard locking.
    // A flush takes the write side only long enough to swap the map out.
    pending: RwLock<DashMap<SongId, u64>>,
    requeue_failed: bool,
}

impl ViewBuffer {
    /// With `requeue_failed` set, counts whose increment fails are merged back into the
    /// live buffer and retried on the next flush. Otherwise they are logged and dropped.
    pub fn new(catalog: Arc<dyn CandidateCatalog>, requeue_failed: bool) -> Self {
        ViewBuffer {
            catalog,
            pending: RwLock::new(DashMap::new()),
            requeue_failed,
        }
    }

    pub fn record(&self, song_id: SongId) {
        self.add(song_id, 1);
        metrics::record_view_buffered();
    }

    fn add(&self, song_id: SongId, count: u64) {
        let pending = self.pending.read();
        *pending.entry(song_id).or_insert(0) += count;
    }

    pub fn pending_views(&self, song_id: SongId) -> u64 {
        self.pending
            .read()
            .get(&song_id)
            .map(|count| *count)
            .unwrap_or(0)
    }

    pub fn pending_songs(&self) -> usize {
        self.pending.read().len()
    }

    /// Detaches every pending count, leaving an empty map for new events.
    fn take_snapshot(&self) -> Vec<(SongId, u64)> {
        let drained = std::mem::take(&mut *self.pending.write());
        let mut snapshot: Vec<(SongId, u64)> = drained.into_iter().collect();
        snapshot.sort_unstable_by_key(|(song_id, _)| *song_id);
        snapshot
    }

    /// Writes all pending counts to the catalog, one increment per song.
    pub fn flush(&self) -> FlushReport {
        let snapshot = self.take_snapshot();
        if snapshot.is_empty() {
            return FlushReport::default();
        }

        let mut report = FlushReport::default();
        for (song_id, count) in snapshot {
            match self.catalog.increment_view_count(song_id, count) {
                Ok(()) => {
                    report.songs += 1;
                    report.views += count;
                }
                Err(err) => {
                    report.failed += 1;
                    if self.requeue_failed {
                        error!(
                            "Failed to persist {} views of song {}, requeueing: {:#}",
                            count, song_id, err
                        );
                        self.add(song_id, count);
                    } else {
                        error!(
                            "Failed to persist {} views of song {}, dropping them: {:#}",
                            count, song_id, err
                        );
                    }
                }
            }
        }

        metrics::record_view_flush(report.songs, report.failed);
        if report.failed > 0 {
            info!(
                "Flushed {} views across {} songs, {} songs failed",
                report.views, report.songs, report.failed
            );
        } else {
            debug!(
                "Flushed {} views across {} songs",
                report.views, report.songs
            );
        }
        report
    }
}
