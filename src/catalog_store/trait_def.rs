//! CandidateCatalog trait definition.
//!
//! This trait abstracts the song catalog operations the recommendation core and
//! the view buffer depend on, so they can run against SQLite or a test double.

use super::models::{AuthorId, Page, SongId, SongSummary};
use crate::user::UserId;
use anyhow::Result;

/// Trait for song catalog backends.
pub trait CandidateCatalog: Send + Sync {
    // =========================================================================
    // Candidate Retrieval
    // =========================================================================

    /// Returns at most `limit` songs tagged with any of `genres` or written by any of
    /// `authors`, excluding every song `exclude_user` has reacted to.
    fn find_candidates(
        &self,
        genres: &[String],
        authors: &[AuthorId],
        exclude_user: UserId,
        limit: usize,
    ) -> Result<Vec<SongSummary>>;

    // =========================================================================
    // Popularity
    // =========================================================================

    /// Returns the `limit` most viewed songs, most viewed first.
    fn find_top_popular(&self, limit: usize) -> Result<Vec<SongSummary>>;

    /// Returns one page of the popularity ranking used by [`find_top_popular`].
    ///
    /// [`find_top_popular`]: CandidateCatalog::find_top_popular
    fn find_top_popular_page(&self, page: usize, size: usize) -> Result<Page<SongSummary>>;

    // =========================================================================
    // View Counts
    // =========================================================================

    /// Returns the given percentile (in `0.0..=1.0`) of all songs' view counts.
    /// Returns Ok(None) if the catalog has no songs.
    fn view_count_percentile(&self, percentile: f64) -> Result<Option<f64>>;

    /// Adds `delta` to a song's persisted view count.
    /// Returns Err if the song does not exist.
    fn increment_view_count(&self, song_id: SongId, delta: u64) -> Result<()>;
}
