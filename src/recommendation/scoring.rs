//! Linear candidate scoring and ranking.

use crate::catalog_store::SongSummary;

use super::taste_profile::{AuthorWeights, GenreWeights, TasteProfile};

pub const GENRE_SCORE_WEIGHT: f64 = 0.5;
pub const AUTHOR_SCORE_WEIGHT: f64 = 0.3;
pub const VIEWS_SCORE_WEIGHT: f64 = 0.2;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub song: SongSummary,
    pub score: f64,
}

/// Mean profile weight over the song's genres, so tagging a song with many genres
/// does not inflate its score. Zero for a song without genres.
pub fn genre_score(song: &SongSummary, genres: &GenreWeights) -> f64 {
    if song.genres.is_empty() {
        return 0.0;
    }
    let sum: f64 = song.genres.iter().map(|g| genres.get(g)).sum();
    sum / song.genres.len() as f64
}

pub fn author_score(song: &SongSummary, authors: &AuthorWeights) -> f64 {
    authors.get(&song.author_id)
}

/// `log10(1 + views) / log_cap`, saturating at 1.0 for songs at or above the cap.
pub fn view_score(view_count: u64, log_cap: f64) -> f64 {
    debug_assert!(log_cap > 0.0);
    ((1.0 + view_count as f64).log10() / log_cap).min(1.0)
}

pub fn score(song: &SongSummary, profile: &TasteProfile, log_cap: f64) -> f64 {
    genre_score(song, &profile.genres) * GENRE_SCORE_WEIGHT
        + author_score(song, &profile.authors) * AUTHOR_SCORE_WEIGHT
        + view_score(song.view_count, log_cap) * VIEWS_SCORE_WEIGHT
}

/// Scores all candidates and sorts them best first. Equal scores keep their input order.
pub fn rank(
    candidates: Vec<SongSummary>,
    profile: &TasteProfile,
    log_cap: f64,
) -> Vec<ScoredCandidate> {
    let mut scored: Vec<ScoredCandidate> = candidates
        .into_iter()
        .map(|song| {
            let score = score(&song, profile, log_cap);
            ScoredCandidate { song, score }
        })
        .collect();
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}
