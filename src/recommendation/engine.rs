use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::debug;

use super::scoring::rank;
use super::taste_profile::TasteProfile;
use crate::catalog_store::{CandidateCatalog, Page, SongId, SongSummary};
use crate::server::metrics;
use crate::user::{ReactionHistory, ReactionHistoryStore, UserId};
use crate::views::ViewCapProvider;

#[derive(Debug, Error)]
pub enum RecommendationError {
    #[error("User {0} not found")]
    UserNotFound(UserId),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendationSettings {
    /// Upper bound on candidates fetched by genre/author overlap.
    pub candidate_pool_size: usize,
    /// Below this many candidates the pool is backfilled from global popularity.
    pub min_candidates: usize,
    /// How many globally popular songs are considered for backfill.
    pub backfill_pool_size: usize,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        RecommendationSettings {
            candidate_pool_size: 200,
            min_candidates: 10,
            backfill_pool_size: 50,
        }
    }
}

/// How a recommendation page was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendationPath {
    Anonymous,
    ColdStart,
    Personalized,
}

impl RecommendationPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationPath::Anonymous => "anonymous",
            RecommendationPath::ColdStart => "cold_start",
            RecommendationPath::Personalized => "personalized",
        }
    }
}

pub struct RecommendationEngine {
    reactions: Arc<dyn ReactionHistoryStore>,
    catalog: Arc<dyn CandidateCatalog>,
    view_cap: Arc<dyn ViewCapProvider>,
    settings: RecommendationSettings,
}

impl RecommendationEngine {
    pub fn new(
        reactions: Arc<dyn ReactionHistoryStore>,
        catalog: Arc<dyn CandidateCatalog>,
        view_cap: Arc<dyn ViewCapProvider>,
        settings: RecommendationSettings,
    ) -> Self {
        RecommendationEngine {
            reactions,
            catalog,
            view_cap,
            settings,
        }
    }

    pub fn settings(&self) -> &RecommendationSettings {
        &self.settings
    }

    /// Returns a page of recommended songs.
    ///
    /// Anonymous callers and users without any reaction get the global popularity
    /// ranking. A user id that does not resolve to a user is an error.
    pub fn get_recommendations(
        &self,
        user_id: Option<UserId>,
        page: usize,
        size: usize,
    ) -> Result<Page<SongSummary>, RecommendationError> {
        if size == 0 {
            return Err(RecommendationError::InvalidRequest(
                "page size must be greater than zero".to_string(),
            ));
        }

        let start = Instant::now();
        let path = match user_id {
            None => RecommendationPath::Anonymous,
            Some(_) => RecommendationPath::Personalized,
        };
        let result = self.recommend(user_id, page, size);
        let (path, success) = match &result {
            Ok((path, _)) => (*path, true),
            Err(_) => (path, false),
        };
        metrics::record_recommendation(path.as_str(), success, start.elapsed());

        result.map(|(_, page)| page)
    }

    fn recommend(
        &self,
        user_id: Option<UserId>,
        page: usize,
        size: usize,
    ) -> Result<(RecommendationPath, Page<SongSummary>), RecommendationError> {
        let Some(user_id) = user_id else {
            let top = self.catalog.find_top_popular_page(page, size)?;
            return Ok((RecommendationPath::Anonymous, top));
        };

        if !self.reactions.user_exists(user_id)? {
            return Err(RecommendationError::UserNotFound(user_id));
        }

        let history = self.reactions.get_reaction_history(user_id)?;
        if history.is_empty() {
            debug!("User {} has no reactions, serving global top", user_id);
            let top = self.catalog.find_top_popular_page(page, size)?;
            return Ok((RecommendationPath::ColdStart, top));
        }

        let profile = TasteProfile::build(&history);
        let candidates = self.catalog.find_candidates(
            &profile.genres.sorted_keys(),
            &profile.authors.sorted_keys(),
            user_id,
            self.settings.candidate_pool_size,
        )?;
        let candidate_count = candidates.len();
        let candidates = self.backfill(candidates, &history)?;

        let log_cap = self.view_cap.current_log_cap();
        let ranked = rank(candidates, &profile, log_cap);
        debug!(
            "User {}: {} genres, {} authors, {} candidates ({} backfilled), log cap {:.4}",
            user_id,
            profile.genres.len(),
            profile.authors.len(),
            ranked.len(),
            ranked.len() - candidate_count,
            log_cap
        );

        let songs = ranked.into_iter().map(|scored| scored.song).collect();
        Ok((
            RecommendationPath::Personalized,
            Page::slice(songs, page, size),
        ))
    }

    /// Tops up a thin candidate pool with popular songs, in popularity order,
    /// skipping disliked songs and songs already in the pool.
    fn backfill(
        &self,
        mut candidates: Vec<SongSummary>,
        history: &ReactionHistory,
    ) -> anyhow::Result<Vec<SongSummary>> {
        if candidates.len() >= self.settings.min_candidates {
            return Ok(candidates);
        }

        let disliked = history.disliked_ids();
        let mut present: HashSet<SongId> = candidates.iter().map(|s| s.id).collect();
        for song in self
            .catalog
            .find_top_popular(self.settings.backfill_pool_size)?
        {
            if candidates.len() >= self.settings.min_candidates {
                break;
            }
            if disliked.contains(&song.id) || !present.insert(song.id) {
                continue;
            }
            candidates.push(song);
        }
        Ok(candidates)
    }
}
