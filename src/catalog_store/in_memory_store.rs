//! In-memory catalog and reaction history.
//!
//! Holds everything in a single lock-protected state. Useful for tests and for
//! embedding the recommendation core without a database. Unit tests additionally
//! record every [`CandidateCatalog::increment_view_count`] call and can make
//! increments fail for chosen songs.

use super::models::{AuthorId, Page, SongId, SongSummary};
use super::trait_def::CandidateCatalog;
use crate::user::{ReactionHistoryStore, ReactionKind, ReactionSummary, UserId};
use anyhow::{bail, Result};
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::collections::HashSet;

#[derive(Default)]
struct State {
    songs: Vec<SongSummary>,
    users: HashSet<UserId>,
    reactions: Vec<(UserId, SongId, ReactionKind)>,
    #[cfg(test)]
    increment_calls: Vec<(SongId, u64)>,
    #[cfg(test)]
    failing_increments: HashSet<SongId>,
}

impl State {
    fn popularity_ranking(&self) -> Vec<SongSummary> {
        let mut songs = self.songs.clone();
        songs.sort_by(popularity_order);
        songs
    }

    fn reacted_by(&self, user_id: UserId) -> HashSet<SongId> {
        self.reactions
            .iter()
            .filter(|(u, _, _)| *u == user_id)
            .map(|(_, s, _)| *s)
            .collect()
    }

    #[cfg(test)]
    fn record_increment(&mut self, song_id: SongId, delta: u64) -> Result<()> {
        self.increment_calls.push((song_id, delta));
        if self.failing_increments.contains(&song_id) {
            bail!("Injected failure incrementing song {}", song_id);
        }
        Ok(())
    }
}

fn popularity_order(a: &SongSummary, b: &SongSummary) -> Ordering {
    b.view_count
        .cmp(&a.view_count)
        .then_with(|| a.id.cmp(&b.id))
}

#[derive(Default)]
pub struct InMemoryMusicStore {
    state: RwLock<State>,
}

impl InMemoryMusicStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, user_id: UserId) {
        self.state.write().users.insert(user_id);
    }

    /// Adds a song, replacing any song with the same id.
    pub fn add_song(&self, song: SongSummary) {
        let mut state = self.state.write();
        state.songs.retain(|s| s.id != song.id);
        state.songs.push(song);
    }

    /// Records a reaction. LIKE and DISLIKE replace each other.
    pub fn react(&self, user_id: UserId, song_id: SongId, kind: ReactionKind) {
        let mut state = self.state.write();
        let opposite = kind.opposite();
        state.reactions.retain(|(u, s, k)| {
            !(*u == user_id && *s == song_id && (*k == kind || Some(*k) == opposite))
        });
        state.reactions.push((user_id, song_id, kind));
    }

    /// Makes every subsequent increment for `song_id` fail.
    #[cfg(test)]
    pub fn fail_increments_for(&self, song_id: SongId) {
        self.state.write().failing_increments.insert(song_id);
    }

    #[cfg(test)]
    pub fn clear_failures(&self) {
        self.state.write().failing_increments.clear();
    }

    /// Every increment call received so far, failed ones included, in call order.
    #[cfg(test)]
    pub fn increment_calls(&self) -> Vec<(SongId, u64)> {
        self.state.read().increment_calls.clone()
    }

    pub fn view_count(&self, song_id: SongId) -> Option<u64> {
        self.state
            .read()
            .songs
            .iter()
            .find(|s| s.id == song_id)
            .map(|s| s.view_count)
    }
}

impl ReactionHistoryStore for InMemoryMusicStore {
    fn user_exists(&self, user_id: UserId) -> Result<bool> {
        Ok(self.state.read().users.contains(&user_id))
    }

    fn get_reacted_songs(
        &self,
        user_id: UserId,
        kind: ReactionKind,
    ) -> Result<Vec<ReactionSummary>> {
        let state = self.state.read();
        Ok(state
            .reactions
            .iter()
            .filter(|(u, _, k)| *u == user_id && *k == kind)
            .filter_map(|(_, song_id, _)| state.songs.iter().find(|s| s.id == *song_id))
            .map(|s| ReactionSummary {
                song_id: s.id,
                genres: s.genres.clone(),
                author_id: s.author_id,
            })
            .collect())
    }
}

impl CandidateCatalog for InMemoryMusicStore {
    fn find_candidates(
        &self,
        genres: &[String],
        authors: &[AuthorId],
        exclude_user: UserId,
        limit: usize,
    ) -> Result<Vec<SongSummary>> {
        let state = self.state.read();
        let reacted = state.reacted_by(exclude_user);
        Ok(state
            .popularity_ranking()
            .into_iter()
            .filter(|s| !reacted.contains(&s.id))
            .filter(|s| {
                authors.contains(&s.author_id) || s.genres.iter().any(|g| genres.contains(g))
            })
            .take(limit)
            .collect())
    }

    fn find_top_popular(&self, limit: usize) -> Result<Vec<SongSummary>> {
        Ok(self
            .state
            .read()
            .popularity_ranking()
            .into_iter()
            .take(limit)
            .collect())
    }

    fn find_top_popular_page(&self, page: usize, size: usize) -> Result<Page<SongSummary>> {
        Ok(Page::slice(
            self.state.read().popularity_ranking(),
            page,
            size,
        ))
    }

    fn view_count_percentile(&self, percentile: f64) -> Result<Option<f64>> {
        if !(0.0..=1.0).contains(&percentile) {
            bail!("Percentile must be within [0, 1], got {}", percentile);
        }
        let mut views: Vec<u64> = self
            .state
            .read()
            .songs
            .iter()
            .map(|s| s.view_count)
            .collect();
        if views.is_empty() {
            return Ok(None);
        }
        views.sort_unstable();

        let position = percentile * (views.len() - 1) as f64;
        let lower_rank = position.floor() as usize;
        let lower = views[lower_rank] as f64;
        let upper = views.get(lower_rank + 1).map(|v| *v as f64).unwrap_or(lower);
        Ok(Some(lower + (upper - lower) * (position - lower_rank as f64)))
    }

    fn increment_view_count(&self, song_id: SongId, delta: u64) -> Result<()> {
        let mut state = self.state.write();
        #[cfg(test)]
        state.record_increment(song_id, delta)?;
        match state.songs.iter_mut().find(|s| s.id == song_id) {
            Some(song) => {
                song.view_count += delta;
                Ok(())
            }
            None => bail!("Song {} not found", song_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(id: SongId, genres: &[&str], author_id: AuthorId, view_count: u64) -> SongSummary {
        SongSummary {
            id,
            title: format!("Song {}", id),
            genres: genres.iter().map(|g| g.to_string()).collect(),
            author_id,
            view_count,
        }
    }

    #[test]
    fn candidates_follow_popularity_and_exclude_reacted() {
        let store = InMemoryMusicStore::new();
        store.add_user(1);
        store.add_song(song(1, &["rock"], 10, 5));
        store.add_song(song(2, &["rock"], 11, 50));
        store.add_song(song(3, &["pop"], 10, 5));
        store.add_song(song(4, &["pop"], 12, 500));
        store.react(1, 2, ReactionKind::Like);

        let ids: Vec<SongId> = store
            .find_candidates(&["rock".to_string()], &[10], 1, 10)
            .unwrap()
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn like_replaces_dislike() {
        let store = InMemoryMusicStore::new();
        store.add_song(song(1, &[], 10, 0));
        store.react(1, 1, ReactionKind::Dislike);
        store.react(1, 1, ReactionKind::Like);
        store.react(1, 1, ReactionKind::Favourite);

        assert!(store.get_disliked(1).unwrap().is_empty());
        assert_eq!(store.get_liked(1).unwrap().len(), 1);
        assert_eq!(store.get_favourited(1).unwrap().len(), 1);
    }

    #[test]
    fn percentile_matches_sqlite_semantics() {
        let store = InMemoryMusicStore::new();
        assert_eq!(store.view_count_percentile(0.9).unwrap(), None);
        for (id, views) in [(1, 0), (2, 10), (3, 20), (4, 30), (5, 40)] {
            store.add_song(song(id, &[], 1, views));
        }
        // position 0.9 * 4 = 3.6, between 30 and 40
        let p90 = store.view_count_percentile(0.9).unwrap().unwrap();
        assert!((p90 - 36.0).abs() < 1e-9);
    }

    #[test]
    fn increments_are_recorded_even_when_failing() {
        let store = InMemoryMusicStore::new();
        store.add_song(song(1, &[], 1, 3));
        store.fail_increments_for(1);

        assert!(store.increment_view_count(1, 2).is_err());
        store.clear_failures();
        store.increment_view_count(1, 4).unwrap();

        assert_eq!(store.increment_calls(), vec![(1, 2), (1, 4)]);
        assert_eq!(store.view_count(1), Some(7));
        assert!(store.increment_view_count(99, 1).is_err());
    }
}
