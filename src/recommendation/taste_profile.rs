//! Taste profiles: signed per-genre and per-author weights derived from reactions.
//!
//! Every applied reaction adds its weight to the running activity mass. Positive
//! reactions (favourite, like) add to the keys of the reacted song, dislikes
//! subtract. The accumulated totals are then divided by the activity mass so that
//! the magnitude of a profile does not grow with the number of reactions.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use crate::catalog_store::AuthorId;
use crate::user::{ReactionHistory, ReactionSummary};

pub const FAVOURITE_WEIGHT: f64 = 1.5;
pub const LIKE_WEIGHT: f64 = 1.0;
pub const DISLIKE_WEIGHT: f64 = 1.0;

/// A key to weight mapping where missing keys weigh zero.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightMap<K: Eq + Hash> {
    weights: HashMap<K, f64>,
}

impl<K: Eq + Hash> Default for WeightMap<K> {
    fn default() -> Self {
        WeightMap {
            weights: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash> WeightMap<K> {
    pub fn get(&self, key: &K) -> f64 {
        self.weights.get(key).copied().unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &f64)> {
        self.weights.iter()
    }
}

impl<K: Eq + Hash + Ord + Clone> WeightMap<K> {
    /// All keys, sorted.
    pub fn sorted_keys(&self) -> Vec<K> {
        let mut keys: Vec<K> = self.weights.keys().cloned().collect();
        keys.sort();
        keys
    }
}

pub type GenreWeights = WeightMap<String>;
pub type AuthorWeights = WeightMap<AuthorId>;

/// Accumulated contributions before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawWeights<K: Eq + Hash> {
    pub totals: HashMap<K, f64>,
    pub activity_mass: f64,
}

impl<K: Eq + Hash> RawWeights<K> {
    pub fn normalize(self) -> WeightMap<K> {
        if self.activity_mass == 0.0 {
            return WeightMap::default();
        }
        let mass = self.activity_mass;
        WeightMap {
            weights: self
                .totals
                .into_iter()
                .map(|(key, total)| (key, total / mass))
                .collect(),
        }
    }
}

/// Walks the history applying each reaction once. A favourited song's like is skipped.
fn accumulate<K, F>(history: &ReactionHistory, mut contribute: F) -> RawWeights<K>
where
    K: Eq + Hash,
    F: FnMut(&ReactionSummary, f64, &mut HashMap<K, f64>),
{
    let mut totals = HashMap::new();
    let mut activity_mass = 0.0;

    let favourited: HashSet<_> = history.favourited_ids();

    for song in &history.favourited {
        contribute(song, FAVOURITE_WEIGHT, &mut totals);
        activity_mass += FAVOURITE_WEIGHT;
    }
    for song in &history.liked {
        if favourited.contains(&song.song_id) {
            continue;
        }
        contribute(song, LIKE_WEIGHT, &mut totals);
        activity_mass += LIKE_WEIGHT;
    }
    for song in &history.disliked {
        contribute(song, -DISLIKE_WEIGHT, &mut totals);
        activity_mass += DISLIKE_WEIGHT;
    }

    RawWeights {
        totals,
        activity_mass,
    }
}

/// Splits each reaction's weight evenly across the song's genres.
pub fn accumulate_genres(history: &ReactionHistory) -> RawWeights<String> {
    accumulate(history, |song, weight, totals| {
        if song.genres.is_empty() {
            return;
        }
        let share = weight / song.genres.len() as f64;
        for genre in &song.genres {
            *totals.entry(genre.clone()).or_insert(0.0) += share;
        }
    })
}

pub fn accumulate_authors(history: &ReactionHistory) -> RawWeights<AuthorId> {
    accumulate(history, |song, weight, totals| {
        *totals.entry(song.author_id).or_insert(0.0) += weight;
    })
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TasteProfile {
    pub genres: GenreWeights,
    pub authors: AuthorWeights,
}

impl TasteProfile {
    pub fn build(history: &ReactionHistory) -> Self {
        TasteProfile {
            genres: accumulate_genres(history).normalize(),
            authors: accumulate_authors(history).normalize(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.genres.is_empty() && self.authors.is_empty()
    }
}
