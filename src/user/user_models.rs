//! User reaction models

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::catalog_store::{AuthorId, SongId};

pub type UserId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionKind {
    Like,
    Dislike,
    Favourite,
}

impl ReactionKind {
    pub fn to_int(&self) -> i32 {
        match self {
            ReactionKind::Like => 1,
            ReactionKind::Dislike => 2,
            ReactionKind::Favourite => 3,
        }
    }

    pub fn from_int(value: i32) -> Option<Self> {
        match value {
            1 => Some(ReactionKind::Like),
            2 => Some(ReactionKind::Dislike),
            3 => Some(ReactionKind::Favourite),
            _ => None,
        }
    }

    /// The reaction that cannot coexist with this one on the same song, if any.
    /// Liking a song clears a dislike and vice versa; favourites are independent.
    pub fn opposite(&self) -> Option<Self> {
        match self {
            ReactionKind::Like => Some(ReactionKind::Dislike),
            ReactionKind::Dislike => Some(ReactionKind::Like),
            ReactionKind::Favourite => None,
        }
    }
}

/// The slice of a song a taste profile is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionSummary {
    pub song_id: SongId,
    pub genres: Vec<String>,
    pub author_id: AuthorId,
}

/// Everything a user has reacted to, split by reaction kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReactionHistory {
    pub favourited: Vec<ReactionSummary>,
    pub liked: Vec<ReactionSummary>,
    pub disliked: Vec<ReactionSummary>,
}

impl ReactionHistory {
    /// A user with no reactions at all is a cold-start user.
    pub fn is_empty(&self) -> bool {
        self.favourited.is_empty() && self.liked.is_empty() && self.disliked.is_empty()
    }

    pub fn disliked_ids(&self) -> HashSet<SongId> {
        self.disliked.iter().map(|s| s.song_id).collect()
    }

    pub fn favourited_ids(&self) -> HashSet<SongId> {
        self.favourited.iter().map(|s| s.song_id).collect()
    }
}
