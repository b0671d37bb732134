use super::user_models::{ReactionHistory, ReactionKind, ReactionSummary, UserId};
use anyhow::Result;

pub trait ReactionHistoryStore: Send + Sync {
    /// Returns whether a user with the given id exists.
    /// Returns Err if there is a database error.
    fn user_exists(&self, user_id: UserId) -> Result<bool>;

    /// Returns the songs the user reacted to with the given reaction kind.
    /// Returns an empty list for unknown users.
    fn get_reacted_songs(&self, user_id: UserId, kind: ReactionKind)
        -> Result<Vec<ReactionSummary>>;

    fn get_liked(&self, user_id: UserId) -> Result<Vec<ReactionSummary>> {
        self.get_reacted_songs(user_id, ReactionKind::Like)
    }

    fn get_disliked(&self, user_id: UserId) -> Result<Vec<ReactionSummary>> {
        self.get_reacted_songs(user_id, ReactionKind::Dislike)
    }

    fn get_favourited(&self, user_id: UserId) -> Result<Vec<ReactionSummary>> {
        self.get_reacted_songs(user_id, ReactionKind::Favourite)
    }

    /// Fetches all three reaction sets of a user.
    fn get_reaction_history(&self, user_id: UserId) -> Result<ReactionHistory> {
        Ok(ReactionHistory {
            favourited: self.get_favourited(user_id)?,
            liked: self.get_liked(user_id)?,
            disliked: self.get_disliked(user_id)?,
        })
    }
}
