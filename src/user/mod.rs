pub mod user_models;
mod user_store;

pub use user_models::{ReactionHistory, ReactionKind, ReactionSummary, UserId};
pub use user_store::ReactionHistoryStore;
