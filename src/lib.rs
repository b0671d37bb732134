//! Playrank Recommendation Server Library
//!
//! This library exposes the recommendation core (taste profiles, candidate scoring,
//! buffered view counting and the view-cap cache) together with the SQLite store,
//! background jobs and HTTP layer that host it.

pub mod background_jobs;
pub mod catalog_store;
pub mod config;
pub mod recommendation;
pub mod server;
pub mod sqlite_persistence;
pub mod user;
pub mod views;

// Re-export commonly used types for convenience
pub use catalog_store::{CandidateCatalog, Page, SongSummary};
pub use recommendation::{RecommendationEngine, RecommendationError, RecommendationSettings};
pub use server::{make_app, run_server, RequestsLoggingLevel};
pub use sqlite_persistence::SqliteMusicStore;
pub use user::{ReactionHistoryStore, ReactionKind};
pub use views::{ViewBuffer, ViewCap, ViewCapCache, ViewCapProvider};
