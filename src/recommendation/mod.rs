//! Content-based recommendations.
//!
//! A user's reactions are turned into a [`TasteProfile`], which selects and scores
//! candidate songs. Users without history fall back to global popularity.

mod engine;
pub mod scoring;
pub mod taste_profile;

pub use engine::{
    RecommendationEngine, RecommendationError, RecommendationPath, RecommendationSettings,
};
pub use scoring::ScoredCandidate;
pub use taste_profile::TasteProfile;
