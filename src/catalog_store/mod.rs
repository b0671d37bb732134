mod in_memory_store;
mod models;
mod trait_def;

pub use in_memory_store::InMemoryMusicStore;
pub use models::{AuthorId, Page, SongId, SongSummary};
pub use trait_def::CandidateCatalog;
