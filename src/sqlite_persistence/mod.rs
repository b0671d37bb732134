mod music_store;
mod versioned_schema;

pub use music_store::SqliteMusicStore;
pub use versioned_schema::*;
