//! Catalog fixture shared by the end-to-end tests
//!
//! | song         | genres      | author | views |
//! |--------------|-------------|--------|-------|
//! | `rock_hit`   | rock        | 1      | 100   |
//! | `rock_deep`  | rock        | 2      | 10    |
//! | `jazz_same`  | jazz        | 1      | 50    |
//! | `pop_top`    | pop         | 3      | 1000  |
//! | `jazz_other` | jazz        | 4      | 5     |
//!
//! `listener` likes `rock_hit` and dislikes `jazz_other`. `newcomer` has no reactions.

use playrank_server::{ReactionKind, SqliteMusicStore};

pub struct Fixture {
    pub rock_hit: i64,
    pub rock_deep: i64,
    pub jazz_same: i64,
    pub pop_top: i64,
    pub jazz_other: i64,
    pub listener: i64,
    pub newcomer: i64,
}

pub fn seed(store: &SqliteMusicStore) -> Fixture {
    let rock_hit = store.add_song("Rock Hit", 1, &["rock"], 100).unwrap();
    let rock_deep = store.add_song("Rock Deep Cut", 2, &["rock"], 10).unwrap();
    let jazz_same = store.add_song("Jazz By The Rock Band", 1, &["jazz"], 50).unwrap();
    let pop_top = store.add_song("Pop Top", 3, &["pop"], 1000).unwrap();
    let jazz_other = store.add_song("Jazz Other", 4, &["jazz"], 5).unwrap();

    let listener = store.create_user("listener").unwrap();
    let newcomer = store.create_user("newcomer").unwrap();

    store
        .set_reaction(listener, rock_hit, ReactionKind::Like, true)
        .unwrap();
    store
        .set_reaction(listener, jazz_other, ReactionKind::Dislike, true)
        .unwrap();

    Fixture {
        rock_hit,
        rock_deep,
        jazz_same,
        pop_top,
        jazz_other,
        listener,
        newcomer,
    }
}
