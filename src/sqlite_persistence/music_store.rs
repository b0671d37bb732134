use crate::catalog_store::{AuthorId, CandidateCatalog, Page, SongId, SongSummary};
use crate::sqlite_column;
use crate::sqlite_persistence::{
    open_versioned_db, ForeignKey, SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP,
};
use crate::user::{ReactionHistoryStore, ReactionKind, ReactionSummary, UserId};
use anyhow::{bail, Context, Result};
use parking_lot::Mutex;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// V 0
const USER_TABLE_V_0: Table = Table {
    name: "user",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("handle", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[],
    unique_constraints: &[],
};

const SONG_TABLE_V_0: Table = Table {
    name: "song",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("author_id", &SqlType::Integer, non_null = true),
        sqlite_column!(
            "view_count",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[
        ("idx_song_view_count", "view_count"),
        ("idx_song_author_id", "author_id"),
    ],
    unique_constraints: &[],
};

const SONG_GENRE_TABLE_V_0: Table = Table {
    name: "song_genre",
    columns: &[
        sqlite_column!(
            "song_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "song",
                foreign_column: "id",
                on_delete_cascade: true,
            })
        ),
        sqlite_column!("genre", &SqlType::Text, non_null = true),
    ],
    indices: &[("idx_song_genre_genre", "genre")],
    unique_constraints: &[&["song_id", "genre"]],
};

const REACTION_TABLE_V_0: Table = Table {
    name: "reaction",
    columns: &[
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "user",
                foreign_column: "id",
                on_delete_cascade: true,
            })
        ),
        sqlite_column!(
            "song_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "song",
                foreign_column: "id",
                on_delete_cascade: true,
            })
        ),
        sqlite_column!("kind", &SqlType::Integer, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_reaction_user_id", "user_id")],
    unique_constraints: &[&["user_id", "song_id", "kind"]],
};

pub const VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[
        USER_TABLE_V_0,
        SONG_TABLE_V_0,
        SONG_GENRE_TABLE_V_0,
        REACTION_TABLE_V_0,
    ],
    migration: None,
}];

const SONG_COLUMNS: &str = "s.id, s.title, s.author_id, s.view_count";

fn parse_song_row(row: &Row) -> rusqlite::Result<SongSummary> {
    Ok(SongSummary {
        id: row.get(0)?,
        title: row.get(1)?,
        genres: Vec::new(),
        author_id: row.get(2)?,
        view_count: row.get::<_, i64>(3)?.max(0) as u64,
    })
}

fn to_sql_limit(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Upper bound on bound parameters per statement, below SQLite's compile-time limit.
const MAX_BOUND_IDS: usize = 500;

/// Loads the genre sets of the given songs, each sorted alphabetically.
fn load_genres(conn: &Connection, song_ids: &[SongId]) -> Result<HashMap<SongId, Vec<String>>> {
    let mut genres: HashMap<SongId, Vec<String>> = HashMap::new();

    for batch in song_ids.chunks(MAX_BOUND_IDS) {
        let placeholders = vec!["?"; batch.len()].join(", ");
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT song_id, genre FROM song_genre WHERE song_id IN ({}) ORDER BY song_id, genre",
            placeholders
        ))?;
        let rows = stmt.query_map(params_from_iter(batch.iter()), |row| {
            Ok((row.get::<_, SongId>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (song_id, genre) = row?;
            genres.entry(song_id).or_default().push(genre);
        }
    }
    Ok(genres)
}

/// Replaces the contents of the connection-local key tables used by candidate queries.
fn fill_candidate_keys(conn: &Connection, genres: &[String], authors: &[AuthorId]) -> Result<()> {
    conn.execute_batch(
        "CREATE TEMP TABLE IF NOT EXISTS candidate_genre (genre TEXT PRIMARY KEY);
         CREATE TEMP TABLE IF NOT EXISTS candidate_author (author_id INTEGER PRIMARY KEY);
         DELETE FROM temp.candidate_genre;
         DELETE FROM temp.candidate_author;",
    )?;

    let mut stmt =
        conn.prepare_cached("INSERT OR IGNORE INTO temp.candidate_genre (genre) VALUES (?1)")?;
    for genre in genres {
        stmt.execute(params![genre])?;
    }
    let mut stmt = conn
        .prepare_cached("INSERT OR IGNORE INTO temp.candidate_author (author_id) VALUES (?1)")?;
    for author_id in authors {
        stmt.execute(params![author_id])?;
    }
    Ok(())
}

/// Runs a song query and fills in every returned song's genres, keeping the query's order.
fn query_songs<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<SongSummary>> {
    let mut stmt = conn.prepare(sql)?;
    let mut songs: Vec<SongSummary> = stmt
        .query_map(params, parse_song_row)?
        .collect::<Result<_, _>>()?;

    let ids: Vec<SongId> = songs.iter().map(|s| s.id).collect();
    let mut genres = load_genres(conn, &ids)?;
    for song in songs.iter_mut() {
        song.genres = genres.remove(&song.id).unwrap_or_default();
    }
    Ok(songs)
}

/// SQLite-backed catalog and reaction history.
///
/// Both live in one database so candidate queries can exclude a user's reacted songs
/// with a single statement.
#[derive(Clone)]
pub struct SqliteMusicStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteMusicStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = open_versioned_db(db_path, VERSIONED_SCHEMAS)?;
        Ok(SqliteMusicStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn create_user(&self, handle: &str) -> Result<UserId> {
        let conn = self.conn.lock();
        conn.execute("INSERT INTO user (handle) VALUES (?1)", params![handle])
            .with_context(|| format!("Failed to create user {}", handle))?;
        Ok(conn.last_insert_rowid())
    }

    pub fn add_song(
        &self,
        title: &str,
        author_id: AuthorId,
        genres: &[&str],
        view_count: u64,
    ) -> Result<SongId> {
        let view_count = i64::try_from(view_count).context("View count too large")?;
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO song (title, author_id, view_count) VALUES (?1, ?2, ?3)",
            params![title, author_id, view_count],
        )
        .with_context(|| format!("Failed to add song {}", title))?;
        let song_id = tx.last_insert_rowid();
        for genre in genres {
            tx.execute(
                "INSERT OR IGNORE INTO song_genre (song_id, genre) VALUES (?1, ?2)",
                params![song_id, genre],
            )?;
        }
        tx.commit()?;
        debug!("Added song {} ({})", song_id, title);
        Ok(song_id)
    }

    /// Sets or clears a reaction. Setting LIKE clears DISLIKE for the same song and vice versa.
    pub fn set_reaction(
        &self,
        user_id: UserId,
        song_id: SongId,
        kind: ReactionKind,
        active: bool,
    ) -> Result<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        if active {
            if let Some(opposite) = kind.opposite() {
                tx.execute(
                    "DELETE FROM reaction WHERE user_id = ?1 AND song_id = ?2 AND kind = ?3",
                    params![user_id, song_id, opposite.to_int()],
                )?;
            }
            tx.execute(
                "INSERT OR IGNORE INTO reaction (user_id, song_id, kind) VALUES (?1, ?2, ?3)",
                params![user_id, song_id, kind.to_int()],
            )
            .with_context(|| {
                format!(
                    "Failed to set {:?} on song {} for user {}",
                    kind, song_id, user_id
                )
            })?;
        } else {
            tx.execute(
                "DELETE FROM reaction WHERE user_id = ?1 AND song_id = ?2 AND kind = ?3",
                params![user_id, song_id, kind.to_int()],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn get_song(&self, song_id: SongId) -> Result<Option<SongSummary>> {
        let conn = self.conn.lock();
        let mut songs = query_songs(
            &conn,
            &format!("SELECT {} FROM song s WHERE s.id = ?1", SONG_COLUMNS),
            params![song_id],
        )?;
        Ok(songs.pop())
    }
}

impl ReactionHistoryStore for SqliteMusicStore {
    fn user_exists(&self, user_id: UserId) -> Result<bool> {
        let conn = self.conn.lock();
        let exists = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM user WHERE id = ?1)",
            params![user_id],
            |row| row.get::<_, bool>(0),
        )?;
        Ok(exists)
    }

    fn get_reacted_songs(
        &self,
        user_id: UserId,
        kind: ReactionKind,
    ) -> Result<Vec<ReactionSummary>> {
        let conn = self.conn.lock();
        let songs = query_songs(
            &conn,
            &format!(
                "SELECT {} FROM reaction r JOIN song s ON s.id = r.song_id \
                 WHERE r.user_id = ?1 AND r.kind = ?2 ORDER BY r.rowid",
                SONG_COLUMNS
            ),
            params![user_id, kind.to_int()],
        )?;
        Ok(songs
            .into_iter()
            .map(|s| ReactionSummary {
                song_id: s.id,
                genres: s.genres,
                author_id: s.author_id,
            })
            .collect())
    }
}

impl CandidateCatalog for SqliteMusicStore {
    fn find_candidates(
        &self,
        genres: &[String],
        authors: &[AuthorId],
        exclude_user: UserId,
        limit: usize,
    ) -> Result<Vec<SongSummary>> {
        if (genres.is_empty() && authors.is_empty()) || limit == 0 {
            return Ok(Vec::new());
        }

        let mut conditions = Vec::with_capacity(2);
        if !authors.is_empty() {
            conditions.push("s.author_id IN (SELECT author_id FROM temp.candidate_author)");
        }
        if !genres.is_empty() {
            conditions.push(
                "EXISTS (SELECT 1 FROM song_genre g JOIN temp.candidate_genre c \
                 ON c.genre = g.genre WHERE g.song_id = s.id)",
            );
        }

        let sql = format!(
            "SELECT {} FROM song s WHERE ({}) \
             AND s.id NOT IN (SELECT song_id FROM reaction WHERE user_id = ?1) \
             ORDER BY s.view_count DESC, s.id ASC LIMIT ?2",
            SONG_COLUMNS,
            conditions.join(" OR ")
        );

        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        fill_candidate_keys(&tx, genres, authors)?;
        let songs = query_songs(&tx, &sql, params![exclude_user, to_sql_limit(limit)])?;
        tx.commit()?;
        Ok(songs)
    }

    fn find_top_popular(&self, limit: usize) -> Result<Vec<SongSummary>> {
        let conn = self.conn.lock();
        query_songs(
            &conn,
            &format!(
                "SELECT {} FROM song s ORDER BY s.view_count DESC, s.id ASC LIMIT ?1",
                SONG_COLUMNS
            ),
            params![to_sql_limit(limit)],
        )
    }

    fn find_top_popular_page(&self, page: usize, size: usize) -> Result<Page<SongSummary>> {
        let conn = self.conn.lock();
        let total: i64 = conn.query_row("SELECT COUNT(*) FROM song", [], |row| row.get(0))?;
        let total = total.max(0) as usize;

        let offset = match page.checked_mul(size) {
            Some(offset) if offset < total => offset,
            _ => return Ok(Page::empty(page, size, total)),
        };

        let items = query_songs(
            &conn,
            &format!(
                "SELECT {} FROM song s ORDER BY s.view_count DESC, s.id ASC LIMIT ?1 OFFSET ?2",
                SONG_COLUMNS
            ),
            params![to_sql_limit(size), to_sql_limit(offset)],
        )?;
        Ok(Page {
            items,
            page,
            size,
            total,
        })
    }

    fn view_count_percentile(&self, percentile: f64) -> Result<Option<f64>> {
        if !(0.0..=1.0).contains(&percentile) {
            bail!("Percentile must be within [0, 1], got {}", percentile);
        }

        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM song", [], |row| row.get(0))?;
        if count <= 0 {
            return Ok(None);
        }

        // Linear interpolation between the two closest ranks.
        let position = percentile * (count - 1) as f64;
        let lower_rank = position.floor();
        let mut stmt =
            conn.prepare("SELECT view_count FROM song ORDER BY view_count ASC LIMIT 2 OFFSET ?1")?;
        let values: Vec<i64> = stmt
            .query_map(params![lower_rank as i64], |row| row.get(0))?
            .collect::<Result<_, _>>()?;

        let lower = *values
            .first()
            .context("Percentile rank out of range")? as f64;
        let upper = values.get(1).map(|v| *v as f64).unwrap_or(lower);
        Ok(Some(lower + (upper - lower) * (position - lower_rank)))
    }

    fn increment_view_count(&self, song_id: SongId, delta: u64) -> Result<()> {
        let delta = i64::try_from(delta).context("View count delta too large")?;
        let conn = self.conn.lock();
        let updated = conn.execute(
            "UPDATE song SET view_count = view_count + ?1 WHERE id = ?2",
            params![delta, song_id],
        )?;
        if updated == 0 {
            bail!("Song {} not found", song_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_tmp_store() -> (SqliteMusicStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let store = SqliteMusicStore::new(&db_path).unwrap();
        (store, temp_dir)
    }

    #[test]
    fn creates_and_reopens_database() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let song_id = {
            let store = SqliteMusicStore::new(&db_path).unwrap();
            store.add_song("Song", 1, &["rock"], 3).unwrap()
        };

        let store = SqliteMusicStore::new(&db_path).unwrap();
        let song = store.get_song(song_id).unwrap().unwrap();
        assert_eq!(song.title, "Song");
        assert_eq!(song.genres, vec!["rock".to_string()]);
        assert_eq!(song.view_count, 3);
    }

    #[test]
    fn user_exists() {
        let (store, _temp_dir) = create_tmp_store();
        let user_id = store.create_user("alice").unwrap();

        assert!(store.user_exists(user_id).unwrap());
        assert!(!store.user_exists(user_id + 100).unwrap());
        assert!(store.create_user("alice").is_err());
    }

    #[test]
    fn like_and_dislike_are_mutually_exclusive() {
        let (store, _temp_dir) = create_tmp_store();
        let user_id = store.create_user("alice").unwrap();
        let song_id = store.add_song("Song", 1, &["rock", "pop"], 0).unwrap();

        store
            .set_reaction(user_id, song_id, ReactionKind::Like, true)
            .unwrap();
        store
            .set_reaction(user_id, song_id, ReactionKind::Favourite, true)
            .unwrap();
        assert_eq!(store.get_liked(user_id).unwrap().len(), 1);

        store
            .set_reaction(user_id, song_id, ReactionKind::Dislike, true)
            .unwrap();
        assert!(store.get_liked(user_id).unwrap().is_empty());
        assert_eq!(store.get_favourited(user_id).unwrap().len(), 1);

        let disliked = store.get_disliked(user_id).unwrap();
        assert_eq!(disliked.len(), 1);
        assert_eq!(disliked[0].song_id, song_id);
        assert_eq!(disliked[0].genres, vec!["pop".to_string(), "rock".to_string()]);
        assert_eq!(disliked[0].author_id, 1);

        store
            .set_reaction(user_id, song_id, ReactionKind::Dislike, false)
            .unwrap();
        assert!(store.get_disliked(user_id).unwrap().is_empty());
    }

    #[test]
    fn reaction_on_unknown_song_fails() {
        let (store, _temp_dir) = create_tmp_store();
        let user_id = store.create_user("alice").unwrap();

        assert!(store
            .set_reaction(user_id, 999, ReactionKind::Like, true)
            .is_err());
    }

    #[test]
    fn find_candidates_matches_genres_or_authors_and_excludes_reacted() {
        let (store, _temp_dir) = create_tmp_store();
        let user_id = store.create_user("alice").unwrap();

        let liked = store.add_song("Liked", 1, &["rock"], 100).unwrap();
        let rock = store.add_song("Rock", 2, &["rock"], 10).unwrap();
        let by_author = store.add_song("Same author", 1, &["jazz"], 50).unwrap();
        let _pop = store.add_song("Pop", 3, &["pop"], 1000).unwrap();
        let rock_tie = store.add_song("Rock tie", 4, &["rock", "pop"], 10).unwrap();

        store
            .set_reaction(user_id, liked, ReactionKind::Like, true)
            .unwrap();

        let candidates = store
            .find_candidates(&["rock".to_string()], &[1], user_id, 10)
            .unwrap();
        let ids: Vec<SongId> = candidates.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![by_author, rock, rock_tie]);
        assert_eq!(
            candidates[2].genres,
            vec!["pop".to_string(), "rock".to_string()]
        );

        let limited = store
            .find_candidates(&["rock".to_string()], &[1], user_id, 1)
            .unwrap();
        assert_eq!(limited.len(), 1);

        assert!(store.find_candidates(&[], &[], user_id, 10).unwrap().is_empty());
    }

    #[test]
    fn popularity_ranking_and_pages() {
        let (store, _temp_dir) = create_tmp_store();
        let a = store.add_song("A", 1, &[], 5).unwrap();
        let b = store.add_song("B", 1, &[], 50).unwrap();
        let c = store.add_song("C", 1, &[], 5).unwrap();

        let top: Vec<SongId> = store
            .find_top_popular(10)
            .unwrap()
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(top, vec![b, a, c]);

        let page = store.find_top_popular_page(1, 2).unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, c);

        let past_end = store.find_top_popular_page(5, 2).unwrap();
        assert!(past_end.items.is_empty());
        assert_eq!(past_end.total, 3);
    }

    #[test]
    fn percentile_interpolates_between_ranks() {
        let (store, _temp_dir) = create_tmp_store();
        assert_eq!(store.view_count_percentile(0.9).unwrap(), None);

        for views in [0, 10, 20, 30, 40, 50, 60, 70, 80, 90, 100] {
            store.add_song("Song", 1, &[], views).unwrap();
        }
        assert_eq!(store.view_count_percentile(0.9).unwrap(), Some(90.0));
        let p95 = store.view_count_percentile(0.95).unwrap().unwrap();
        assert!((p95 - 95.0).abs() < 1e-9);
        assert_eq!(store.view_count_percentile(1.0).unwrap(), Some(100.0));
        assert_eq!(store.view_count_percentile(0.0).unwrap(), Some(0.0));

        assert!(store.view_count_percentile(1.5).is_err());
        assert!(store.view_count_percentile(f64::NAN).is_err());
    }

    #[test]
    fn percentile_of_single_song() {
        let (store, _temp_dir) = create_tmp_store();
        store.add_song("Song", 1, &[], 7).unwrap();
        assert_eq!(store.view_count_percentile(0.9).unwrap(), Some(7.0));
    }

    #[test]
    fn increment_view_count() {
        let (store, _temp_dir) = create_tmp_store();
        let song_id = store.add_song("Song", 1, &[], 2).unwrap();

        store.increment_view_count(song_id, 5).unwrap();
        assert_eq!(store.get_song(song_id).unwrap().unwrap().view_count, 7);

        assert!(store.increment_view_count(song_id + 1, 1).is_err());
    }

    /// Inserts `count` songs, each by its own author, all liked by `user_id`.
    fn seed_liked_history(store: &SqliteMusicStore, user_id: UserId, count: i64) {
        let mut conn = store.conn.lock();
        let tx = conn.transaction().unwrap();
        {
            let mut song = tx
                .prepare(
                    "INSERT INTO song (id, title, author_id, view_count) VALUES (?1, ?2, ?3, ?4)",
                )
                .unwrap();
            let mut genre = tx
                .prepare("INSERT INTO song_genre (song_id, genre) VALUES (?1, ?2)")
                .unwrap();
            let mut reaction = tx
                .prepare("INSERT INTO reaction (user_id, song_id, kind) VALUES (?1, ?2, ?3)")
                .unwrap();
            for id in 1..=count {
                song.execute(params![id, format!("Song {}", id), id, id])
                    .unwrap();
                genre.execute(params![id, format!("g{}", id % 100)]).unwrap();
                reaction
                    .execute(params![user_id, id, ReactionKind::Like.to_int()])
                    .unwrap();
            }
        }
        tx.commit().unwrap();
    }

    #[test]
    fn large_reaction_history_stays_queryable() {
        let (store, _temp_dir) = create_tmp_store();
        let user_id = store.create_user("collector").unwrap();
        seed_liked_history(&store, user_id, 40_000);
        let fresh_genre = store.add_song("Fresh genre", 50_000, &["g7"], 3).unwrap();
        let fresh_author = store.add_song("Fresh author", 123, &["unheard"], 1).unwrap();
        let _unrelated = store.add_song("Unrelated", 60_000, &["unheard"], 9).unwrap();

        let liked = store.get_liked(user_id).unwrap();
        assert_eq!(liked.len(), 40_000);
        assert_eq!(liked[41].genres, vec!["g42".to_string()]);
        assert_eq!(liked[39_999].author_id, 40_000);

        let genres: Vec<String> = (0..100).map(|g| format!("g{}", g)).collect();
        let authors: Vec<AuthorId> = (1..=40_000).collect();
        let candidates: Vec<SongId> = store
            .find_candidates(&genres, &authors, user_id, 10)
            .unwrap()
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(candidates, vec![fresh_genre, fresh_author]);

        // Keys from the previous call must not leak into the next one
        let by_author_only: Vec<SongId> = store
            .find_candidates(&[], &[123], user_id, 10)
            .unwrap()
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(by_author_only, vec![fresh_author]);
    }

    #[test]
    fn personalized_request_over_large_history() {
        use crate::recommendation::{RecommendationEngine, RecommendationSettings};
        use crate::views::ViewCap;

        let (store, _temp_dir) = create_tmp_store();
        let user_id = store.create_user("collector").unwrap();
        seed_liked_history(&store, user_id, 40_000);
        let fresh = store.add_song("Fresh", 50_000, &["g7"], 3).unwrap();

        let store = Arc::new(store);
        let engine = RecommendationEngine::new(
            store.clone(),
            store.clone(),
            Arc::new(ViewCap::new(Some(100.0))),
            RecommendationSettings {
                min_candidates: 0,
                ..Default::default()
            },
        );

        let page = engine.get_recommendations(Some(user_id), 0, 10).unwrap();
        let ids: Vec<SongId> = page.items.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![fresh]);
    }
}
