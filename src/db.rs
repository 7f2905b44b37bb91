// SQLite persistence layer for draft state.

use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::autopick::{CoachPrefs, WishlistStore};
use crate::draft::engine::PickStore;
use crate::draft::order::DraftOrderState;
use crate::draft::pick::Pick;
use crate::standings::MatchResult;

/// SQLite-backed persistence for the pick log, draft order state, match
/// results, and per-coach key-value data (wishlists, preferences).
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path`, ensure all tables
    /// exist, and seed the single draft-order row from `coaches` if this is
    /// a fresh database. Pass `":memory:"` for an ephemeral in-memory
    /// database (useful for tests).
    pub fn open(path: &str, coaches: &[String]) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;
             PRAGMA foreign_keys = ON;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS draft_picks (
                pick_no    INTEGER PRIMARY KEY,
                coach      TEXT NOT NULL,
                dex        INTEGER NOT NULL UNIQUE,
                points     INTEGER NOT NULL,
                created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );

            CREATE TABLE IF NOT EXISTS draft_state (
                id         INTEGER PRIMARY KEY CHECK (id = 1),
                base_order TEXT NOT NULL,
                locked     INTEGER NOT NULL DEFAULT 0,
                started_at TEXT
            );

            CREATE TABLE IF NOT EXISTS match_results (
                match_key   TEXT PRIMARY KEY,
                coach1      TEXT NOT NULL,
                coach2      TEXT NOT NULL,
                wins1       INTEGER NOT NULL,
                wins2       INTEGER NOT NULL,
                reported_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )
        .context("failed to create database schema")?;

        let base_order_json =
            serde_json::to_string(coaches).context("failed to serialize coach order")?;
        conn.execute(
            "INSERT OR IGNORE INTO draft_state (id, base_order, locked) VALUES (1, ?1, 0)",
            params![base_order_json],
        )
        .context("failed to seed draft state")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection.
    ///
    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock). This should never happen in normal operation.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    // ------------------------------------------------------------------
    // Key-value store
    // ------------------------------------------------------------------

    /// Persist an arbitrary JSON value under `key`. Uses INSERT OR REPLACE
    /// so repeated saves overwrite the previous value.
    pub fn save_value(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        let conn = self.conn();
        let json_str = serde_json::to_string(value).context("failed to serialize kv value")?;
        conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, json_str],
        )
        .context("failed to save kv value")?;
        Ok(())
    }

    /// Load a previously saved JSON value by `key`. Returns `None` if the
    /// key does not exist.
    pub fn load_value(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let conn = self.conn();
        let json_str: Option<String> = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .context("failed to query kv value")?;

        match json_str {
            Some(s) => {
                let value =
                    serde_json::from_str(&s).context("failed to deserialize kv value")?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    // ------------------------------------------------------------------
    // Match results
    // ------------------------------------------------------------------

    /// Record or overwrite a series result. Re-reporting the same match_key
    /// replaces the previous score.
    pub fn upsert_result(&self, result: &MatchResult) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            "INSERT OR REPLACE INTO match_results (match_key, coach1, coach2, wins1, wins2)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                result.match_key,
                result.coach1,
                result.coach2,
                result.wins1,
                result.wins2,
            ],
        )
        .context("failed to upsert match result")?;
        Ok(())
    }

    /// All reported results, ordered by match key.
    pub fn list_results(&self) -> Result<Vec<MatchResult>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT match_key, coach1, coach2, wins1, wins2
                 FROM match_results ORDER BY match_key",
            )
            .context("failed to prepare list_results query")?;

        let results = stmt
            .query_map([], |row| {
                Ok(MatchResult {
                    match_key: row.get(0)?,
                    coach1: row.get(1)?,
                    coach2: row.get(2)?,
                    wins1: row.get(3)?,
                    wins2: row.get(4)?,
                })
            })
            .context("failed to query match results")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map match result rows")?;

        Ok(results)
    }
}

// ---------------------------------------------------------------------------
// PickStore
// ---------------------------------------------------------------------------

impl PickStore for Database {
    fn list_picks(&self) -> Result<Vec<Pick>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT pick_no, coach, dex, points FROM draft_picks ORDER BY pick_no")
            .context("failed to prepare list_picks query")?;

        let picks = stmt
            .query_map([], |row| {
                Ok(Pick {
                    pick_no: row.get(0)?,
                    coach: row.get(1)?,
                    dex: row.get(2)?,
                    points: row.get(3)?,
                })
            })
            .context("failed to query draft picks")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map draft pick rows")?;

        Ok(picks)
    }

    fn order_state(&self) -> Result<DraftOrderState> {
        let conn = self.conn();
        let (base_order_json, locked, started_at): (String, bool, Option<String>) = conn
            .query_row(
                "SELECT base_order, locked, started_at FROM draft_state WHERE id = 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .context("failed to read draft state row")?;

        let base_order: Vec<String> =
            serde_json::from_str(&base_order_json).context("failed to parse stored base order")?;
        let started_at = started_at
            .map(|s| {
                DateTime::parse_from_rfc3339(&s)
                    .map(|dt| dt.with_timezone(&Utc))
                    .with_context(|| format!("invalid started_at timestamp: {s}"))
            })
            .transpose()?;

        Ok(DraftOrderState {
            base_order,
            locked,
            started_at,
        })
    }

    fn set_order_state(&self, state: &DraftOrderState) -> Result<()> {
        let conn = self.conn();
        let base_order_json =
            serde_json::to_string(&state.base_order).context("failed to serialize base order")?;
        conn.execute(
            "UPDATE draft_state SET base_order = ?1, locked = ?2, started_at = ?3 WHERE id = 1",
            params![
                base_order_json,
                state.locked,
                state.started_at.map(|dt| dt.to_rfc3339()),
            ],
        )
        .context("failed to update draft state")?;
        Ok(())
    }

    /// Compare-and-append inside a single transaction: the pick commits
    /// only if the log still holds exactly `expected_len` rows, so two
    /// writers racing for the same slot cannot both succeed.
    fn append_pick_if_current(&self, pick: &Pick, expected_len: usize) -> Result<bool> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin transaction")?;

        let count: i64 = tx
            .query_row("SELECT COUNT(*) FROM draft_picks", [], |row| row.get(0))
            .context("failed to count draft picks")?;
        if count as usize != expected_len {
            return Ok(false);
        }

        tx.execute(
            "INSERT INTO draft_picks (pick_no, coach, dex, points) VALUES (?1, ?2, ?3, ?4)",
            params![pick.pick_no, pick.coach, pick.dex, pick.points],
        )
        .context("failed to insert draft pick")?;

        tx.commit().context("failed to commit draft pick")?;
        Ok(true)
    }

    fn remove_last_pick(&self) -> Result<Option<Pick>> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin transaction")?;

        let last: Option<Pick> = tx
            .query_row(
                "SELECT pick_no, coach, dex, points FROM draft_picks
                 ORDER BY pick_no DESC LIMIT 1",
                [],
                |row| {
                    Ok(Pick {
                        pick_no: row.get(0)?,
                        coach: row.get(1)?,
                        dex: row.get(2)?,
                        points: row.get(3)?,
                    })
                },
            )
            .optional()
            .context("failed to query last pick")?;

        if let Some(pick) = &last {
            tx.execute(
                "DELETE FROM draft_picks WHERE pick_no = ?1",
                params![pick.pick_no],
            )
            .context("failed to delete last pick")?;
        }

        tx.commit().context("failed to commit pick removal")?;
        Ok(last)
    }

    fn clear_picks(&self) -> Result<()> {
        let conn = self.conn();
        conn.execute("DELETE FROM draft_picks", [])
            .context("failed to clear draft picks")?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// WishlistStore
// ---------------------------------------------------------------------------

impl WishlistStore for Database {
    fn wishlist(&self, coach: &str) -> Result<Vec<String>> {
        let key = format!("wishlist:{coach}");
        match self.load_value(&key)? {
            Some(value) => {
                serde_json::from_value(value).context("failed to deserialize wishlist")
            }
            None => Ok(Vec::new()),
        }
    }

    fn set_wishlist(&self, coach: &str, queue: &[u32]) -> Result<()> {
        let key = format!("wishlist:{coach}");
        let entries: Vec<String> = queue.iter().map(|d| d.to_string()).collect();
        self.save_value(&key, &serde_json::to_value(entries)?)
    }

    fn preferences(&self, coach: &str) -> Result<CoachPrefs> {
        let key = format!("prefs:{coach}");
        match self.load_value(&key)? {
            Some(value) => {
                serde_json::from_value(value).context("failed to deserialize coach prefs")
            }
            None => Ok(CoachPrefs::default()),
        }
    }

    fn set_preferences(&self, coach: &str, prefs: &CoachPrefs) -> Result<()> {
        let key = format!("prefs:{coach}");
        self.save_value(&key, &serde_json::to_value(prefs)?)
    }
}
