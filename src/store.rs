use crate::error::{StoreError, StoreResult};
use crate::results::{CharCounts, FeatureFlags, TestResult, UserId};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

/// Number of rows the history view shows by default
pub const DEFAULT_RECENT_LIMIT: usize = 30;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS test_result (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    wpm INTEGER NOT NULL,
    raw_wpm INTEGER NOT NULL DEFAULT 0,
    accuracy INTEGER NOT NULL,
    duration_seconds INTEGER NOT NULL,
    char_count INTEGER NOT NULL,
    correct_chars INTEGER NOT NULL DEFAULT 0,
    incorrect_chars INTEGER NOT NULL DEFAULT 0,
    extra_chars INTEGER NOT NULL DEFAULT 0,
    missed_chars INTEGER NOT NULL DEFAULT 0,
    language VARCHAR(8),
    caps_enabled BOOLEAN NOT NULL DEFAULT 0,
    accents_enabled BOOLEAN NOT NULL DEFAULT 0,
    punctuation_enabled BOOLEAN NOT NULL DEFAULT 0,
    hard_mode_enabled BOOLEAN NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_test_result_user_created
    ON test_result(user_id, created_at);
"#;

const SELECT_COLUMNS: &str = r#"
    SELECT id, user_id, wpm, raw_wpm, accuracy, duration_seconds,
           char_count, correct_chars, incorrect_chars, extra_chars, missed_chars,
           language, caps_enabled, accents_enabled, punctuation_enabled, hard_mode_enabled,
           created_at
    FROM test_result
"#;

/// Persistence for completed tests
///
/// Implementations must answer `fetch_results_for_user` from a single
/// consistent read and make `insert_result` an atomic append.
pub trait ResultStore {
    /// Every result of the user, oldest first
    fn fetch_results_for_user(&self, user_id: UserId) -> StoreResult<Vec<TestResult>>;

    /// Append one result, returning its row id
    fn insert_result(&self, result: &TestResult) -> StoreResult<i64>;

    /// The user's `limit` most recent results, newest first
    fn fetch_recent_results(&self, user_id: UserId, limit: usize)
        -> StoreResult<Vec<TestResult>>;
}

/// SQLite-backed result store
#[derive(Debug)]
pub struct SqliteResultStore {
    conn: Connection,
}

impl SqliteResultStore {
    /// Open (or create) the database at `path` and make sure the schema exists
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Directory {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(path)?;
        let store = Self::with_connection(conn)?;
        info!(path = %path.display(), "opened result store");
        Ok(store)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    fn query_results(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> StoreResult<Vec<TestResult>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, StoredRow::from_row)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?.into_result()?);
        }
        Ok(results)
    }
}

impl ResultStore for SqliteResultStore {
    fn fetch_results_for_user(&self, user_id: UserId) -> StoreResult<Vec<TestResult>> {
        let sql = format!("{SELECT_COLUMNS} WHERE user_id = ?1 ORDER BY created_at ASC, id ASC");
        let results = self.query_results(&sql, params![user_id.0])?;
        debug!(%user_id, count = results.len(), "fetched results");
        Ok(results)
    }

    fn insert_result(&self, result: &TestResult) -> StoreResult<i64> {
        self.conn.execute(
            r#"
            INSERT INTO test_result
            (user_id, wpm, raw_wpm, accuracy, duration_seconds,
             char_count, correct_chars, incorrect_chars, extra_chars, missed_chars,
             language, caps_enabled, accents_enabled, punctuation_enabled, hard_mode_enabled,
             created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
            "#,
            params![
                result.user_id.0,
                result.wpm,
                result.raw_wpm,
                result.accuracy,
                result.duration_seconds,
                result.chars.total,
                result.chars.correct,
                result.chars.incorrect,
                result.chars.extra,
                result.chars.missed,
                result.language,
                result.flags.caps,
                result.flags.accents,
                result.flags.punctuation,
                result.flags.hard_mode,
                format_timestamp(&result.created_at),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn fetch_recent_results(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> StoreResult<Vec<TestResult>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let sql =
            format!("{SELECT_COLUMNS} WHERE user_id = ?1 ORDER BY created_at DESC, id DESC LIMIT ?2");
        self.query_results(&sql, params![user_id.0, limit])
    }
}

/// Fixed-width UTC timestamps so text ordering matches time ordering
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// A row as read from SQLite, before the timestamp is parsed
struct StoredRow {
    id: i64,
    user_id: i64,
    wpm: u32,
    raw_wpm: u32,
    accuracy: u32,
    duration_seconds: u32,
    chars: CharCounts,
    language: Option<String>,
    flags: FeatureFlags,
    created_at: String,
}

impl StoredRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            wpm: row.get(2)?,
            raw_wpm: row.get(3)?,
            accuracy: row.get(4)?,
            duration_seconds: row.get(5)?,
            chars: CharCounts {
                total: row.get(6)?,
                correct: row.get(7)?,
                incorrect: row.get(8)?,
                extra: row.get(9)?,
                missed: row.get(10)?,
            },
            language: row.get(11)?,
            flags: FeatureFlags {
                caps: row.get(12)?,
                accents: row.get(13)?,
                punctuation: row.get(14)?,
                hard_mode: row.get(15)?,
            },
            created_at: row.get(16)?,
        })
    }

    fn into_result(self) -> StoreResult<TestResult> {
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| StoreError::CorruptRow {
                row_id: self.id,
                reason: format!("bad created_at {:?}: {e}", self.created_at),
            })?
            .with_timezone(&Utc);

        Ok(TestResult {
            user_id: UserId(self.user_id),
            wpm: self.wpm,
            raw_wpm: self.raw_wpm,
            accuracy: self.accuracy,
            duration_seconds: self.duration_seconds,
            chars: self.chars,
            language: self.language,
            flags: self.flags,
            created_at,
        })
    }
}

/// In-process store for tests and embedding
#[derive(Debug, Default)]
pub struct InMemoryResultStore {
    rows: Mutex<Vec<TestResult>>,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_results<I: IntoIterator<Item = TestResult>>(results: I) -> Self {
        Self {
            rows: Mutex::new(results.into_iter().collect()),
        }
    }

    fn rows(&self) -> StoreResult<std::sync::MutexGuard<'_, Vec<TestResult>>> {
        self.rows
            .lock()
            .map_err(|_| StoreError::Unavailable("result lock poisoned".to_string()))
    }
}

impl ResultStore for InMemoryResultStore {
    fn fetch_results_for_user(&self, user_id: UserId) -> StoreResult<Vec<TestResult>> {
        let mut results: Vec<TestResult> = self
            .rows()?
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        results.sort_by_key(|r| r.created_at);
        Ok(results)
    }

    fn insert_result(&self, result: &TestResult) -> StoreResult<i64> {
        let mut rows = self.rows()?;
        rows.push(result.clone());
        Ok(i64::try_from(rows.len()).unwrap_or(i64::MAX))
    }

    fn fetch_recent_results(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> StoreResult<Vec<TestResult>> {
        let mut results = self.fetch_results_for_user(user_id)?;
        results.reverse();
        results.truncate(limit);
        Ok(results)
    }
}
