//! SQLite persistence for vocabulary items.
//!
//! Each item is serialised to JSON and stored in one row. The schema keeps
//! only the columns needed for lookups outside the blob:
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS vocabulary_items (
//!     id             TEXT PRIMARY KEY,
//!     learner_id     TEXT NOT NULL,
//!     term           TEXT NOT NULL,
//!     created_us     INTEGER NOT NULL,
//!     next_review_us INTEGER NOT NULL,
//!     data           BLOB NOT NULL,
//!     updated_at     TEXT NOT NULL,
//!     checksum       TEXT,
//!     UNIQUE (learner_id, term)
//! );
//! ```
//!
//! - WAL mode for concurrent reads while a review is written
//! - JSON inside a BLOB keeps the schema stable when item fields are added
//! - Optional CRC-32 checksum detects save corruption
//! - Backup support via SQLite's online-backup API

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use tracing::{debug, info, warn};

use crate::config::PersistenceConfig;
use crate::error::{LingoError, Result};
use crate::scheduler::is_due;
use crate::store::VocabularyStore;
use crate::types::{ItemId, LearnerId};
use crate::vocabulary::VocabularyItem;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS vocabulary_items (
        id             TEXT PRIMARY KEY,
        learner_id     TEXT NOT NULL,
        term           TEXT NOT NULL,
        created_us     INTEGER NOT NULL,
        next_review_us INTEGER NOT NULL,
        data           BLOB NOT NULL,
        updated_at     TEXT NOT NULL,
        checksum       TEXT,
        UNIQUE (learner_id, term)
    );
    CREATE INDEX IF NOT EXISTS idx_vocabulary_due
        ON vocabulary_items (learner_id, next_review_us);";

// ---------------------------------------------------------------------------
// CRC-32 checksum helper
// ---------------------------------------------------------------------------

/// CRC-32 of `data` as a lowercase hex string.
fn crc32_hex(data: &[u8]) -> String {
    format!("{:08x}", crc32_compute(data))
}

/// Basic CRC-32 (ISO 3309 / ITU-T V.42) computation.
fn crc32_compute(data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB8_8320;
    let mut crc: u32 = 0xFFFF_FFFF;
    for &byte in data {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            if crc & 1 == 1 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
    }
    !crc
}

// ---------------------------------------------------------------------------
// SqliteStore
// ---------------------------------------------------------------------------

/// A [`VocabularyStore`] on an SQLite database.
///
/// ```no_run
/// # use lingo_core::persistence::SqliteStore;
/// # use lingo_core::config::PersistenceConfig;
/// # use lingo_core::store::VocabularyStore;
/// # use lingo_core::{LearnerId, NewWord, VocabularyItem};
/// let store = SqliteStore::open("vocab.db", &PersistenceConfig::default())?;
/// let item = VocabularyItem::new(LearnerId::new(), NewWord::new("perro", "dog"), chrono::Utc::now())?;
/// store.save(&item)?;
/// let loaded = store.get(item.id)?;
/// # Ok::<(), lingo_core::LingoError>(())
/// ```
pub struct SqliteStore {
    conn: Mutex<Connection>,
    config: PersistenceConfig,
    db_path: PathBuf,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("db_path", &self.db_path)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Open (or create) a database at `path`.
    ///
    /// The schema is created if missing. WAL mode is enabled when
    /// `config.wal_mode` is `true`.
    ///
    /// # Errors
    ///
    /// Returns [`LingoError::Database`] on SQLite failures.
    pub fn open<P: AsRef<Path>>(path: P, config: &PersistenceConfig) -> Result<Self> {
        let db_path = path.as_ref().to_path_buf();
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        let conn = Connection::open_with_flags(&db_path, flags)?;

        if config.wal_mode {
            // journal_mode returns a row, so it can't go through execute_batch.
            let _mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
        }
        conn.execute_batch(
            "PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        conn.execute_batch(SCHEMA)?;

        info!(
            path = %db_path.display(),
            wal = config.wal_mode,
            "Vocabulary store opened"
        );

        Ok(Self {
            conn: Mutex::new(conn),
            config: config.clone(),
            db_path,
        })
    }

    /// Open an in-memory database (useful for tests).
    ///
    /// # Errors
    ///
    /// Returns [`LingoError::Database`] on SQLite failures.
    pub fn open_in_memory(config: &PersistenceConfig) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
            config: config.clone(),
            db_path: PathBuf::from(":memory:"),
        })
    }

    /// Decode a stored blob, logging (not failing) on checksum mismatch.
    fn decode(&self, data: &[u8], stored_checksum: Option<&str>) -> Result<VocabularyItem> {
        let item: VocabularyItem =
            serde_json::from_slice(data).map_err(|e| LingoError::Serialization(e.to_string()))?;

        if self.config.checksum_enabled {
            if let Some(expected) = stored_checksum {
                let actual = crc32_hex(data);
                if expected != actual {
                    warn!(
                        item = %item.id,
                        expected = %expected,
                        actual = %actual,
                        "Checksum mismatch, possible save corruption"
                    );
                }
            }
        }
        Ok(item)
    }

    fn query_items(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<VocabularyItem>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(sql)?;
        let rows = stmt.query_map(params, |row| {
            Ok((row.get::<_, Vec<u8>>(0)?, row.get::<_, Option<String>>(1)?))
        })?;

        let mut items = Vec::new();
        for row in rows {
            let (data, checksum) = row?;
            items.push(self.decode(&data, checksum.as_deref())?);
        }
        Ok(items)
    }

    // ------------------------------------------------------------------
    // Backup
    // ------------------------------------------------------------------

    /// Back up the database to `dest_path` using SQLite's online-backup API.
    ///
    /// # Errors
    ///
    /// Returns [`LingoError::Database`] on SQLite failures.
    pub fn backup<P: AsRef<Path>>(&self, dest_path: P) -> Result<()> {
        let start = Instant::now();
        let mut dest = Connection::open(dest_path.as_ref())?;
        {
            let conn = self.conn.lock();
            let backup = rusqlite::backup::Backup::new(&conn, &mut dest)?;
            backup.run_to_completion(256, std::time::Duration::from_millis(50), None)?;
        }

        info!(
            dest = %dest_path.as_ref().display(),
            elapsed_ms = start.elapsed().as_millis(),
            "Database backup completed"
        );
        Ok(())
    }

    /// Create `<db>.bak.1`, shifting older backups up so that at most
    /// `config.backup_count` are kept. No-op for in-memory databases.
    ///
    /// # Errors
    ///
    /// Returns [`LingoError::Database`] or [`LingoError::Io`] on failure.
    pub fn create_rotating_backup(&self) -> Result<()> {
        if self.db_path.as_os_str() == ":memory:" {
            return Ok(());
        }

        let max = self.config.backup_count;
        if max == 0 {
            return Ok(());
        }

        for i in (1..max).rev() {
            let src = self.backup_path(i);
            if src.exists() {
                std::fs::rename(&src, self.backup_path(i + 1))?;
            }
        }

        let oldest = self.backup_path(max + 1);
        if oldest.exists() {
            std::fs::remove_file(&oldest)?;
        }

        self.backup(self.backup_path(1))?;
        info!(max_backups = max, "Rotating backup created");
        Ok(())
    }

    /// Path to a numbered backup file (e.g. `vocab.db.bak.1`).
    fn backup_path(&self, n: u32) -> PathBuf {
        let mut p = self.db_path.clone();
        let ext = match p.extension() {
            Some(e) => format!("{}.bak.{n}", e.to_string_lossy()),
            None => format!("bak.{n}"),
        };
        p.set_extension(ext);
        p
    }

    // ------------------------------------------------------------------
    // Utility
    // ------------------------------------------------------------------

    /// Path to the database file (or `:memory:`).
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Total number of stored items across all learners.
    ///
    /// # Errors
    ///
    /// Returns [`LingoError::Database`] on SQLite failures.
    pub fn item_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .lock()
            .query_row("SELECT COUNT(*) FROM vocabulary_items", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Run `PRAGMA integrity_check`; `Ok(false)` means corruption was found.
    ///
    /// # Errors
    ///
    /// Returns [`LingoError::Database`] if the check itself fails.
    pub fn integrity_check(&self) -> Result<bool> {
        let result: String = self
            .conn
            .lock()
            .query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
        Ok(result == "ok")
    }

    /// Reclaim unused space.
    ///
    /// # Errors
    ///
    /// Returns [`LingoError::Database`] on SQLite failures.
    pub fn vacuum(&self) -> Result<()> {
        self.conn.lock().execute_batch("VACUUM;")?;
        Ok(())
    }
}

/// The upsert absorbs `id` conflicts, so a constraint failure here is the
/// `(learner_id, term)` uniqueness.
fn term_conflict(err: rusqlite::Error, item: &VocabularyItem) -> LingoError {
    match err.sqlite_error_code() {
        Some(rusqlite::ErrorCode::ConstraintViolation) => LingoError::DuplicateTerm {
            learner: item.learner,
            term: item.term.clone(),
        },
        _ => LingoError::Database(err),
    }
}

fn micros(at: DateTime<Utc>) -> i64 {
    at.timestamp_micros()
}

impl VocabularyStore for SqliteStore {
    fn get(&self, id: ItemId) -> Result<Option<VocabularyItem>> {
        let row: Option<(Vec<u8>, Option<String>)> = {
            let conn = self.conn.lock();
            let mut stmt =
                conn.prepare_cached("SELECT data, checksum FROM vocabulary_items WHERE id = ?1")?;
            stmt.query_row(params![id.0.to_string()], |row| Ok((row.get(0)?, row.get(1)?)))
                .optional()?
        };

        row.map(|(data, checksum)| self.decode(&data, checksum.as_deref()))
            .transpose()
    }

    fn save(&self, item: &VocabularyItem) -> Result<()> {
        let start = Instant::now();
        let json = serde_json::to_vec(item).map_err(|e| LingoError::Serialization(e.to_string()))?;
        let checksum = self.config.checksum_enabled.then(|| crc32_hex(&json));
        let bytes = json.len();

        self.conn.lock().execute(
            "INSERT INTO vocabulary_items
                (id, learner_id, term, created_us, next_review_us, data, updated_at, checksum)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
                learner_id = excluded.learner_id,
                term = excluded.term,
                next_review_us = excluded.next_review_us,
                data = excluded.data,
                updated_at = excluded.updated_at,
                checksum = excluded.checksum",
            params![
                item.id.0.to_string(),
                item.learner.0.to_string(),
                item.term,
                micros(item.created_at),
                micros(item.next_review_at),
                json,
                Utc::now().to_rfc3339(),
                checksum,
            ],
        )
        .map_err(|e| term_conflict(e, item))?;

        debug!(
            item = %item.id,
            learner = %item.learner,
            bytes,
            elapsed_us = start.elapsed().as_micros(),
            "Saved vocabulary item"
        );
        Ok(())
    }

    fn find_by_term(&self, learner: LearnerId, term: &str) -> Result<Option<VocabularyItem>> {
        let mut items = self.query_items(
            "SELECT data, checksum FROM vocabulary_items WHERE learner_id = ?1 AND term = ?2",
            params![learner.0.to_string(), term],
        )?;
        Ok(items.pop())
    }

    fn list_for_learner(&self, learner: LearnerId) -> Result<Vec<VocabularyItem>> {
        let start = Instant::now();
        let items = self.query_items(
            "SELECT data, checksum FROM vocabulary_items
             WHERE learner_id = ?1 ORDER BY created_us, id",
            params![learner.0.to_string()],
        )?;
        debug!(
            learner = %learner,
            items = items.len(),
            elapsed_us = start.elapsed().as_micros(),
            "Loaded learner collection"
        );
        Ok(items)
    }

    fn list_due(&self, learner: LearnerId, now: DateTime<Utc>) -> Result<Vec<VocabularyItem>> {
        // The index column has microsecond precision; the exact check runs
        // on the decoded item.
        let mut items = self.query_items(
            "SELECT data, checksum FROM vocabulary_items
             WHERE learner_id = ?1 AND next_review_us <= ?2 ORDER BY created_us, id",
            params![learner.0.to_string(), micros(now)],
        )?;
        items.retain(|item| is_due(item, now));
        Ok(items)
    }

    fn remove(&self, id: ItemId) -> Result<bool> {
        let deleted = self
            .conn
            .lock()
            .execute("DELETE FROM vocabulary_items WHERE id = ?1", params![id.0.to_string()])?;
        Ok(deleted > 0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
