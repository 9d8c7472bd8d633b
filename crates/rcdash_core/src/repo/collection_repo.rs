//! Collection store contract with SQLite and in-memory implementations.
//!
//! # Responsibility
//! - Load and save serialized collections keyed by collection name.
//! - Commit multi-collection writes atomically so a cascade never lands
//!   half-persisted.
//!
//! # Invariants
//! - `load` returns `None` only for keys that were never saved.
//! - A failed `save_batch` leaves every key at its previous value.

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence-layer failure.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    MissingRequiredTable(&'static str),
    /// Backend refused or could not complete the operation.
    Unavailable(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "storage is missing required table `{table}`")
            }
            Self::Unavailable(message) => write!(f, "storage unavailable: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::MissingRequiredTable(_) | Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable key-value storage for serialized collections.
pub trait CollectionStore {
    /// Returns the payload stored under `key`, if any.
    fn load(&self, key: &str) -> RepoResult<Option<String>>;

    /// Writes every `(key, payload)` pair, all or nothing.
    fn save_batch(&mut self, entries: &[(&'static str, String)]) -> RepoResult<()>;
}

/// SQLite-backed collection store using the `collections` table.
pub struct SqliteCollectionStore {
    conn: Connection,
}

impl SqliteCollectionStore {
    /// Wraps a migrated connection.
    ///
    /// Rejects connections that were not opened through `db::open_db*`.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'collections'
            );",
            [],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable("collections"));
        }
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Lists stored keys in name order.
    pub fn keys(&self) -> RepoResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM collections ORDER BY key ASC;")?;
        let mut rows = stmt.query([])?;
        let mut keys = Vec::new();
        while let Some(row) = rows.next()? {
            keys.push(row.get(0)?);
        }
        Ok(keys)
    }
}

impl CollectionStore for SqliteCollectionStore {
    fn load(&self, key: &str) -> RepoResult<Option<String>> {
        let payload = self
            .conn
            .query_row(
                "SELECT payload FROM collections WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(payload)
    }

    fn save_batch(&mut self, entries: &[(&'static str, String)]) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        for (key, payload) in entries {
            tx.execute(
                "INSERT INTO collections (key, payload, updated_at)
                 VALUES (?1, ?2, strftime('%s', 'now') * 1000)
                 ON CONFLICT(key) DO UPDATE SET
                    payload = excluded.payload,
                    updated_at = excluded.updated_at;",
                params![key, payload],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

/// Process-local store. Data lives as long as the value.
#[derive(Debug, Clone, Default)]
pub struct MemoryCollectionStore {
    entries: BTreeMap<String, String>,
    writes: usize,
}

impl MemoryCollectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `save_batch` calls.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Seeds a raw payload, bypassing the entity store.
    pub fn insert_raw(&mut self, key: impl Into<String>, payload: impl Into<String>) {
        self.entries.insert(key.into(), payload.into());
    }
}

impl CollectionStore for MemoryCollectionStore {
    fn load(&self, key: &str) -> RepoResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn save_batch(&mut self, entries: &[(&'static str, String)]) -> RepoResult<()> {
        for (key, payload) in entries {
            self.entries.insert((*key).to_string(), payload.clone());
        }
        self.writes += 1;
        Ok(())
    }
}
