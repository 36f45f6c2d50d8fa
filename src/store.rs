//! Key-value blob storage backing the persisted preferences.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL,
    updated_ts REAL NOT NULL
);
"#;

pub const DB_ENV_VAR: &str = "STATION_UNITS_DB";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Serialized blobs addressed by key. Only the latest value per key is kept.
pub trait BlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(db_path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(db_path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }
}

impl BlobStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let ts = chrono::Utc::now().timestamp_millis() as f64 / 1000.0;
        self.conn.execute(
            r#"
            INSERT INTO kv (key, value, updated_ts) VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_ts = excluded.updated_ts
            "#,
            params![key, value, ts],
        )?;
        Ok(())
    }
}

pub fn default_db_path() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"));
    home.join(".local")
        .join("share")
        .join("station-units")
        .join("prefs.db")
}

pub fn resolve_db_path(db_path: Option<&Path>) -> PathBuf {
    if let Some(path) = db_path {
        return path.to_path_buf();
    }
    if let Ok(env_path) = std::env::var(DB_ENV_VAR) {
        if let Some(stripped) = env_path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        }
        return PathBuf::from(env_path);
    }
    default_db_path()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_keeps_latest_value() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "one").unwrap();
        store.set("k", "two").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("two"));
    }

    #[test]
    fn sqlite_store_persists_across_connections() {
        let tmp = tempfile::tempdir().unwrap();
        let db_path = tmp.path().join("nested").join("prefs.db");
        {
            let mut store = SqliteStore::open(&db_path).unwrap();
            store.set("userPreferences", r#"{"temp":"celsius"}"#).unwrap();
            store.set("userPreferences", r#"{"temp":"kelvin"}"#).unwrap();
        }
        let store = SqliteStore::open(&db_path).unwrap();
        assert_eq!(
            store.get("userPreferences").unwrap().as_deref(),
            Some(r#"{"temp":"kelvin"}"#)
        );
        assert_eq!(store.get("missing").unwrap(), None);
    }

    #[test]
    fn explicit_db_path_wins() {
        let path = Path::new("/tmp/custom.db");
        assert_eq!(resolve_db_path(Some(path)), PathBuf::from("/tmp/custom.db"));
        assert!(default_db_path().ends_with("station-units/prefs.db"));
    }
}
