//! SQLite-backed store.
//!
//! The focus state lives as one JSON document under the `focus_state` key
//! of a small key-value table.

use rusqlite::{params, Connection};
use std::path::Path;

use super::{data_dir, Store};
use crate::error::{Result, StoreError};
use crate::state::FocusState;

const FOCUS_STATE_KEY: &str = "focus_state";

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open the database at `<data_dir>/lingofocus.db`.
    ///
    /// # Errors
    /// Returns an error if the data directory or database cannot be opened.
    pub fn open_default() -> Result<Self> {
        let path = data_dir()?.join("lingofocus.db");
        Ok(Self::open(path)?)
    }

    /// Open (and migrate) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )
    }

    /// Get a value from the kv table.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        match stmt.query_row(params![key], |row| row.get::<_, String>(0)) {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Set a value in the kv table.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

impl Store for SqliteStore {
    fn load(&self) -> Result<Option<FocusState>, StoreError> {
        match self.kv_get(FOCUS_STATE_KEY)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn save(&self, state: &FocusState) -> Result<(), StoreError> {
        let json = serde_json::to_string(state)?;
        self.kv_set(FOCUS_STATE_KEY, &json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::ChallengeCategory;
    use crate::tier::SubscriptionTier;
    use chrono::Utc;

    #[test]
    fn kv_roundtrip() {
        let store = SqliteStore::open_memory().unwrap();
        assert!(store.kv_get("test").unwrap().is_none());
        store.kv_set("test", "hello").unwrap();
        assert_eq!(store.kv_get("test").unwrap().unwrap(), "hello");
    }

    #[test]
    fn load_is_none_until_saved() {
        let store = SqliteStore::open_memory().unwrap();
        assert!(store.load().unwrap().is_none());

        let mut state = FocusState::new(SubscriptionTier::Free, 5, Utc::now());
        state.heart_mut(ChallengeCategory::Quiz).unwrap().current = 2;
        store.save(&state).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.heart(ChallengeCategory::Quiz).unwrap().current, 2);
    }

    #[test]
    fn reopening_file_keeps_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("focus.db");
        let state = FocusState::new(SubscriptionTier::FluencyBuilder, 10, Utc::now());
        SqliteStore::open(&path).unwrap().save(&state).unwrap();

        let reopened = SqliteStore::open(&path).unwrap();
        let loaded = reopened.load().unwrap().unwrap();
        assert_eq!(loaded.subscription_tier, SubscriptionTier::FluencyBuilder);
    }

    #[test]
    fn corrupt_document_is_an_error() {
        let store = SqliteStore::open_memory().unwrap();
        store.kv_set(FOCUS_STATE_KEY, "{not json").unwrap();
        assert!(matches!(store.load(), Err(StoreError::Serialize(_))));
    }
}
