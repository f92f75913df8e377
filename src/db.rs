use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::PathBuf;

use crate::error::PersistenceError;
use crate::saved::SavedSearchStore;

/// Durable storage for saved-search lists. One row per domain key, holding
/// the whole serialized list, so candidates and openings never share state.
pub struct Database {
    conn: Connection,
    path: PathBuf,
}

impl Database {
    pub fn open() -> Result<Self> {
        let path = Self::default_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        let db = Self { conn, path };
        db.init()?;
        Ok(db)
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn default_path() -> Result<PathBuf> {
        // Use XDG data directory or fallback
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "scout") {
            Ok(proj_dirs.data_dir().join("scout.db"))
        } else {
            Ok(PathBuf::from("scout.db"))
        }
    }

    fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS saved_searches (
                storage_key TEXT PRIMARY KEY,
                payload TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )?;
        Ok(())
    }

    #[cfg(test)]
    fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn,
            path: PathBuf::from(":memory:"),
        };
        db.init()?;
        Ok(db)
    }
}

impl SavedSearchStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let payload = self
            .conn
            .query_row(
                "SELECT payload FROM saved_searches WHERE storage_key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(payload)
    }

    fn set(&self, key: &str, payload: &str) -> Result<(), PersistenceError> {
        self.conn.execute(
            "INSERT INTO saved_searches (storage_key, payload, updated_at)
             VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(storage_key) DO UPDATE
             SET payload = excluded.payload, updated_at = excluded.updated_at",
            params![key, payload],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_missing_key_is_none() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get("candidate_saved_searches").unwrap().is_none());
    }

    #[test]
    fn test_set_then_get_round_trips() {
        let db = Database::open_in_memory().unwrap();
        db.set("candidate_saved_searches", "[]").unwrap();
        assert_eq!(
            db.get("candidate_saved_searches").unwrap().as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn test_set_overwrites_existing_payload() {
        let db = Database::open_in_memory().unwrap();
        db.set("opening_saved_searches", "[1]").unwrap();
        db.set("opening_saved_searches", "[1,2]").unwrap();
        assert_eq!(
            db.get("opening_saved_searches").unwrap().as_deref(),
            Some("[1,2]")
        );
    }

    #[test]
    fn test_domain_keys_are_independent() {
        let db = Database::open_in_memory().unwrap();
        db.set("candidate_saved_searches", "[\"c\"]").unwrap();
        db.set("opening_saved_searches", "[\"o\"]").unwrap();
        assert_eq!(
            db.get("candidate_saved_searches").unwrap().as_deref(),
            Some("[\"c\"]")
        );
        assert_eq!(
            db.get("opening_saved_searches").unwrap().as_deref(),
            Some("[\"o\"]")
        );
    }
}
