// Key-value persistence backends

use eyre::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const CURRENT_VERSION: u32 = 1;
const DB_FILE: &str = "focusflow.db";

/// String-keyed, string-valued store the task collection is persisted into
///
/// Values are always overwritten whole; there are no partial writes.
pub trait KeyValue {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// On-disk key-value store backed by a single SQLite table
pub struct SqliteKv {
    base_path: PathBuf,
    db: Connection,
}

impl SqliteKv {
    /// Open or create a store in the given directory
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();

        fs::create_dir_all(&base_path).context("Failed to create store directory")?;

        let db_path = base_path.join(DB_FILE);
        let db = Connection::open(&db_path).context("Failed to open SQLite database")?;

        let store = Self { base_path, db };
        store.create_schema()?;
        store.write_version()?;

        debug!(path = ?store.base_path, "Opened key-value store");
        Ok(store)
    }

    /// Get the base path of this store
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn create_schema(&self) -> Result<()> {
        self.db
            .execute_batch(
                r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
            )
            .context("Failed to create schema")?;

        Ok(())
    }

    fn write_version(&self) -> Result<()> {
        let version_path = self.base_path.join(".version");
        if !version_path.exists() {
            fs::write(version_path, CURRENT_VERSION.to_string())?;
        }
        Ok(())
    }
}

impl KeyValue for SqliteKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .db
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()
            .with_context(|| format!("Failed to read key {}", key))?;

        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let tx = self.db.transaction()?;

        tx.execute(
            "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![key, value, now_ms()],
        )
        .with_context(|| format!("Failed to write key {}", key))?;

        tx.commit()?;

        debug!(key, bytes = value.len(), "Wrote key");
        Ok(())
    }
}

/// In-process key-value store; contents are lost on drop
#[derive(Debug, Default, Clone)]
pub struct MemoryKv {
    entries: HashMap<String, String>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValue for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn exercise<K: KeyValue>(kv: &mut K) {
        assert_eq!(kv.get("missing").unwrap(), None);

        kv.set("k", "one").unwrap();
        assert_eq!(kv.get("k").unwrap().as_deref(), Some("one"));

        kv.set("k", "two").unwrap();
        assert_eq!(kv.get("k").unwrap().as_deref(), Some("two"));
        assert_eq!(kv.get("other").unwrap(), None);
    }

    #[test]
    fn test_memory_kv() {
        exercise(&mut MemoryKv::new());
    }

    #[test]
    fn test_sqlite_kv() {
        let temp = TempDir::new().unwrap();
        let mut kv = SqliteKv::open(temp.path()).unwrap();
        exercise(&mut kv);
    }

    #[test]
    fn test_sqlite_kv_open_creates_files() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("nested").join("store");

        let kv = SqliteKv::open(&dir).unwrap();
        assert_eq!(kv.base_path(), dir.as_path());
        assert!(dir.join(DB_FILE).exists());
        assert_eq!(fs::read_to_string(dir.join(".version")).unwrap(), "1");
    }

    #[test]
    fn test_sqlite_kv_persists_across_reopen() {
        let temp = TempDir::new().unwrap();

        {
            let mut kv = SqliteKv::open(temp.path()).unwrap();
            kv.set("focusflow.tasks.v1", "[]").unwrap();
        }

        let kv = SqliteKv::open(temp.path()).unwrap();
        assert_eq!(kv.get("focusflow.tasks.v1").unwrap().as_deref(), Some("[]"));
    }
}
