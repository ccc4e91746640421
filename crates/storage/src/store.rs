//! Read-only handle on one run's SQLite store.

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection, Row};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{Result, StoreError};

/// A single read-only connection to a run's store.
///
/// The store is never created, migrated or written. Callers issue
/// queries one at a time and should [`close`](RunStore::close) the
/// handle when done; dropping it also releases the connection.
pub struct RunStore {
    conn: SqliteConnection,
    path: PathBuf,
}

impl RunStore {
    /// Open the store at `path` read-only.
    ///
    /// Fails with [`StoreError::NotFound`] when the file does not exist.
    pub async fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(StoreError::NotFound(path.to_path_buf()));
        }

        let conn = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true)
            .create_if_missing(false)
            .connect()
            .await
            .map_err(|source| StoreError::Connect {
                path: path.to_path_buf(),
                source,
            })?;

        debug!("Opened store {} read-only", path.display());

        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Path the store was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Close the connection.
    ///
    /// A failure to close cleanly is logged; nothing was written, so
    /// there is nothing to recover.
    pub async fn close(self) {
        let path = self.path;
        if let Err(e) = self.conn.close().await {
            warn!("Error closing store {}: {}", path.display(), e);
        }
    }

    /// Whether a table with this name exists.
    pub async fn table_exists(&mut self, name: &str) -> Result<bool> {
        let count: i64 = sqlx::query(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
        )
        .bind(name)
        .fetch_one(&mut self.conn)
        .await
        .map_err(StoreError::query("table lookup"))?
        .try_get(0)
        .map_err(StoreError::query("table lookup"))?;

        Ok(count > 0)
    }

    /// Column names of a table, in declaration order.
    ///
    /// `table` must be a trusted identifier; it is interpolated into a
    /// PRAGMA statement, which does not accept bound parameters.
    pub(crate) async fn table_columns(&mut self, table: &'static str) -> Result<Vec<String>> {
        let rows = sqlx::query(&format!("PRAGMA table_info({})", table))
            .fetch_all(&mut self.conn)
            .await
            .map_err(StoreError::query("table columns"))?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("name"))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::query("table columns"))
    }

    /// Borrow the underlying connection for a query.
    pub(crate) fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::Fixture;

    #[tokio::test]
    async fn test_open_missing_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.db");

        let err = RunStore::open(&path).await.err().unwrap();
        assert!(matches!(err, StoreError::NotFound(p) if p == path));
        assert!(!path.exists(), "opening must not create the store");
    }

    #[tokio::test]
    async fn test_table_probe() {
        let dir = tempfile::tempdir().unwrap();
        let path = Fixture::create(&dir.path().join("run.db"))
            .await
            .unwrap()
            .finish()
            .await
            .unwrap();

        let mut store = RunStore::open(&path).await.unwrap();
        assert!(store.table_exists("tasks").await.unwrap());
        assert!(!store.table_exists("task_sequence").await.unwrap());

        let columns = store.table_columns("tasks").await.unwrap();
        assert!(columns.iter().any(|c| c == "deleted_at"));
        assert!(columns.iter().any(|c| c == "metric_7"));
        store.close().await;
    }

    #[tokio::test]
    async fn test_store_rejects_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = Fixture::create(&dir.path().join("run.db"))
            .await
            .unwrap()
            .finish()
            .await
            .unwrap();

        let mut store = RunStore::open(&path).await.unwrap();
        let write = sqlx::query("DELETE FROM tasks").execute(store.conn()).await;
        assert!(write.is_err());
        store.close().await;
    }
}
