// SPDX-FileCopyrightText: 2026 Brigadir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and
//! embedded migrations.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes: the
//! claim guard relies on every order mutation going through this writer.

use std::path::Path;

use brigadir_config::model::StorageConfig;
use brigadir_core::BrigadirError;
use tracing::debug;

/// Handle to the SQLite database.
///
/// Cheap to clone; all clones share the same background writer thread.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Opens the database described by the storage configuration.
    pub async fn open_with(config: &StorageConfig) -> Result<Self, BrigadirError> {
        Self::open_inner(&config.database_path, config.wal_mode).await
    }

    /// Opens (creating if needed) the database at `path` in WAL mode,
    /// applies PRAGMAs, and runs all pending migrations.
    pub async fn open(path: &str) -> Result<Self, BrigadirError> {
        Self::open_inner(path, true).await
    }

    /// Migrations run on a short-lived synchronous connection before the
    /// async writer opens, so the writer only ever sees a current schema.
    async fn open_inner(path: &str, wal_mode: bool) -> Result<Self, BrigadirError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(BrigadirError::storage)?;
        }

        {
            let mut sync_conn =
                rusqlite::Connection::open(path).map_err(BrigadirError::storage)?;
            let journal = if wal_mode { "WAL" } else { "DELETE" };
            sync_conn
                .execute_batch(&format!(
                    "PRAGMA journal_mode = {journal};
                     PRAGMA synchronous = NORMAL;
                     PRAGMA busy_timeout = 5000;",
                ))
                .map_err(BrigadirError::storage)?;
            crate::migrations::run_migrations(&mut sync_conn)?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(BrigadirError::storage)?;
        conn.call(|conn| {
            conn.execute_batch(
                "PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;",
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        debug!(path, "database opened");
        Ok(Self { conn })
    }

    /// The shared writer connection. Query modules call through this.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoints the WAL and releases the writer.
    pub async fn close(&self) -> Result<(), BrigadirError> {
        self.conn
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

/// Maps a tokio-rusqlite error into the shared storage error.
pub fn map_tr_err(err: tokio_rusqlite::Error) -> BrigadirError {
    BrigadirError::Storage {
        source: Box::new(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_file_and_schema() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("open_test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        assert!(db_path.exists());

        // All four tables exist after migration.
        let count: i64 = db
            .connection()
            .call(|conn| {
                conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
                     AND name IN ('orders', 'users', 'responses', 'order_photos')",
                    [],
                    |row| row.get(0),
                )
            })
            .await
            .unwrap();
        assert_eq!(count, 4);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn open_is_idempotent_across_restarts() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("reopen_test.db");

        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        db.close().await.unwrap();
        drop(db);

        // Second open must not re-apply migrations.
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn open_with_honors_disabled_wal() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("rollback_journal.db");
        let config = StorageConfig {
            database_path: db_path.to_string_lossy().into_owned(),
            wal_mode: false,
        };
        let db = Database::open_with(&config).await.unwrap();

        let mode: String = db
            .connection()
            .call(|conn| conn.query_row("PRAGMA journal_mode", [], |row| row.get(0)))
            .await
            .unwrap();
        assert_eq!(mode.to_lowercase(), "delete");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn open_creates_missing_parent_directory() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested/data/brigadir.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        assert!(db_path.exists());
        db.close().await.unwrap();
    }
}
