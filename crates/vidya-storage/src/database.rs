// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database handle wrapping a single `tokio-rusqlite` connection.
//!
//! All reads and writes go through one background thread, so concurrent
//! read-modify-write sequences on the same row (e.g. two `report_time`
//! calls racing for one progress record) are serialized without explicit
//! locking. Query modules accept `&Database` and call through
//! `db.connection().call()`.

use vidya_core::VidyaError;

use crate::migrations;

/// Handle to the SQLite database. Cheap to clone via `Arc` at the caller.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path`, switch it to WAL mode,
    /// enable foreign keys, and run pending migrations.
    pub async fn open(path: &str) -> Result<Self, VidyaError> {
        // Migrations run on a short-lived blocking connection before the
        // serialized connection opens.
        let migrate_path = path.to_string();
        tokio::task::spawn_blocking(move || -> Result<(), VidyaError> {
            let mut conn = rusqlite::Connection::open(&migrate_path)
                .map_err(|e| VidyaError::Storage { source: Box::new(e) })?;
            conn.query_row("PRAGMA journal_mode=WAL", [], |_| Ok(()))
                .map_err(|e| VidyaError::Storage { source: Box::new(e) })?;
            migrations::run_migrations(&mut conn)
        })
        .await
        .map_err(|e| VidyaError::Internal(format!("migration task failed: {e}")))??;

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| VidyaError::Storage { source: Box::new(e) })?;
        conn.call(|conn| {
            conn.pragma_update(None, "foreign_keys", "ON")?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        Ok(Self { conn })
    }

    /// The underlying serialized connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Close the connection, flushing pending writes.
    pub async fn close(self) -> Result<(), VidyaError> {
        self.conn
            .close()
            .await
            .map_err(|e| VidyaError::Storage { source: Box::new(e) })
    }
}

/// Current UTC time in the RFC 3339 millisecond format used for every
/// timestamp column.
pub fn now_rfc3339() -> String {
    chrono::Utc::now()
        .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

pub(crate) fn map_tr_err(e: tokio_rusqlite::Error) -> VidyaError {
    VidyaError::Storage { source: Box::new(e) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_runs_migrations() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();

        // All five tables exist after open.
        let count: i64 = db
            .connection()
            .call(|conn| {
                let n = conn.query_row(
                    "SELECT count(*) FROM sqlite_master WHERE type = 'table'
                     AND name IN ('users', 'progress', 'study_sessions',
                                  'chat_sessions', 'chat_messages')",
                    [],
                    |row| row.get(0),
                )?;
                Ok::<_, rusqlite::Error>(n)
            })
            .await
            .unwrap();
        assert_eq!(count, 5);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reopen_is_idempotent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");

        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        db.close().await.unwrap();

        // Second open must not re-apply V1.
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        db.close().await.unwrap();
    }

    #[test]
    fn now_rfc3339_has_millis_and_zulu() {
        let now = now_rfc3339();
        assert!(now.ends_with('Z'));
        assert!(now.contains('.'));
    }
}
