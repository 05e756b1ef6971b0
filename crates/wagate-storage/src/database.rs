// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All access is serialized through tokio-rusqlite's single background
//! thread, so every request's statements run on one connection and the
//! closure returns it on every exit path. Do NOT create additional
//! Connection instances for writes.

use tokio_rusqlite::Connection;
use tracing::debug;

use wagate_config::model::StorageConfig;
use wagate_core::WagateError;

use crate::migrations;

/// Handle to the SQLite database.
///
/// Cheap to clone; all clones share the same background connection.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (creating if needed) the database at the configured path,
    /// apply PRAGMAs, and run all pending migrations.
    pub async fn open(config: &StorageConfig) -> Result<Self, WagateError> {
        if let Some(parent) = std::path::Path::new(&config.database_path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| WagateError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = Connection::open(&config.database_path)
            .await
            .map_err(|e| WagateError::Storage {
                source: Box::new(e),
            })?;

        let wal = config.wal_mode;
        conn.call(move |conn| {
            if wal {
                conn.execute_batch("PRAGMA journal_mode = WAL;")
                    .map_err(|e| WagateError::Storage {
                        source: Box::new(e),
                    })?;
            }
            conn.execute_batch(
                "PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;
                 PRAGMA synchronous = NORMAL;",
            )
            .map_err(|e| WagateError::Storage {
                source: Box::new(e),
            })?;
            migrations::run_migrations(conn)?;
            Ok(())
        })
        .await
        .map_err(|e| match e {
            tokio_rusqlite::Error::Error(inner) => inner,
            other => WagateError::Storage {
                source: Box::new(other),
            },
        })?;

        debug!(path = %config.database_path, "database opened");
        Ok(Database { conn })
    }

    /// The underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Checkpoint the WAL and close the background connection.
    pub async fn close(&self) -> Result<(), WagateError> {
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

/// Map a tokio-rusqlite error into the workspace error type.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error) -> WagateError {
    WagateError::Storage {
        source: Box::new(e),
    }
}
