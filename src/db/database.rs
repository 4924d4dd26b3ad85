//! Store handle: scoped connections and schema setup.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use tracing::{debug, info, instrument};

use crate::db::{DbError, StoreFailureKind};

/// DDL for the three progression tables. Safe to run on every start.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS players (
    steamid TEXT PRIMARY KEY,
    gold INTEGER,
    hero_cls_id TEXT
);

CREATE TABLE IF NOT EXISTS heroes (
    steamid TEXT,
    cls_id TEXT,
    level INTEGER,
    exp INTEGER,
    PRIMARY KEY (steamid, cls_id)
);

CREATE TABLE IF NOT EXISTS skills (
    steamid TEXT,
    hero_cls_id TEXT,
    cls_id TEXT,
    level INTEGER,
    PRIMARY KEY (steamid, hero_cls_id, cls_id)
);
"#;

/// Handle to the SQLite file backing player progression.
///
/// Holds only the path. Every operation opens its own connection, which is
/// closed when the operation returns, so no statement sequence spans more
/// than one call and nothing stays open between calls.
///
/// The path must name a file: `":memory:"` would hand each call a fresh,
/// empty database.
#[derive(Debug, Clone)]
pub struct Database {
    db_path: String,
}

impl Database {
    /// Creates a handle for the database file at `db_path`.
    #[instrument(skip(db_path), fields(db_path = %db_path.as_ref()))]
    pub fn new(db_path: impl AsRef<str>) -> Self {
        let db_path = db_path.as_ref().to_string();
        info!(path = %db_path, "Creating Database handle");
        Self { db_path }
    }

    /// Returns the path of the backing file.
    #[instrument(skip(self))]
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Establishes a connection scoped to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the file cannot be opened.
    #[instrument(skip(self))]
    pub(crate) fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        SqliteConnection::establish(&self.db_path)
            .map_err(|e| {
                DbError::new(
                    StoreFailureKind::Connect,
                    format!("Failed to connect to '{}': {}", self.db_path, e),
                )
            })
    }

    /// Creates the `players`, `heroes` and `skills` tables if absent.
    ///
    /// Idempotent: existing tables and their rows are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store cannot be reached or the DDL fails.
    #[instrument(skip(self), fields(db_path = %self.db_path))]
    pub fn ensure_schema(&self) -> Result<(), DbError> {
        debug!("Ensuring schema");
        let mut conn = self.connection()?;
        conn.batch_execute(SCHEMA)?;
        info!("Schema ready");
        Ok(())
    }
}
