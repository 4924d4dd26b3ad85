//! Store failure type shared by every persistence operation.

use derive_more::{Display, Error};
use tracing::instrument;

/// Where in a store call the failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum StoreFailureKind {
    /// The database file could not be opened.
    #[display("connect")]
    Connect,
    /// A statement failed on an open connection.
    #[display("statement")]
    Statement,
}

/// Failure reported by the backing SQLite store.
///
/// Never retried here; the caller decides whether to retry, drop the player
/// or abort startup.
#[derive(Debug, Clone, Display, Error)]
#[display("Store failure ({}): {} at {}:{}", kind, message, file, line)]
pub struct DbError {
    /// Whether connecting or executing failed.
    pub kind: StoreFailureKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl DbError {
    /// Creates a store error of the given kind, recording the caller location.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(kind: StoreFailureKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Returns `true` if the store could not be reached at all.
    pub fn is_connect(&self) -> bool {
        self.kind == StoreFailureKind::Connect
    }
}

impl From<diesel::result::Error> for DbError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        Self::new(StoreFailureKind::Statement, err.to_string())
    }
}

impl From<diesel::ConnectionError> for DbError {
    #[track_caller]
    fn from(err: diesel::ConnectionError) -> Self {
        Self::new(StoreFailureKind::Connect, err.to_string())
    }
}
