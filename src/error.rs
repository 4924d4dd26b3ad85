//! Errors raised by profile, hero and registry operations.

use derive_more::{Display, Error, From};

use crate::DbError;
use crate::registry::SessionId;

/// Failure of a profile-level operation.
///
/// Validation variants are raised before any state changes, so a failed call
/// leaves the profile exactly as it was.
#[derive(Debug, Clone, Display, Error, From)]
pub enum ProfileError {
    /// A value outside its allowed range, e.g. negative gold.
    #[display("Invalid argument: {}", _0)]
    InvalidArgument(#[error(not(source))] String),

    /// Attempted to switch to a hero the player does not own.
    #[display("Hero {} not owned by {}", hero, steamid)]
    NotOwned {
        /// Type id of the requested hero.
        hero: String,
        /// Steamid of the player.
        steamid: String,
    },

    /// A profile is already registered for this session.
    #[display("Session {} already has an active profile", _0)]
    SessionInUse(#[error(not(source))] SessionId),

    /// No profile is registered for this session.
    #[display("No active profile for session {}", _0)]
    NoSuchSession(#[error(not(source))] SessionId),

    /// The backing store failed.
    #[display("{}", _0)]
    #[from]
    Store(DbError),
}

impl ProfileError {
    /// Creates a [`ProfileError::InvalidArgument`].
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}
