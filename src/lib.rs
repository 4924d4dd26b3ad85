//! Hero-Wars player progression.
//!
//! Persists each player's gold, owned heroes, hero levels and experience,
//! and skill levels to SQLite, and keeps the in-memory profiles of connected
//! players consistent: a player only ever uses a hero they own, and the
//! outgoing hero is saved whenever they switch.
//!
//! # Architecture
//!
//! - **Database**: scoped SQLite connections and idempotent schema setup
//! - **HeroStore / PlayerStore**: row-level load and save
//! - **PlayerProfile**: validated gold and hero-switch mutations
//! - **PlayerRegistry**: profile creation on connect, save and eviction on leave
//! - **HeroCatalog**: hero type definitions that stored rows resolve against
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use hero_wars::{HeroCatalog, NoopBinding, PlayerRegistry, Settings};
//!
//! # fn example() -> anyhow::Result<()> {
//! let settings = Settings::from_file("hw.toml")?;
//! let catalog = Arc::new(HeroCatalog::from_file("heroes.toml")?);
//! let mut registry = PlayerRegistry::open(&settings, catalog, Box::new(NoopBinding))?;
//!
//! let profile = registry.create(2, "STEAM_0:1:17441574")?;
//! profile.give_gold(5)?;
//! registry.remove(2)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod catalog;
mod config;
mod db;
mod error;
mod hero;
mod profile;
mod registry;

// Crate-level exports - Persistence
pub use db::{Database, DbError, HeroStore, PlayerStore, StoreFailureKind};

// Crate-level exports - Configuration
pub use catalog::{HeroCatalog, HeroType, SkillType};
pub use config::{ConfigError, ExpCurve, Settings};

// Crate-level exports - Domain
pub use error::ProfileError;
pub use hero::{Hero, Item, Skill};
pub use profile::PlayerProfile;
pub use registry::{EngineBinding, NoopBinding, PlayerKey, PlayerRegistry, SessionId};
