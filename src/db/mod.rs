//! SQLite persistence for players, heroes and skills.

mod database;
mod error;
mod hero_store;
mod models;
mod player_store;
mod schema;

pub use database::Database;
pub use error::{DbError, StoreFailureKind};
pub use hero_store::HeroStore;
pub use player_store::PlayerStore;
