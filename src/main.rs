//! Hero-Wars admin CLI
//!
//! Maintenance tool for the progression database.

#![warn(missing_docs)]

mod cli;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use hero_wars::{Database, HeroCatalog, HeroStore, PlayerProfile, PlayerStore, Settings};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let settings = if cli.config.exists() {
        Settings::from_file(&cli.config)?
    } else {
        info!(path = %cli.config.display(), "No settings file, using defaults");
        Settings::default()
    };
    let settings = match cli.db {
        Some(db) => settings.with_database_path(db),
        None => settings,
    };

    let catalog = match settings.catalog_path() {
        Some(path) => HeroCatalog::from_file(path)?,
        None => HeroCatalog::new(),
    };

    let database = Database::new(settings.database_path());
    database.ensure_schema()?;
    let store = PlayerStore::new(HeroStore::new(database), Arc::new(catalog));

    match cli.command {
        Command::Init => {
            println!("Schema ready in {}", settings.database_path());
            Ok(())
        }
        Command::Show { steamid } => show_player(&store, &steamid),
        Command::SetGold { steamid, amount } => set_gold(&store, &steamid, amount),
    }
}

/// Loads a player and prints their progression.
#[instrument(skip(store))]
fn show_player(store: &PlayerStore, steamid: &str) -> Result<()> {
    let mut profile = PlayerProfile::new(0, steamid);
    store.load(&mut profile)?;

    println!("{}", profile.steamid());
    println!("  gold: {}", profile.gold());
    println!(
        "  current hero: {}",
        profile.current_hero().map(|h| h.cls_id()).unwrap_or("-")
    );
    for hero in profile.heroes() {
        println!(
            "  {} level {}/{} exp {}",
            hero.cls_id(),
            hero.level(),
            hero.max_level(),
            hero.exp()
        );
        for skill in hero.skills() {
            println!("    {} level {}", skill.cls_id(), skill.level());
        }
    }
    Ok(())
}

/// Replaces a player's stored gold, leaving heroes and current hero alone.
#[instrument(skip(store))]
fn set_gold(store: &PlayerStore, steamid: &str, amount: i64) -> Result<()> {
    let mut profile = PlayerProfile::new(0, steamid);
    profile.set_gold(amount)?;
    store.save_gold(&profile)?;
    println!("{} now has {} gold", steamid, amount);
    Ok(())
}
