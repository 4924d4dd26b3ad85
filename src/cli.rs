//! Command-line interface for hw_admin.

use clap::{Parser, Subcommand};

/// Hero-Wars admin - inspect and edit stored player progression
#[derive(Parser, Debug)]
#[command(name = "hw_admin")]
#[command(about = "Inspect and edit Hero-Wars player progression", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the settings file
    #[arg(short, long, default_value = "hw.toml")]
    pub config: std::path::PathBuf,

    /// Database file, overriding the settings file
    #[arg(long)]
    pub db: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the progression tables if they do not exist
    Init,

    /// Print a player's stored gold, heroes and skills
    Show {
        /// Player steamid
        steamid: String,
    },

    /// Overwrite a player's stored gold
    SetGold {
        /// Player steamid
        steamid: String,

        /// New gold amount
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
}
