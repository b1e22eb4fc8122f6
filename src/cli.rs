use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "jobs-bot")]
#[command(author, version, about = "Telegram Mini App job board backend with paid reviews", long_about = None)]
pub struct Cli {
    /// Path to the TOML config file (default: ./jobs-bot.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP API and the bot (default)
    Run,

    /// Print a user's published reviews as JSON
    Reviews {
        /// Telegram user id of the reviewed user
        user_id: i64,
    },

    /// Print reviews waiting for payment as JSON
    Pending,

    /// Publish a paid review whose confirmation failed to settle
    Settle {
        /// Invoice payload of the paid review
        token: String,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
