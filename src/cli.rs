use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "artforge")]
#[command(author, version, about = "Artwork resolution engine for personal media libraries")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List items due for an automatic artwork re-check
    Due {
        /// Maximum number of records to show
        #[arg(short, long, default_value = "50")]
        limit: i64,
    },

    /// Search the configured providers for a movie-set collection
    SearchSet {
        /// Set name to search for
        #[arg(required = true)]
        name: String,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
