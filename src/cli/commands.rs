//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Singer tap for declaratively defined REST APIs
#[derive(Parser, Debug)]
#[command(name = "rest-tap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Provider: built-in name or definition file (YAML)
    #[arg(short, long, global = true, visible_alias = "definition")]
    pub provider: Option<PathBuf>,

    /// Configuration file (JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Inline config JSON
    #[arg(long, global = true)]
    pub config_json: Option<String>,

    /// State file (JSON), read at start and rewritten after every bookmark change
    #[arg(short, long, global = true)]
    pub state: Option<PathBuf>,

    /// Output format of non-sync commands
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract streams as Singer messages
    Sync {
        /// Streams to sync (comma-separated, empty = selected by default)
        #[arg(long)]
        streams: Option<String>,

        /// Stop the run at the first failed partition
        #[arg(long)]
        fail_fast: bool,

        /// Fail a partition whose records are not sorted by replication value
        #[arg(long)]
        reject_unordered: bool,
    },

    /// Print the Singer catalog
    Discover,

    /// List built-in providers
    List,

    /// Validate the provider definition, and the config when one is given
    Validate,
}

impl Commands {
    /// Stream names passed to `sync`
    pub fn stream_selection(&self) -> Vec<String> {
        match self {
            Self::Sync {
                streams: Some(list),
                ..
            } => list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
