//! CLI module
//!
//! Command-line interface for running providers.
//!
//! # Commands
//!
//! - `sync` - Extract selected streams as Singer messages on stdout
//! - `discover` - Print the Singer catalog of a provider
//! - `list` - List built-in providers
//! - `validate` - Validate a provider definition, and a config against it

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
