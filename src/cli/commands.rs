//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - load: run the dashboard aggregation and print the result
//! - config: print the effective configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tandem - throttled dashboard aggregation for the couples backend
#[derive(Parser, Debug)]
#[command(name = "tandem")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load the dashboard once and print it
    Load {
        /// Bearer token (falls back to TANDEM_TOKEN)
        #[arg(short, long)]
        token: Option<String>,

        /// Give up if the whole load takes longer than this
        #[arg(short, long)]
        deadline_ms: Option<u64>,

        /// Print the full view model as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as YAML
    Config,
}
