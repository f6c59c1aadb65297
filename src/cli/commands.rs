//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - analyze: run a batch of selections through the match engine
//! - catalog: list the known partner categories and options

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Stackmatch - AI-assisted infrastructure partner matching engine
#[derive(Parser, Debug)]
#[command(name = "stackmatch")]
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
    /// Analyze a batch of partner selections
    Analyze {
        /// JSON file with an array of { "category", "value" } selections
        file: PathBuf,
    },

    /// List the known partner categories and their options
    Catalog,
}
