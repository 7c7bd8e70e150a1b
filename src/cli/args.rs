//! CLI argument definitions using clap
//!
//! Commands:
//! - vellum init --config <path>
//! - vellum serve --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// vellum - a versioned document store with coherent caching and lifecycle events
#[derive(Parser, Debug)]
#[command(name = "vellum")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a default configuration file
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./vellum.json")]
        config: PathBuf,
    },

    /// Start the document server
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./vellum.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
