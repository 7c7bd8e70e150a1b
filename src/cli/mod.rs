//! CLI module for vellum
//!
//! Provides the command-line interface:
//! - init: write a default configuration file
//! - serve: boot the engine and serve the document API

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{init, run, serve, Config};
pub use errors::{CliError, CliResult};
