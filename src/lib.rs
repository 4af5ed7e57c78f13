//! Core library for the `folio` CLI: draft, edit, and publish versioned
//! collections of resources and the relations between them.

pub mod adapters;
pub mod calver;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod draft;
pub mod engine;
pub mod error;
pub mod logging;
pub mod model;
pub mod ports;
pub mod publish;
pub mod relations;
pub mod store;
pub mod tagging;
pub mod validate;

pub use engine::Engine;
pub use error::{Error, Result};

use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// `--help` and `--version` print to stdout and succeed.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> std::result::Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => {
            print!("{err}");
            return Ok(());
        }
        Err(err) => return Err(err.to_string()),
    };
    commands::dispatch(&cli)
}
