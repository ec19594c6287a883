//! Data files command-line client
//!
//! Thin front end over `datafiles-client`: every subcommand maps to one API
//! call and prints the server's answer as JSON on stdout.

pub mod cli;
pub mod commands;

pub use cli::{Cli, Command};
pub use commands::{execute, run};
