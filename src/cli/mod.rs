//! Command-line interface for tracklink.
//!
//! `watch` (the default) follows the local player; the other commands search
//! one track, manage providers and store credentials.

mod commands;

pub use commands::{Cli, Commands, run_command};
