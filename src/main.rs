//! Tracklink - find the track you are listening to on every music service.
//!
//! Polls the local media player, searches each configured catalog
//! (Spotify, YouTube Music) concurrently whenever the track changes, and
//! shows a link per service as results arrive.

pub mod cli;
pub mod config;
pub mod error;
pub mod matching;
pub mod nowplaying;
pub mod secrets;
pub mod status;
#[cfg(test)]
pub mod test_utils;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Logs go to stderr so the status view on stdout stays readable
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tracklink=info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();

    cli::run_command(&args)
}
