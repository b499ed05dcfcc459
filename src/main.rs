//! hlspack command line entry point.

mod cli;
mod output;
mod pipeline;

use anyhow::Result;
use clap::Parser;

use crate::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG if set, otherwise derive the filter from the flags.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.debug {
            "hlspack=debug,hlspack_av=debug,hlspack_media=debug"
        } else if cli.silent {
            "error"
        } else {
            "hlspack=info,hlspack_av=info,hlspack_media=info"
        }
        .to_string()
    });
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    pipeline::run(&cli)
}
