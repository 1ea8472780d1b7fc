//! Command-line arguments for the relay binary.

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "btp-relay", about = "BTP Link relay between a source and destination chain")]
pub struct Args {
    /// Path to the relay's TOML configuration file.
    #[arg(long)]
    pub config: PathBuf,

    /// Overrides `config.endpoint`.
    #[arg(long)]
    pub endpoint: Option<String>,

    /// `RUST_LOG`-style filter directive, overriding the environment if set.
    #[arg(long)]
    pub log_level: Option<String>,
}
