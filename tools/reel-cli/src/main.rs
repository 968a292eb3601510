//! Reel CLI - Inspect Tasreel movies and savestates
//!
//! # Commands
//!
//! - `reel info <movie>` - Print header, metadata and log checksum
//! - `reel validate <movie>` - Decode every frame and check the layout
//! - `reel dump <movie>` - Print the input log (text or JSON)
//! - `reel check <movie> <savestate>` - Run the timeline check against a savestate
//!
//! # Usage
//!
//! ```bash
//! # Is this savestate from the same run, and does its log match?
//! reel check run.tasm slot3.state --offset 4096
//!
//! # Export the inputs for a script
//! reel dump run.tasm -o json > run.json
//! ```

mod check;
mod dump;
mod info;
mod validate;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Reel CLI - Inspect Tasreel movies and savestates
#[derive(Parser)]
#[command(name = "reel")]
#[command(about = "Inspect Tasreel movies and savestates")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print movie header, metadata and log checksum
    Info(info::InfoArgs),
    /// Decode a movie and check every frame against its layout
    Validate(validate::ValidateArgs),
    /// Print the input log
    Dump(dump::DumpArgs),
    /// Check a savestate's embedded log against a movie
    Check(check::CheckArgs),
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Info(args) => info::execute(args),
        Commands::Validate(args) => validate::execute(args),
        Commands::Dump(args) => dump::execute(args),
        Commands::Check(args) => check::execute(args),
    }
}
