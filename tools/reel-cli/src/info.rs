//! Print movie header and metadata

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use tasreel_core::{Movie, MovieFlags};

#[derive(Args)]
pub struct InfoArgs {
    /// Movie file (.tasm)
    pub movie: PathBuf,
}

pub fn execute(args: InfoArgs) -> Result<()> {
    let movie = Movie::load(&args.movie)
        .with_context(|| format!("Failed to load movie: {}", args.movie.display()))?;

    let header = movie.header();
    let layout = movie.layout();
    println!("=== {} ===", args.movie.display());
    println!("Movie ID: {}", movie.id());
    println!(
        "Layout: {} player(s) x {} byte(s)",
        layout.player_count, layout.input_size
    );
    println!("Frames: {}", movie.frame_count());
    println!("Rerecords: {}", movie.rerecord_count());
    println!(
        "Compressed: {}",
        header.flags.contains(MovieFlags::COMPRESSED_INPUTS)
    );
    println!("Log checksum: {:016x}", movie.log().checksum());

    let metadata = movie.metadata();
    if !metadata.is_empty() {
        println!();
        print_field("Author", &metadata.author);
        print_field("Game", &metadata.game_name);
        print_field("Platform", &metadata.platform);
        print_field("Emulator", &metadata.emulator_version);
        for comment in &metadata.comments {
            println!("# {}", comment);
        }
    }

    Ok(())
}

fn print_field(label: &str, value: &str) {
    if !value.is_empty() {
        println!("{}: {}", label, value);
    }
}
