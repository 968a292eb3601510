//! Validate a movie file

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use tasreel_core::Movie;

#[derive(Args)]
pub struct ValidateArgs {
    /// Movie file (.tasm)
    pub movie: PathBuf,
}

pub fn execute(args: ValidateArgs) -> Result<()> {
    println!("Validating movie: {}", args.movie.display());

    let movie = Movie::load(&args.movie)
        .with_context(|| format!("Failed to decode movie: {}", args.movie.display()))?;

    let layout = movie.layout();
    let mut errors = Vec::new();
    let mut idle = 0u64;
    for (index, frame) in movie.log().iter().enumerate() {
        if !frame.matches_layout(layout) {
            errors.push(format!(
                "Frame {}: {} player(s), expected {}",
                index,
                frame.player_count(),
                layout.player_count
            ));
        }
        if frame.is_neutral() {
            idle += 1;
        }
    }

    if movie.id().as_bytes() == &[0; 16] {
        errors.push("Movie has a nil identity".to_string());
    }

    if !errors.is_empty() {
        println!();
        println!("=== Validation Errors ===");
        for error in &errors {
            println!("  {}", error);
        }
        anyhow::bail!("{} validation error(s)", errors.len());
    }

    println!();
    println!("=== Movie Valid ===");
    println!("Frames: {}", movie.frame_count());
    println!("Idle frames: {}", idle);
    println!("Rerecords: {}", movie.rerecord_count());

    Ok(())
}
