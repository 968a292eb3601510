//! Print a movie's input log

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use std::path::PathBuf;

use tasreel_core::{InputFrame, Movie};

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    /// One line per frame, hex bytes per player
    #[default]
    Text,
    /// A single JSON document with header, metadata and frames
    Json,
}

#[derive(Args)]
pub struct DumpArgs {
    /// Movie file (.tasm)
    pub movie: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// First frame to print
    #[arg(long, default_value = "0")]
    pub from: u64,

    /// Number of frames to print (default: all)
    #[arg(long)]
    pub count: Option<u64>,
}

pub fn execute(args: DumpArgs) -> Result<()> {
    let movie = Movie::load(&args.movie)
        .with_context(|| format!("Failed to load movie: {}", args.movie.display()))?;

    let frames = movie
        .log()
        .iter()
        .enumerate()
        .skip(args.from as usize)
        .take(args.count.map_or(usize::MAX, |c| c as usize));

    match args.output {
        OutputFormat::Text => {
            for (index, frame) in frames {
                println!("{:>8}: {}", index, format_frame(frame));
            }
        }
        OutputFormat::Json => {
            let frames: Vec<&InputFrame> = frames.map(|(_, frame)| frame).collect();
            let document = serde_json::json!({
                "header": movie.header(),
                "metadata": movie.metadata(),
                "first_frame": args.from,
                "frames": frames,
            });
            let json = serde_json::to_string_pretty(&document)
                .context("Failed to serialize movie to JSON")?;
            println!("{}", json);
        }
    }

    Ok(())
}

/// `0a0b | 0000` style rendering of one frame
fn format_frame(frame: &InputFrame) -> String {
    frame
        .players()
        .map(|player| player.iter().map(|b| format!("{:02x}", b)).collect::<String>())
        .collect::<Vec<_>>()
        .join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_frame() {
        let frame = InputFrame::from_players([[0x0Au8, 0x0B], [0, 0]]);
        assert_eq!(format_frame(&frame), "0a0b | 0000");
    }
}
