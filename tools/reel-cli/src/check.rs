//! Check a savestate's embedded movie block against a movie file

use anyhow::{Context, Result};
use clap::Args;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tasreel_core::{CheckPolicy, Movie, SavestateLog, TimelineVerdict, check_timeline};

#[derive(Args)]
pub struct CheckArgs {
    /// Movie file (.tasm)
    pub movie: PathBuf,

    /// Savestate file containing a movie block
    pub savestate: PathBuf,

    /// Byte offset of the movie block inside the savestate
    #[arg(long, default_value = "0")]
    pub offset: u64,

    /// Only compare identities, as a read+write load would
    #[arg(long)]
    pub identity_only: bool,
}

pub fn execute(args: CheckArgs) -> Result<()> {
    let policy = if args.identity_only {
        CheckPolicy::IDENTITY_ONLY
    } else {
        CheckPolicy::STRICT
    };

    let (block, verdict) = run_check(&args.movie, &args.savestate, args.offset, policy)?;
    println!(
        "Savestate: movie {} at frame {} ({} logged frames)",
        block.id,
        block.frame,
        block.log.frame_count()
    );

    match verdict {
        TimelineVerdict::Consistent => {
            println!("Consistent");
            Ok(())
        }
        TimelineVerdict::IdentityMismatch => {
            anyhow::bail!("Savestate belongs to a different movie")
        }
        TimelineVerdict::ContentMismatch { frame } => {
            anyhow::bail!("Savestate input log diverges at frame {}", frame)
        }
    }
}

fn run_check(
    movie: &Path,
    savestate: &Path,
    offset: u64,
    policy: CheckPolicy,
) -> Result<(SavestateLog, TimelineVerdict)> {
    let movie = Movie::load(movie)
        .with_context(|| format!("Failed to load movie: {}", movie.display()))?;

    let file = File::open(savestate)
        .with_context(|| format!("Failed to open savestate: {}", savestate.display()))?;
    let block = SavestateLog::read_at(&mut BufReader::new(file), offset).with_context(|| {
        format!(
            "No readable movie block at offset {} in {}",
            offset,
            savestate.display()
        )
    })?;

    let verdict = check_timeline(&block, &movie, policy);
    Ok((block, verdict))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasreel_core::{InputFrame, InputLayout};

    fn write_fixture(dir: &Path) -> (PathBuf, Movie) {
        let path = dir.join("run.tasm");
        let mut movie = Movie::new(&path, InputLayout::new(1, 1));
        movie.start_recording().unwrap();
        for i in 0..20u8 {
            movie.capture_frame(InputFrame::from_players([[i]])).unwrap();
        }
        let snapshot = movie.clone();
        movie.stop(false).unwrap();
        (path, snapshot)
    }

    fn write_state(dir: &Path, block: &SavestateLog) -> PathBuf {
        let path = dir.join("slot1.state");
        let mut bytes = vec![0xCC; 16];
        block.write_to(&mut bytes).unwrap();
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_check_consistent_savestate() {
        let dir = tempfile::tempdir().unwrap();
        let (movie_path, movie) = write_fixture(dir.path());
        let state = write_state(dir.path(), &movie.to_savestate(10));

        let (block, verdict) = run_check(&movie_path, &state, 16, CheckPolicy::STRICT).unwrap();
        assert_eq!(block.frame, 10);
        assert_eq!(verdict, TimelineVerdict::Consistent);
    }

    #[test]
    fn test_check_divergent_savestate() {
        let dir = tempfile::tempdir().unwrap();
        let (movie_path, movie) = write_fixture(dir.path());
        let mut block = movie.to_savestate(10);
        block.log.set_frame(4, InputFrame::from_players([[0xFFu8]]));
        let state = write_state(dir.path(), &block);

        let (_, verdict) = run_check(&movie_path, &state, 16, CheckPolicy::STRICT).unwrap();
        assert_eq!(verdict, TimelineVerdict::ContentMismatch { frame: 4 });

        let (_, verdict) =
            run_check(&movie_path, &state, 16, CheckPolicy::IDENTITY_ONLY).unwrap();
        assert_eq!(verdict, TimelineVerdict::Consistent);
    }

    #[test]
    fn test_check_wrong_offset_fails() {
        let dir = tempfile::tempdir().unwrap();
        let (movie_path, movie) = write_fixture(dir.path());
        let state = write_state(dir.path(), &movie.to_savestate(10));

        assert!(run_check(&movie_path, &state, 0, CheckPolicy::STRICT).is_err());
    }
}
