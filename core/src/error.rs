//! Error types for the movie engine

use std::io;
use std::path::PathBuf;

use crate::movie::MovieMode;

pub type Result<T, E = MovieError> = std::result::Result<T, E>;

/// Errors produced by [`Movie`](crate::Movie) and
/// [`MovieSession`](crate::MovieSession)
#[derive(Debug, thiserror::Error)]
pub enum MovieError {
    /// Operation is not legal in the movie's current mode.
    ///
    /// Indicates an integration bug rather than bad user input.
    #[error("cannot {operation} while the movie is {mode}")]
    InvalidTransition {
        operation: &'static str,
        mode: MovieMode,
    },

    /// Read or overwrite past the end of the input log
    #[error("frame {index} is outside the input log ({frame_count} frames)")]
    FrameOutOfRange { index: u64, frame_count: u64 },

    /// A savestate load was refused; the live movie is unchanged
    #[error("savestate rejected: {0}")]
    TimelineRejected(RejectReason),

    /// Writing the movie file failed; in-memory state is still valid
    #[error("failed to write movie to {}: {source}", path.display())]
    PersistenceFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A movie file could not be decoded
    #[error("invalid movie file {}: {source}", path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Why a savestate load was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    /// The user declined to load a savestate from a different movie
    #[error("the savestate belongs to a different movie")]
    IdentityDeclined,

    /// Identities still differed after the re-check
    #[error("the savestate GUID does not match the current movie")]
    IdentityMismatch,

    /// The savestate's input log diverges from the movie
    #[error("the savestate input log diverges from the movie at frame {frame}")]
    ContentMismatch { frame: u64 },

    /// The embedded movie block could not be read
    #[error("the savestate movie block is unreadable: {0}")]
    Unreadable(String),

    /// No reconciliation rule covers this combination
    #[error("no reconciliation rule for a {mode} movie (read-only: {read_only})")]
    Unsupported { mode: MovieMode, read_only: bool },
}

impl MovieError {
    pub(crate) fn invalid(operation: &'static str, mode: MovieMode) -> Self {
        Self::InvalidTransition { operation, mode }
    }

    /// Whether this is a refused savestate load
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::TimelineRejected(_))
    }
}
