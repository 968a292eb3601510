//! Timeline consistency checks
//!
//! Classifies how a savestate's embedded movie block relates to the live
//! movie. The check is a pure function of its inputs: it never mutates either
//! log and always yields the same verdict for the same arguments.

use crate::movie::{Movie, SavestateLog};

/// Outcome of comparing a savestate against the live movie
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineVerdict {
    /// Same movie, and the logs agree up to the savestate's frame
    Consistent,
    /// The savestate was taken from a different movie
    IdentityMismatch,
    /// Same movie (or identity ignored) but the logs diverge at `frame`
    ContentMismatch { frame: u64 },
}

impl TimelineVerdict {
    pub fn is_consistent(self) -> bool {
        self == TimelineVerdict::Consistent
    }
}

/// What to compare
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckPolicy {
    /// Compare log contents up to the savestate's frame
    pub compare_content: bool,
    /// Treat an identity mismatch as acceptable
    pub ignore_identity: bool,
}

impl CheckPolicy {
    /// Identity and content
    pub const STRICT: Self = Self {
        compare_content: true,
        ignore_identity: false,
    };

    /// Identity only; the log is about to be rewritten anyway
    pub const IDENTITY_ONLY: Self = Self {
        compare_content: false,
        ignore_identity: false,
    };

    /// The same policy, after the user accepted a foreign savestate
    pub fn ignoring_identity(self) -> Self {
        Self {
            ignore_identity: true,
            ..self
        }
    }
}

/// Compare a savestate's movie block against the live movie.
///
/// Content is compared over every frame below `candidate.frame` that both
/// logs hold. A savestate whose log is shorter than its own frame index cannot
/// be reconciled and is reported as a content mismatch. So is one whose
/// controller layout differs from the movie's, under either policy.
pub fn check_timeline(candidate: &SavestateLog, live: &Movie, policy: CheckPolicy) -> TimelineVerdict {
    if !policy.ignore_identity && candidate.id != live.id() {
        return TimelineVerdict::IdentityMismatch;
    }

    // A log with a different controller layout can be neither compared nor adopted
    if candidate.layout != live.layout() {
        return TimelineVerdict::ContentMismatch { frame: 0 };
    }

    if !policy.compare_content {
        return TimelineVerdict::Consistent;
    }

    let candidate_len = candidate.log.frame_count();
    if candidate_len < candidate.frame {
        return TimelineVerdict::ContentMismatch {
            frame: candidate_len,
        };
    }

    match live.log().first_divergence(&candidate.log, candidate.frame) {
        Some(frame) => TimelineVerdict::ContentMismatch { frame },
        None => TimelineVerdict::Consistent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movie::{InputFrame, InputLayout};

    fn movie(frames: u8) -> Movie {
        let mut movie = Movie::detached(InputLayout::new(1, 1));
        movie.start_recording().unwrap();
        for i in 0..frames {
            movie.capture_frame(InputFrame::from_players([[i]])).unwrap();
        }
        movie
    }

    fn prefix(movie: &Movie, frame: u64) -> SavestateLog {
        let mut block = movie.to_savestate(frame);
        block.log.truncate(frame);
        block
    }

    #[test]
    fn test_prefix_is_consistent() {
        let live = movie(20);
        let candidate = prefix(&live, 12);
        assert_eq!(
            check_timeline(&candidate, &live, CheckPolicy::STRICT),
            TimelineVerdict::Consistent
        );
    }

    #[test]
    fn test_identity_mismatch_skips_content() {
        let live = movie(20);
        let other = movie(20);
        let candidate = prefix(&other, 5);

        assert_eq!(
            check_timeline(&candidate, &live, CheckPolicy::STRICT),
            TimelineVerdict::IdentityMismatch
        );
        assert_eq!(
            check_timeline(&candidate, &live, CheckPolicy::IDENTITY_ONLY),
            TimelineVerdict::IdentityMismatch
        );
        // Same inputs, identity ignored: content decides
        assert_eq!(
            check_timeline(&candidate, &live, CheckPolicy::STRICT.ignoring_identity()),
            TimelineVerdict::Consistent
        );
    }

    #[test]
    fn test_content_mismatch_reports_frame() {
        let live = movie(20);
        let mut candidate = prefix(&live, 10);
        candidate.log.set_frame(7, InputFrame::from_players([[0xFFu8]]));

        assert_eq!(
            check_timeline(&candidate, &live, CheckPolicy::STRICT),
            TimelineVerdict::ContentMismatch { frame: 7 }
        );
        // Relaxed check never looks at content
        assert_eq!(
            check_timeline(&candidate, &live, CheckPolicy::IDENTITY_ONLY),
            TimelineVerdict::Consistent
        );
    }

    #[test]
    fn test_divergence_after_savestate_frame_is_ignored() {
        let live = movie(20);
        let mut candidate = live.to_savestate(10);
        candidate.log.set_frame(15, InputFrame::from_players([[0xFFu8]]));

        assert_eq!(
            check_timeline(&candidate, &live, CheckPolicy::STRICT),
            TimelineVerdict::Consistent
        );
    }

    #[test]
    fn test_short_savestate_log() {
        let live = movie(20);
        let mut candidate = prefix(&live, 10);
        candidate.frame = 12;

        assert_eq!(
            check_timeline(&candidate, &live, CheckPolicy::STRICT),
            TimelineVerdict::ContentMismatch { frame: 10 }
        );
    }

    #[test]
    fn test_layout_mismatch() {
        let live = movie(4);
        let mut candidate = prefix(&live, 2);
        candidate.layout = InputLayout::new(2, 1);

        assert_eq!(
            check_timeline(&candidate, &live, CheckPolicy::STRICT),
            TimelineVerdict::ContentMismatch { frame: 0 }
        );
        assert_eq!(
            check_timeline(&candidate, &live, CheckPolicy::IDENTITY_ONLY),
            TimelineVerdict::ContentMismatch { frame: 0 }
        );
    }

    #[test]
    fn test_check_is_idempotent_and_pure() {
        let live = movie(30);
        let mut candidate = prefix(&live, 25);
        candidate.log.set_frame(20, InputFrame::from_players([[0xAAu8]]));
        let (live_before, candidate_before) = (live.log().clone(), candidate.clone());

        let first = check_timeline(&candidate, &live, CheckPolicy::STRICT);
        let second = check_timeline(&candidate, &live, CheckPolicy::STRICT);

        assert_eq!(first, second);
        assert_eq!(live.log(), &live_before);
        assert_eq!(candidate, candidate_before);
    }
}
