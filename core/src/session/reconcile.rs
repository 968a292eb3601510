//! Savestate-load reconciliation
//!
//! Loading a savestate while a movie is active has to square the savestate's
//! embedded log with the live one. Which check runs and what happens on
//! success depends only on the movie mode and the read-only flag:
//!
//! | Mode      | Read-only | Check         | On success                          |
//! |-----------|-----------|---------------|-------------------------------------|
//! | Recording | yes       | strict        | write movie, play from the state    |
//! | Recording | no        | identity only | adopt the state's log               |
//! | Playing   | yes       | strict        | continue playback                   |
//! | Playing   | no        | identity only | switch to recording, adopt          |
//! | Finished  | yes       | strict        | play if inside the log, else live   |
//! | Finished  | no        | identity only | clear save RAM, record, adopt       |
//!
//! Nothing is mutated until the check (and any prompt) has passed, so a
//! rejected load leaves the session exactly as it was.

use std::io::{Read, Seek};

use crate::error::{MovieError, RejectReason, Result};
use crate::movie::{MovieMode, SavestateLog};
use crate::timeline::{CheckPolicy, TimelineVerdict, check_timeline};

use super::MovieSession;
use super::types::{EmulatorCore, InputSource};

const GUID_MISMATCH_TITLE: &str = "GUID Mismatch error";
const GUID_MISMATCH_MESSAGE: &str =
    "The savestate GUID does not match the current movie.  Proceed anyway?";

/// What to do once a savestate has passed its check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reconcile {
    /// Persist the live log, then play from the savestate frame
    PersistAndPlay,
    /// Keep recording on top of the savestate's log
    AdoptInPlace,
    /// Nothing to change; the core's frame counter drives playback
    Continue,
    /// Switch to recording on top of the savestate's log
    RecordFromState,
    /// Play again if the state is inside the log, otherwise stay live
    ResumeOrLive,
    /// Clear save RAM and record on top of the savestate's log
    RestartRecording,
}

impl Reconcile {
    /// Whether the action replaces the live log with the savestate's
    fn adopts(self) -> bool {
        matches!(
            self,
            Reconcile::AdoptInPlace | Reconcile::RecordFromState | Reconcile::RestartRecording
        )
    }
}

const RULES: &[(MovieMode, bool, CheckPolicy, Reconcile)] = &[
    (MovieMode::Recording, true, CheckPolicy::STRICT, Reconcile::PersistAndPlay),
    (MovieMode::Recording, false, CheckPolicy::IDENTITY_ONLY, Reconcile::AdoptInPlace),
    (MovieMode::Playing, true, CheckPolicy::STRICT, Reconcile::Continue),
    (MovieMode::Playing, false, CheckPolicy::IDENTITY_ONLY, Reconcile::RecordFromState),
    (MovieMode::Finished, true, CheckPolicy::STRICT, Reconcile::ResumeOrLive),
    (MovieMode::Finished, false, CheckPolicy::IDENTITY_ONLY, Reconcile::RestartRecording),
];

fn rule_for(mode: MovieMode, read_only: bool) -> Option<(CheckPolicy, Reconcile)> {
    RULES
        .iter()
        .find(|(m, ro, _, _)| *m == mode && *ro == read_only)
        .map(|&(_, _, policy, action)| (policy, action))
}

fn reject(reason: RejectReason) -> MovieError {
    tracing::warn!("Savestate rejected: {reason}");
    MovieError::TimelineRejected(reason)
}

impl MovieSession {
    /// Reconcile a savestate the core is about to load.
    ///
    /// `reader` is the savestate stream with the movie block at `offset`;
    /// its position is restored before returning so the core can read the
    /// rest. `input` is only sampled when a finished movie resumes live.
    ///
    /// With no active movie the savestate is accepted unconditionally.
    pub fn load_state<R: Read + Seek>(
        &mut self,
        reader: &mut R,
        offset: u64,
        core: &mut impl EmulatorCore,
        input: &mut impl InputSource,
    ) -> Result<()> {
        let mode = self.movie.mode();
        if !mode.is_active() {
            return Ok(());
        }

        let Some((policy, action)) = rule_for(mode, self.read_only) else {
            return Err(reject(RejectReason::Unsupported {
                mode,
                read_only: self.read_only,
            }));
        };

        let candidate = SavestateLog::read_at(reader, offset)
            .map_err(|e| reject(RejectReason::Unreadable(e.to_string())))?;

        self.verify(&candidate, policy)?;
        if action.adopts() {
            self.check_adoptable(&candidate)?;
        }
        tracing::debug!(
            "Savestate at frame {} accepted ({mode}, read-only: {}): {action:?}",
            candidate.frame,
            self.read_only
        );
        self.apply(action, &candidate, core, input)
    }

    /// Run the check, prompting once on an identity mismatch
    fn verify(&mut self, candidate: &SavestateLog, policy: CheckPolicy) -> Result<()> {
        let mut verdict = check_timeline(candidate, &self.movie, policy);

        if verdict == TimelineVerdict::IdentityMismatch {
            if !self.ask_yes_no(GUID_MISMATCH_TITLE, GUID_MISMATCH_MESSAGE) {
                return Err(reject(RejectReason::IdentityDeclined));
            }
            verdict = check_timeline(candidate, &self.movie, policy.ignoring_identity());
        }

        match verdict {
            TimelineVerdict::Consistent => Ok(()),
            TimelineVerdict::IdentityMismatch => Err(reject(RejectReason::IdentityMismatch)),
            TimelineVerdict::ContentMismatch { frame } => {
                Err(reject(RejectReason::ContentMismatch { frame }))
            }
        }
    }

    /// Recording resumes at `candidate.frame`, which must not lie past the
    /// end of the log being adopted
    fn check_adoptable(&self, candidate: &SavestateLog) -> Result<()> {
        let candidate_len = candidate.log.frame_count();
        let adopted_len = if self.multitrack.is_active() {
            candidate_len.max(self.movie.frame_count())
        } else {
            candidate_len
        };

        if candidate.frame > adopted_len {
            return Err(reject(RejectReason::ContentMismatch {
                frame: adopted_len,
            }));
        }
        Ok(())
    }

    fn apply(
        &mut self,
        action: Reconcile,
        candidate: &SavestateLog,
        core: &mut impl EmulatorCore,
        input: &mut impl InputSource,
    ) -> Result<()> {
        let keep_tail = self.multitrack.is_active();

        match action {
            Reconcile::PersistAndPlay => {
                // The live log matches over the savestate's range and may run
                // past it, so it stays authoritative
                self.movie.save()?;
                self.movie.switch_to_play()?;
                self.movie.seek(candidate.frame)?;
            }
            Reconcile::AdoptInPlace => {
                self.movie.adopt(candidate, keep_tail)?;
            }
            Reconcile::Continue => {
                self.movie.seek(candidate.frame)?;
            }
            Reconcile::RecordFromState => {
                self.movie.switch_to_record()?;
                self.movie.adopt(candidate, keep_tail)?;
            }
            Reconcile::ResumeOrLive => {
                if candidate.frame < self.movie.frame_count() {
                    self.movie.switch_to_play()?;
                    self.movie.seek(candidate.frame)?;
                } else {
                    self.adapter.latch_from_live(&input.sample());
                }
            }
            Reconcile::RestartRecording => {
                core.clear_save_ram();
                self.movie.switch_to_record()?;
                self.movie.adopt(candidate, keep_tail)?;
            }
        }

        Ok(())
    }
}
