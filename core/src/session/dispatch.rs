//! Per-frame input dispatch
//!
//! Called once before every emulated frame. Decides which source drives the
//! controller adapter and how the movie log changes, based on the movie's
//! mode and the core's frame counter.

use crate::error::Result;
use crate::movie::MovieMode;
use crate::multitrack::PlayerTargets;

use super::MovieSession;
use super::types::{EmulatorCore, FrameControls, FrameDispatch, InputSource};

impl MovieSession {
    /// Drive the adapter for the frame the core is about to emulate, then
    /// latch the merged frame into the core if it is ready for input.
    pub fn on_frame(
        &mut self,
        core: &mut impl EmulatorCore,
        input: &mut impl InputSource,
        controls: FrameControls,
    ) -> Result<FrameDispatch> {
        let frame = core.frame();

        let dispatch = match self.movie.mode() {
            MovieMode::Inactive => {
                self.adapter.latch_from_live(&input.sample());
                FrameDispatch::Live
            }
            MovieMode::Finished if frame < self.movie.frame_count() => {
                // Rewound back into the movie
                tracing::debug!("Frame {frame} is inside the finished movie, resuming playback");
                self.movie.switch_to_play()?;
                self.play_frame(frame, input, controls)?
            }
            MovieMode::Finished => {
                self.adapter.latch_from_live(&input.sample());
                FrameDispatch::Live
            }
            MovieMode::Playing => self.play_frame(frame, input, controls)?,
            MovieMode::Recording => self.record_frame(frame, input)?,
        };

        if core.accepts_input() {
            core.latch_input(self.adapter.frame());
        }
        Ok(dispatch)
    }

    fn play_frame(
        &mut self,
        frame: u64,
        input: &mut impl InputSource,
        controls: FrameControls,
    ) -> Result<FrameDispatch> {
        self.movie.seek(frame)?;

        if frame >= self.movie.frame_count() {
            let live = input.sample();
            self.adapter.latch_from_live(&live);

            if self.editor_mode {
                self.movie.extend_frame(self.adapter.frame().clone())?;
                return Ok(FrameDispatch::Extended { frame });
            }

            self.movie.finish()?;
            return Ok(FrameDispatch::Finished { frame });
        }

        let dispatch = if controls.scrub {
            self.adapter.latch_from_live(&input.sample());
            self.movie.clear_frame(frame)?;
            self.output(&format!("Scrubbed input at frame {frame}"));
            FrameDispatch::Scrubbed { frame }
        } else if self.editor_mode || self.is_poke_mode() {
            let live = input.sample();
            if live.is_neutral() {
                self.adapter.latch_from_log(self.movie.read_frame(frame)?);
                FrameDispatch::Played { frame }
            } else {
                self.adapter.latch_from_live(&live);
                self.movie
                    .overwrite_frame(frame, self.adapter.frame().clone())?;
                FrameDispatch::Overdubbed { frame }
            }
        } else {
            self.adapter.latch_from_log(self.movie.read_frame(frame)?);
            FrameDispatch::Played { frame }
        };

        self.movie.advance_cursor()?;
        Ok(dispatch)
    }

    fn record_frame(&mut self, frame: u64, input: &mut impl InputSource) -> Result<FrameDispatch> {
        let live = input.sample();

        match self.multitrack.targets() {
            PlayerTargets::Passthrough => self.adapter.latch_from_live(&live),
            targets => {
                // Re-recording over an existing entry keeps the other players' input
                if let Some(logged) = self.movie.log().get_frame(frame) {
                    self.adapter.latch_from_log(logged);
                }
                self.adapter.latch_routed(&live, targets);
            }
        }

        self.movie.seek(frame)?;
        self.movie.capture_frame(self.adapter.frame().clone())?;
        Ok(FrameDispatch::Recorded { frame })
    }
}
