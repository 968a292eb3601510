//! Collaborator traits and per-frame report types for movie sessions

use crate::movie::InputFrame;

// ============================================================================
// Collaborators
// ============================================================================

/// The emulation core a session drives.
///
/// The session only reads the frame counter; advancing and rewinding it is
/// the core's business.
pub trait EmulatorCore {
    /// Index of the frame about to be emulated
    fn frame(&self) -> u64;

    /// Wipe battery-backed memory before a recording restarts from a state
    fn clear_save_ram(&mut self);

    /// Whether the core is primed to take a latched frame this step
    fn accepts_input(&self) -> bool {
        true
    }

    /// Hand the merged controller frame to the core
    fn latch_input(&mut self, frame: &InputFrame);
}

/// Live controller input (keyboard, gamepad, script)
pub trait InputSource {
    /// Sample the controllers for the current frame
    fn sample(&mut self) -> InputFrame;
}

impl<F: FnMut() -> InputFrame> InputSource for F {
    fn sample(&mut self) -> InputFrame {
        self()
    }
}

/// `(title, message) -> accepted`
pub type ConfirmCallback = Box<dyn FnMut(&str, &str) -> bool>;

/// Best-effort status messages
pub type MessageCallback = Box<dyn FnMut(&str)>;

/// Hotkeys sampled alongside the controllers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameControls {
    /// Clear the logged input at the current frame during playback
    pub scrub: bool,
}

impl FrameControls {
    pub fn scrub() -> Self {
        Self { scrub: true }
    }
}

// ============================================================================
// Reports
// ============================================================================

/// How a frame was dispatched by [`MovieSession::on_frame`](super::MovieSession::on_frame)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameDispatch {
    /// No movie (or a finished one): live input only
    Live,
    /// Logged input was replayed
    Played { frame: u64 },
    /// Live input overwrote the logged frame (editor or poke mode)
    Overdubbed { frame: u64 },
    /// The logged frame was cleared and live input used instead
    Scrubbed { frame: u64 },
    /// Editor mode appended live input past the end of the log
    Extended { frame: u64 },
    /// Live input was captured into the log
    Recorded { frame: u64 },
    /// Playback ran out of log on this frame; live input used
    Finished { frame: u64 },
}
