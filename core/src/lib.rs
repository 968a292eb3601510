//! Tasreel Core - Deterministic movie recording and playback
//!
//! Records the controller input fed to a frame-stepped emulator, replays it
//! bit-exactly, and keeps the movie consistent with savestates loaded while
//! recording or playing.
//!
//! # Architecture
//!
//! - [`Movie`] - Input log, identity and lifecycle mode; `.tasm` persistence
//! - [`MovieSession`] - Per-frame dispatch and savestate reconciliation
//! - [`check_timeline`] - Compares a savestate's embedded log with the movie
//! - [`MultitrackRecording`] - Routes one controller onto a chosen player
//! - [`ControllerAdapter`] - The merged frame handed to the emulation core

pub mod adapter;
pub mod config;
pub mod error;
pub mod movie;
pub mod multitrack;
pub mod session;
#[cfg(test)]
pub mod test_utils;
pub mod timeline;

// Re-export core types
pub use adapter::{ControllerAdapter, FrameSource};
pub use config::Config;
pub use error::{MovieError, RejectReason, Result};
pub use movie::{
    InputFrame, InputLayout, InputLog, Movie, MovieFlags, MovieHeader, MovieId, MovieMetadata,
    MovieMode, SavestateLog,
};
pub use multitrack::{MultitrackRecording, PlayerTargets};
pub use session::{EmulatorCore, FrameControls, FrameDispatch, InputSource, MovieSession};
pub use timeline::{CheckPolicy, TimelineVerdict, check_timeline};
