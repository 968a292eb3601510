//! Movies: frame-indexed input logs with identity and lifecycle mode
//!
//! - [`Movie`] owns the log and its mode (inactive, recording, playing,
//!   finished)
//! - [`binary`] reads and writes `.tasm` files
//! - [`savestate`] embeds the log into emulator savestates

pub mod binary;
pub mod savestate;
mod state;
pub mod types;

pub use binary::{BinaryReader, BinaryWriter};
pub use savestate::SavestateLog;
pub use state::Movie;
pub use types::{
    InputFrame, InputLayout, InputLog, MovieFlags, MovieHeader, MovieId, MovieMetadata, MovieMode,
    PlayerInput,
};
