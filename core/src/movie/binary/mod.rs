//! Binary movie format (.tasm)
//!
//! # File Structure
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │ Header (36 bytes)                              │
//! │  ├─ magic: "TASM"                              │
//! │  ├─ player_count: u8                           │
//! │  ├─ input_size: u8                             │
//! │  ├─ flags: u8                                  │
//! │  ├─ reserved: u8                               │
//! │  ├─ identity: [u8; 16]                         │
//! │  ├─ rerecord_count: u32                        │
//! │  └─ frame_count: u64                           │
//! ├────────────────────────────────────────────────┤
//! │ Input Stream (delta + LZ4 if flagged)          │
//! ├────────────────────────────────────────────────┤
//! │ Metadata (if flagged, JSON)                    │
//! └────────────────────────────────────────────────┘
//! ```
//!
//! All integers are little-endian. The input stream layout is shared with the
//! savestate movie block (see [`super::savestate`]).

mod reader;
mod writer;

pub use reader::BinaryReader;
pub use writer::BinaryWriter;

/// Magic bytes at the start of every movie file
pub const MOVIE_MAGIC: [u8; 4] = *b"TASM";

/// Size of the fixed movie header in bytes
pub const HEADER_SIZE: usize = 36;
