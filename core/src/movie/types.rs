//! Core types for the movie engine
//!
//! These are shared by the in-memory [`Movie`](super::Movie), the `.tasm`
//! binary format and the savestate movie block.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use uuid::Uuid;
use xxhash_rust::xxh3::Xxh3;

/// Raw controller bytes for one player on one frame.
///
/// Inline storage covers the common 1-8 byte controller layouts without a heap
/// allocation per player per frame.
pub type PlayerInput = SmallVec<[u8; 8]>;

/// Shape of every frame in a movie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputLayout {
    /// Number of player slots
    pub player_count: u8,
    /// Bytes per player per frame
    pub input_size: u8,
}

impl Default for InputLayout {
    fn default() -> Self {
        Self {
            player_count: 1,
            input_size: 8,
        }
    }
}

impl InputLayout {
    pub fn new(player_count: u8, input_size: u8) -> Self {
        Self {
            player_count,
            input_size,
        }
    }

    /// Bytes occupied by one frame of input for all players
    pub fn frame_size(&self) -> usize {
        self.player_count as usize * self.input_size as usize
    }
}

/// One frame of controller input for every player slot
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputFrame {
    players: Vec<PlayerInput>,
}

impl InputFrame {
    /// A frame with every button released
    pub fn neutral(layout: InputLayout) -> Self {
        Self {
            players: (0..layout.player_count)
                .map(|_| SmallVec::from_elem(0, layout.input_size as usize))
                .collect(),
        }
    }

    pub fn from_players<I, P>(players: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[u8]>,
    {
        Self {
            players: players
                .into_iter()
                .map(|p| SmallVec::from_slice(p.as_ref()))
                .collect(),
        }
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn player(&self, slot: usize) -> Option<&[u8]> {
        self.players.get(slot).map(|p| p.as_slice())
    }

    pub fn players(&self) -> impl Iterator<Item = &[u8]> {
        self.players.iter().map(|p| p.as_slice())
    }

    /// Replace one player's bytes. Slots outside the frame are ignored.
    pub fn set_player(&mut self, slot: usize, input: &[u8]) {
        if let Some(player) = self.players.get_mut(slot) {
            let len = player.len();
            player.clear();
            player.extend(input.iter().copied().take(len));
            player.resize(len, 0);
        }
    }

    /// True when no player presses anything
    pub fn is_neutral(&self) -> bool {
        self.players.iter().all(|p| p.iter().all(|&b| b == 0))
    }

    /// Whether this frame has exactly the given shape
    pub fn matches_layout(&self, layout: InputLayout) -> bool {
        self.players.len() == layout.player_count as usize
            && self
                .players
                .iter()
                .all(|p| p.len() == layout.input_size as usize)
    }

    /// Copy this frame into the given shape, padding missing bytes and
    /// players with zeroes and dropping extras.
    pub fn conformed(&self, layout: InputLayout) -> Self {
        let mut out = Self::neutral(layout);
        for (slot, input) in self.players.iter().enumerate() {
            out.set_player(slot, input);
        }
        out
    }
}

/// Ordered input log, indexed by frame
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputLog {
    frames: Vec<InputFrame>,
}

impl InputLog {
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Append a frame at the end of the log
    pub fn push_frame(&mut self, frame: InputFrame) {
        self.frames.push(frame);
    }

    /// Get the input for a specific frame
    pub fn get_frame(&self, frame: u64) -> Option<&InputFrame> {
        self.frames.get(frame as usize)
    }

    /// Replace an existing frame. Returns false if `frame` is past the end.
    pub fn set_frame(&mut self, frame: u64, input: InputFrame) -> bool {
        match self.frames.get_mut(frame as usize) {
            Some(slot) => {
                *slot = input;
                true
            }
            None => false,
        }
    }

    /// Drop every frame from `len` onwards
    pub fn truncate(&mut self, len: u64) {
        self.frames.truncate(len as usize);
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Get the total number of frames
    pub fn frame_count(&self) -> u64 {
        self.frames.len() as u64
    }

    pub fn iter(&self) -> impl Iterator<Item = &InputFrame> {
        self.frames.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// First index below `upto` where the two logs differ.
    ///
    /// Only frames present in both logs are compared.
    pub fn first_divergence(&self, other: &InputLog, upto: u64) -> Option<u64> {
        self.frames
            .iter()
            .zip(other.frames.iter())
            .take(upto as usize)
            .position(|(a, b)| a != b)
            .map(|i| i as u64)
    }

    /// xxh3 checksum over every input byte, in frame order
    pub fn checksum(&self) -> u64 {
        let mut hasher = Xxh3::new();
        for frame in &self.frames {
            for player in frame.players() {
                hasher.update(player);
            }
        }
        hasher.digest()
    }
}

impl FromIterator<InputFrame> for InputLog {
    fn from_iter<T: IntoIterator<Item = InputFrame>>(iter: T) -> Self {
        Self {
            frames: iter.into_iter().collect(),
        }
    }
}

/// Globally unique movie identity, assigned when a recording starts.
///
/// Savestates carry the identity of the movie they were taken from so that
/// loading a state from a different recording can be detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MovieId(Uuid);

impl MovieId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Lifecycle mode of a movie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MovieMode {
    #[default]
    Inactive,
    Recording,
    Playing,
    Finished,
}

impl MovieMode {
    pub fn is_active(self) -> bool {
        self != MovieMode::Inactive
    }
}

impl fmt::Display for MovieMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MovieMode::Inactive => "inactive",
            MovieMode::Recording => "recording",
            MovieMode::Playing => "playing",
            MovieMode::Finished => "finished",
        };
        f.write_str(name)
    }
}

bitflags::bitflags! {
    /// Movie file feature flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MovieFlags: u8 {
        /// Input stream is delta + LZ4 compressed
        const COMPRESSED_INPUTS = 0b0000_0001;
        /// File carries a JSON metadata block
        const HAS_METADATA = 0b0000_0010;
    }
}

impl Serialize for MovieFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MovieFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u8::deserialize(deserializer)?;
        Ok(MovieFlags::from_bits_truncate(bits))
    }
}

/// Free-form descriptive metadata stored alongside the input log
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieMetadata {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub author: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub game_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub platform: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub emulator_version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
}

impl MovieMetadata {
    pub fn is_empty(&self) -> bool {
        self == &MovieMetadata::default()
    }
}

/// Header of a `.tasm` movie file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieHeader {
    pub layout: InputLayout,
    pub flags: MovieFlags,
    pub id: MovieId,
    /// Number of savestate loads that rewrote the log
    pub rerecord_count: u32,
    /// Total number of frames
    pub frame_count: u64,
}

impl Default for MovieHeader {
    fn default() -> Self {
        Self {
            layout: InputLayout::default(),
            flags: MovieFlags::COMPRESSED_INPUTS,
            id: MovieId::nil(),
            rerecord_count: 0,
            frame_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_log_basic() {
        let mut log = InputLog::new();
        log.push_frame(InputFrame::from_players([[0x0Fu8], [0xF0]]));
        log.push_frame(InputFrame::from_players([[0x1Fu8], [0xE0]]));

        assert_eq!(log.frame_count(), 2);
        assert_eq!(
            log.get_frame(1),
            Some(&InputFrame::from_players([[0x1Fu8], [0xE0]]))
        );
        assert_eq!(log.get_frame(2), None);

        assert!(log.set_frame(0, InputFrame::from_players([[0x00u8], [0x00]])));
        assert!(!log.set_frame(5, InputFrame::default()));
        assert!(log.get_frame(0).unwrap().is_neutral());
    }

    #[test]
    fn test_first_divergence() {
        let a: InputLog = (0..10u8).map(|i| InputFrame::from_players([[i]])).collect();
        let mut b = a.clone();
        assert_eq!(a.first_divergence(&b, 10), None);

        b.set_frame(6, InputFrame::from_players([[0xFFu8]]));
        assert_eq!(a.first_divergence(&b, 10), Some(6));
        // Divergence beyond the compared range is ignored
        assert_eq!(a.first_divergence(&b, 6), None);

        // Only the shared prefix is compared
        b.truncate(3);
        assert_eq!(a.first_divergence(&b, 10), None);
    }

    #[test]
    fn test_input_frame_conformed() {
        let layout = InputLayout::new(3, 2);
        let frame = InputFrame::from_players([vec![1u8, 2, 3], vec![4]]).conformed(layout);

        assert!(frame.matches_layout(layout));
        assert_eq!(frame.player(0), Some(&[1, 2][..]));
        assert_eq!(frame.player(1), Some(&[4, 0][..]));
        assert_eq!(frame.player(2), Some(&[0, 0][..]));
    }

    #[test]
    fn test_neutral_frame() {
        let frame = InputFrame::neutral(InputLayout::new(2, 4));
        assert!(frame.is_neutral());
        assert_eq!(frame.player_count(), 2);
        assert!(!InputFrame::from_players([[0u8, 1]]).is_neutral());
    }

    #[test]
    fn test_checksum_deterministic() {
        let a: InputLog = (0..32u8).map(|i| InputFrame::from_players([[i, i]])).collect();
        let b = a.clone();
        assert_eq!(a.checksum(), b.checksum());

        let c: InputLog = (1..33u8).map(|i| InputFrame::from_players([[i, i]])).collect();
        assert_ne!(a.checksum(), c.checksum());
    }

    #[test]
    fn test_movie_flags() {
        let flags = MovieFlags::COMPRESSED_INPUTS | MovieFlags::HAS_METADATA;
        assert!(flags.contains(MovieFlags::COMPRESSED_INPUTS));
        assert_eq!(flags.bits(), 0b11);
    }

    #[test]
    fn test_movie_id_unique() {
        assert_ne!(MovieId::generate(), MovieId::generate());
        let id = MovieId::generate();
        assert_eq!(MovieId::from_bytes(*id.as_bytes()), id);
    }
}
