//! Multitrack recording
//!
//! Lets a single physical controller record each logical player of a movie
//! in separate passes. While active, the live source's first controller is
//! routed to the selected player slot (or to every slot) and the other slots
//! keep their existing input.

use std::fmt;

/// Which player slots the live source drives this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerTargets {
    /// Live input maps 1:1 onto the player slots
    Passthrough,
    /// The live source's first controller drives a single slot
    Player(usize),
    /// The live source's first controller drives every slot
    All,
}

/// Per-session multitrack selection. Never written into the movie.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultitrackRecording {
    active: bool,
    current_player: usize,
    record_all: bool,
}

impl MultitrackRecording {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Zero-based slot the live source targets
    pub fn current_player(&self) -> usize {
        self.current_player
    }

    pub fn records_all_players(&self) -> bool {
        self.record_all
    }

    /// Target a single player slot
    pub fn select_player(&mut self, slot: usize) {
        self.current_player = slot;
        self.record_all = false;
    }

    /// Target every player slot at once
    pub fn select_all(&mut self) {
        self.record_all = true;
    }

    /// Move to the next slot, wrapping after the last player
    pub fn next_player(&mut self, player_count: usize) {
        if player_count == 0 {
            return;
        }
        self.current_player = (self.current_player + 1) % player_count;
        self.record_all = false;
    }

    /// Move to the previous slot, wrapping before the first player
    pub fn previous_player(&mut self, player_count: usize) {
        if player_count == 0 {
            return;
        }
        self.current_player = (self.current_player + player_count - 1) % player_count;
        self.record_all = false;
    }

    /// Routing for the current frame
    pub fn targets(&self) -> PlayerTargets {
        if !self.active {
            PlayerTargets::Passthrough
        } else if self.record_all {
            PlayerTargets::All
        } else {
            PlayerTargets::Player(self.current_player)
        }
    }
}

impl fmt::Display for MultitrackRecording {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.targets() {
            PlayerTargets::Passthrough => write!(f, "Multitrack off"),
            PlayerTargets::All => write!(f, "Recording all players"),
            PlayerTargets::Player(slot) => write!(f, "Recording player {}", slot + 1),
        }
    }
}
