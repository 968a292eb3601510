//! Shared test utilities for unit tests

use std::collections::VecDeque;

use crate::movie::{InputFrame, InputLayout};
use crate::session::{EmulatorCore, InputSource};

// ============================================================================
// Test Core Implementation
// ============================================================================

/// Emulation core stand-in with a manually driven frame counter
#[derive(Debug, Default)]
pub struct TestCore {
    pub frame: u64,
    pub save_ram_clears: u32,
    /// Set to `false` to simulate a core that is not primed for input
    pub ready: bool,
    /// Every frame handed to the core, in order
    pub latched: Vec<InputFrame>,
}

impl TestCore {
    pub fn new() -> Self {
        Self {
            ready: true,
            ..Default::default()
        }
    }

    pub fn at_frame(frame: u64) -> Self {
        Self {
            frame,
            ..Self::new()
        }
    }

    /// Emulate one frame
    pub fn step(&mut self) {
        self.frame += 1;
    }

    pub fn last_latched(&self) -> Option<&InputFrame> {
        self.latched.last()
    }
}

impl EmulatorCore for TestCore {
    fn frame(&self) -> u64 {
        self.frame
    }

    fn clear_save_ram(&mut self) {
        self.save_ram_clears += 1;
    }

    fn accepts_input(&self) -> bool {
        self.ready
    }

    fn latch_input(&mut self, frame: &InputFrame) {
        self.latched.push(frame.clone());
    }
}

// ============================================================================
// Scripted Input
// ============================================================================

/// Live input that replays a queue of frames, then neutral input
#[derive(Debug)]
pub struct ScriptedInput {
    layout: InputLayout,
    frames: VecDeque<InputFrame>,
    pub samples: u32,
}

impl ScriptedInput {
    pub fn new(layout: InputLayout) -> Self {
        Self {
            layout,
            frames: VecDeque::new(),
            samples: 0,
        }
    }

    /// Single-byte-per-player script: one value per frame for player 1
    pub fn bytes(layout: InputLayout, values: impl IntoIterator<Item = u8>) -> Self {
        let mut input = Self::new(layout);
        for value in values {
            input.push(InputFrame::from_players([[value]]).conformed(layout));
        }
        input
    }

    pub fn push(&mut self, frame: InputFrame) {
        self.frames.push_back(frame);
    }
}

impl InputSource for ScriptedInput {
    fn sample(&mut self) -> InputFrame {
        self.samples += 1;
        self.frames
            .pop_front()
            .unwrap_or_else(|| InputFrame::neutral(self.layout))
    }
}

/// One-byte player frame
pub fn frame(value: u8) -> InputFrame {
    InputFrame::from_players([[value]])
}
