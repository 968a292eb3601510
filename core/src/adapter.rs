//! Controller adapter
//!
//! Holds the merged controller frame handed to the emulation core. Each frame
//! it is driven from exactly one authoritative source: the live controller or
//! the movie log.

use crate::movie::{InputFrame, InputLayout};
use crate::multitrack::PlayerTargets;

/// Where the adapter's current frame came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSource {
    Live,
    Log,
}

#[derive(Debug, Clone)]
pub struct ControllerAdapter {
    layout: InputLayout,
    frame: InputFrame,
    source: FrameSource,
}

impl ControllerAdapter {
    pub fn new(layout: InputLayout) -> Self {
        Self {
            layout,
            frame: InputFrame::neutral(layout),
            source: FrameSource::Live,
        }
    }

    /// Drive every slot from the live source
    pub fn latch_from_live(&mut self, live: &InputFrame) {
        self.frame = live.conformed(self.layout);
        self.source = FrameSource::Live;
    }

    /// Drive every slot from a logged frame
    pub fn latch_from_log(&mut self, logged: &InputFrame) {
        self.frame = logged.conformed(self.layout);
        self.source = FrameSource::Log;
    }

    /// Route live input to the targeted slots; other slots keep their value
    pub fn latch_routed(&mut self, live: &InputFrame, targets: PlayerTargets) {
        let first = live.player(0).unwrap_or(&[]);
        match targets {
            PlayerTargets::Passthrough => {
                self.latch_from_live(live);
                return;
            }
            PlayerTargets::Player(slot) => self.frame.set_player(slot, first),
            PlayerTargets::All => {
                for slot in 0..self.frame.player_count() {
                    self.frame.set_player(slot, first);
                }
            }
        }
        self.source = FrameSource::Live;
    }

    pub fn frame(&self) -> &InputFrame {
        &self.frame
    }

    pub fn source(&self) -> FrameSource {
        self.source
    }

    pub fn layout(&self) -> InputLayout {
        self.layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> InputLayout {
        InputLayout::new(4, 1)
    }

    #[test]
    fn test_latch_sources() {
        let mut adapter = ControllerAdapter::new(layout());
        assert!(adapter.frame().is_neutral());

        adapter.latch_from_log(&InputFrame::from_players([[1u8], [2], [3], [4]]));
        assert_eq!(adapter.source(), FrameSource::Log);
        assert_eq!(adapter.frame().player(3), Some(&[4u8][..]));

        // Short live frames are padded to the layout
        adapter.latch_from_live(&InputFrame::from_players([[9u8]]));
        assert_eq!(adapter.source(), FrameSource::Live);
        assert_eq!(adapter.frame().player(0), Some(&[9u8][..]));
        assert_eq!(adapter.frame().player(3), Some(&[0u8][..]));
    }

    #[test]
    fn test_routed_single_player() {
        let mut adapter = ControllerAdapter::new(layout());
        adapter.latch_from_log(&InputFrame::from_players([[1u8], [2], [3], [4]]));

        adapter.latch_routed(&InputFrame::from_players([[0x80u8]]), PlayerTargets::Player(2));
        assert_eq!(
            adapter.frame(),
            &InputFrame::from_players([[1u8], [2], [0x80], [4]])
        );
        assert_eq!(adapter.source(), FrameSource::Live);
    }

    #[test]
    fn test_routed_all_players() {
        let mut adapter = ControllerAdapter::new(layout());
        adapter.latch_routed(&InputFrame::from_players([[0x11u8], [0x22]]), PlayerTargets::All);
        assert!(adapter.frame().players().all(|p| p == [0x11u8]));
    }

    #[test]
    fn test_routed_out_of_range_slot_is_ignored() {
        let mut adapter = ControllerAdapter::new(layout());
        adapter.latch_routed(&InputFrame::from_players([[0x11u8]]), PlayerTargets::Player(9));
        assert!(adapter.frame().is_neutral());
    }
}
