//! Movie session management
//!
//! [`MovieSession`] sits between the frame loop and a [`Movie`](crate::Movie):
//! it dispatches input every frame and reconciles savestate loads.

mod dispatch;
mod reconcile;
mod session;
mod types;


pub use session::MovieSession;
pub use types::{
    ConfirmCallback, EmulatorCore, FrameControls, FrameDispatch, InputSource, MessageCallback,
};
