//! Signal collectors. Each one turns raw environment notifications into at
//! most one [`Detection`]; none of them touch the ledger directly.

pub mod clipboard;
pub mod focus;
pub mod fullscreen;

use crate::models::ProctorEventType;

pub use clipboard::{ClipboardGuard, ClipboardTally};
pub use focus::{FocusDetector, TAB_SWITCH_REASON, WINDOW_BLUR_REASON};
pub use fullscreen::{FullscreenDetector, FullscreenState, EXITED_FULLSCREEN_REASON};

/// A violation a detector wants recorded, plus how to report it.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub reason: &'static str,
    pub event_type: ProctorEventType,
    pub confidence: f64,
}
