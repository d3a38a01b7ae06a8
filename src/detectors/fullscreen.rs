use serde::{Deserialize, Serialize};

use crate::{environment::FullscreenVendor, models::ProctorEventType};

use super::Detection;

const ENABLE_LOGS: bool = true;
const LOG_TARGET: &str = "proctor::fullscreen";

use crate::log_debug;

pub const EXITED_FULLSCREEN_REASON: &str = "Exited Fullscreen";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FullscreenState {
    Fullscreen,
    NotFullscreen,
}

impl Default for FullscreenState {
    fn default() -> Self {
        FullscreenState::Fullscreen
    }
}

/// Mirrors the platform fullscreen state and flags every exit.
///
/// Browsers may fire several vendor-prefixed notifications for one
/// transition; only a change of state counts.
#[derive(Debug, Default)]
pub struct FullscreenDetector {
    state: FullscreenState,
}

impl FullscreenDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> FullscreenState {
        self.state
    }

    pub fn is_fullscreen(&self) -> bool {
        self.state == FullscreenState::Fullscreen
    }

    /// The overlay that blocks the exam until fullscreen is restored.
    pub fn blocker_visible(&self, armed: bool) -> bool {
        armed && !self.is_fullscreen()
    }

    pub fn observe(
        &mut self,
        is_fullscreen: bool,
        vendor: FullscreenVendor,
        armed: bool,
    ) -> Option<Detection> {
        let next = if is_fullscreen {
            FullscreenState::Fullscreen
        } else {
            FullscreenState::NotFullscreen
        };
        if next == self.state {
            return None;
        }
        self.state = next;
        log_debug!("fullscreen state {:?} ({:?} notification)", next, vendor);

        (next == FullscreenState::NotFullscreen && armed).then(|| Detection {
            reason: EXITED_FULLSCREEN_REASON,
            event_type: ProctorEventType::ViolationWarning,
            confidence: 1.0,
        })
    }
}
