use std::sync::Arc;

use serde::Serialize;

use crate::environment::{ClipboardAction, ProctorEnvironment};

/// Tally of suppressed clipboard and context-menu attempts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipboardTally {
    pub context_menu: u32,
    pub copy: u32,
    pub paste: u32,
    pub cut: u32,
}

impl ClipboardTally {
    pub fn total(&self) -> u32 {
        self.context_menu + self.copy + self.paste + self.cut
    }
}

/// Holds clipboard suppression on for as long as it lives.
pub struct ClipboardGuard {
    env: Arc<dyn ProctorEnvironment>,
    tally: ClipboardTally,
    released: bool,
}

impl ClipboardGuard {
    pub fn engage(env: Arc<dyn ProctorEnvironment>) -> Self {
        env.set_clipboard_blocked(true);
        Self {
            env,
            tally: ClipboardTally::default(),
            released: false,
        }
    }

    pub fn record(&mut self, action: ClipboardAction) {
        let slot = match action {
            ClipboardAction::ContextMenu => &mut self.tally.context_menu,
            ClipboardAction::Copy => &mut self.tally.copy,
            ClipboardAction::Paste => &mut self.tally.paste,
            ClipboardAction::Cut => &mut self.tally.cut,
        };
        *slot = slot.saturating_add(1);
    }

    pub fn tally(&self) -> ClipboardTally {
        self.tally
    }

    pub fn release(&mut self) {
        if !self.released {
            self.env.set_clipboard_blocked(false);
            self.released = true;
        }
    }
}

impl Drop for ClipboardGuard {
    fn drop(&mut self) {
        self.release();
    }
}
