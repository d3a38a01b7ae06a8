use serde::{Deserialize, Serialize};

use crate::models::WarningEvent;

pub const STRIKE_LIMIT: u32 = 3;
pub const DISQUALIFY_REASON: &str = "Security violation limit reached.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "state")]
pub enum LedgerState {
    Active { count: u32 },
    Disqualified,
}

impl Default for LedgerState {
    fn default() -> Self {
        LedgerState::Active { count: 0 }
    }
}

impl LedgerState {
    pub fn from_count(count: u32) -> Self {
        if count >= STRIKE_LIMIT {
            LedgerState::Disqualified
        } else {
            LedgerState::Active { count }
        }
    }

    pub fn is_disqualified(&self) -> bool {
        matches!(self, LedgerState::Disqualified)
    }

    /// Strikes recorded so far; the terminal state counts as the limit.
    pub fn strikes(&self) -> u32 {
        match self {
            LedgerState::Active { count } => *count,
            LedgerState::Disqualified => STRIKE_LIMIT,
        }
    }
}

/// Result of one `record_violation` call.
#[derive(Debug, Clone, PartialEq)]
pub enum ViolationOutcome {
    Recorded(WarningEvent),
    /// This violation was the last strike.
    Disqualified(WarningEvent),
    /// The ledger was already terminal; nothing changed.
    Ignored,
}

impl ViolationOutcome {
    pub fn warning(&self) -> Option<&WarningEvent> {
        match self {
            ViolationOutcome::Recorded(warning) | ViolationOutcome::Disqualified(warning) => {
                Some(warning)
            }
            ViolationOutcome::Ignored => None,
        }
    }
}

pub fn format_strike_message(reason: &str, count: u32) -> String {
    format!("{reason} ({count}/{STRIKE_LIMIT})")
}
