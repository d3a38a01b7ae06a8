use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message surfaced to the host, scored or not.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WarningEvent {
    pub reason: String,
    /// Display text, e.g. `"Tab switch detected! (1/3)"`.
    pub message: String,
    pub occurred_at: DateTime<Utc>,
    /// 1-based position among all warnings of the session.
    pub sequence: u64,
    /// Strike count after this warning; `None` for unscored notices.
    pub strike: Option<u32>,
}

impl WarningEvent {
    pub fn is_scored(&self) -> bool {
        self.strike.is_some()
    }
}
