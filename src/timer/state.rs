use serde::{Deserialize, Serialize};
use std::cmp;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum CountdownStatus {
    Idle,
    Running,
    Expired,
    Stopped,
}

impl Default for CountdownStatus {
    fn default() -> Self {
        CountdownStatus::Idle
    }
}

/// Exam time limit bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountdownState {
    pub status: CountdownStatus,
    pub limit_ms: u64,
    pub elapsed_ms: u64,
    #[serde(skip)]
    pub running_anchor: Option<Instant>,
}

impl Default for CountdownState {
    fn default() -> Self {
        Self {
            status: CountdownStatus::Idle,
            limit_ms: 0,
            elapsed_ms: 0,
            running_anchor: None,
        }
    }
}

impl CountdownState {
    pub fn begin(&mut self, limit_ms: u64, now: Instant) {
        *self = Self {
            status: CountdownStatus::Running,
            limit_ms,
            elapsed_ms: 0,
            running_anchor: Some(now),
        };
    }

    pub fn current_elapsed_ms(&self) -> u64 {
        match (self.status, self.running_anchor) {
            (CountdownStatus::Running, Some(anchor)) => anchor.elapsed().as_millis() as u64,
            _ => self.elapsed_ms,
        }
    }

    pub fn sync_from_anchor(&mut self) {
        if self.status == CountdownStatus::Running {
            self.elapsed_ms = self.current_elapsed_ms();
        }
    }

    pub fn remaining_ms(&self) -> u64 {
        match self.status {
            CountdownStatus::Idle | CountdownStatus::Expired => 0,
            CountdownStatus::Running | CountdownStatus::Stopped => {
                let remaining = self.limit_ms as i64 - self.current_elapsed_ms() as i64;
                cmp::max(remaining, 0) as u64
            }
        }
    }

    pub fn expire(&mut self) {
        self.sync_from_anchor();
        self.elapsed_ms = self.elapsed_ms.min(self.limit_ms);
        self.status = CountdownStatus::Expired;
        self.running_anchor = None;
    }

    pub fn stop(&mut self) {
        self.sync_from_anchor();
        self.status = CountdownStatus::Stopped;
        self.running_anchor = None;
    }
}
