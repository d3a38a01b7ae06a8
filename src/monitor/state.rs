use serde::Serialize;

use crate::{
    detectors::{ClipboardTally, FullscreenState},
    ledger::{LedgerState, STRIKE_LIMIT},
    models::{ProctorSession, RiskLevel, RiskScore},
    sensing::FacePresenceState,
};

/// Everything the host needs to render the monitored view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorSnapshot {
    pub session: ProctorSession,
    pub violations: u32,
    pub strike_limit: u32,
    pub ledger_state: LedgerState,
    pub fullscreen: FullscreenState,
    /// Exam content must be covered until fullscreen is restored.
    pub fullscreen_blocker: bool,
    /// Non-blocking "no face" banner.
    pub face: FacePresenceState,
    pub camera_available: bool,
    pub clipboard: ClipboardTally,
    pub exam_remaining_ms: Option<u64>,
    /// Backend risk score, advisory only.
    pub risk: Option<RiskScore>,
}

impl MonitorSnapshot {
    pub fn new(session: ProctorSession) -> Self {
        Self {
            session,
            violations: 0,
            strike_limit: STRIKE_LIMIT,
            ledger_state: LedgerState::default(),
            fullscreen: FullscreenState::Fullscreen,
            fullscreen_blocker: false,
            face: FacePresenceState::default(),
            camera_available: false,
            clipboard: ClipboardTally::default(),
            exam_remaining_ms: None,
            risk: None,
        }
    }

    /// The terminal notice replaces the exam content.
    pub fn is_disqualified(&self) -> bool {
        self.ledger_state.is_disqualified()
    }

    pub fn risk_level(&self) -> Option<RiskLevel> {
        self.risk.map(|risk| risk.level())
    }

    /// Banner text shown above the exam once any strike is recorded.
    pub fn banner(&self) -> Option<String> {
        (self.violations > 0 && !self.is_disqualified()).then(|| {
            format!(
                "WARNING: Security protocols breached! ({}/{})",
                self.violations, self.strike_limit
            )
        })
    }
}
