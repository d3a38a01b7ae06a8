pub mod state;

use std::sync::{
    atomic::{AtomicU32, AtomicU64, Ordering},
    Arc,
};

use chrono::Utc;
use tokio::sync::watch;

use crate::{listener::MonitorListener, models::WarningEvent};

pub use state::{
    format_strike_message, LedgerState, ViolationOutcome, DISQUALIFY_REASON, STRIKE_LIMIT,
};

const ENABLE_LOGS: bool = true;
const LOG_TARGET: &str = "proctor::ledger";

use crate::{log_info, log_warn};

/// Strike counter for one session.
///
/// The count only moves through a compare-and-increment, so simultaneous
/// callers each get a distinct strike number and the transition to
/// disqualified happens for exactly one of them. Every recorded strike is
/// also published on [`ViolationLedger::subscribe`], whoever recorded it.
pub struct ViolationLedger {
    count: AtomicU32,
    sequence: AtomicU64,
    listener: Arc<dyn MonitorListener>,
    state_tx: watch::Sender<LedgerState>,
}

impl ViolationLedger {
    pub fn new(listener: Arc<dyn MonitorListener>) -> Self {
        Self {
            count: AtomicU32::new(0),
            sequence: AtomicU64::new(0),
            listener,
            state_tx: watch::channel(LedgerState::default()).0,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<LedgerState> {
        self.state_tx.subscribe()
    }

    pub fn count(&self) -> u32 {
        self.count.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> LedgerState {
        LedgerState::from_count(self.count())
    }

    pub fn is_disqualified(&self) -> bool {
        self.state().is_disqualified()
    }

    pub fn record_violation(&self, reason: &str) -> ViolationOutcome {
        let previous = self
            .count
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                (current < STRIKE_LIMIT).then_some(current + 1)
            });

        let Ok(previous) = previous else {
            log_warn!("violation '{}' after disqualification ignored", reason);
            return ViolationOutcome::Ignored;
        };

        let count = previous + 1;
        let warning = self.next_warning(reason, format_strike_message(reason, count), Some(count));
        log_info!("violation {}/{}: {}", count, STRIKE_LIMIT, reason);
        // concurrent recorders may get here out of order
        self.state_tx.send_if_modified(|state| {
            let advance = count > state.strikes();
            if advance {
                *state = LedgerState::from_count(count);
            }
            advance
        });
        self.listener.on_warning(&warning);

        if count >= STRIKE_LIMIT {
            log_warn!("strike limit reached, session disqualified");
            self.listener.on_disqualify(DISQUALIFY_REASON);
            ViolationOutcome::Disqualified(warning)
        } else {
            ViolationOutcome::Recorded(warning)
        }
    }

    /// Surface an unscored warning through the same listener and sequence.
    pub fn emit_notice(&self, message: &str) -> WarningEvent {
        let warning = self.next_warning(message, message.to_string(), None);
        self.listener.on_warning(&warning);
        warning
    }

    fn next_warning(&self, reason: &str, message: String, strike: Option<u32>) -> WarningEvent {
        WarningEvent {
            reason: reason.to_string(),
            message,
            occurred_at: Utc::now(),
            sequence: self.sequence.fetch_add(1, Ordering::SeqCst) + 1,
            strike,
        }
    }
}
