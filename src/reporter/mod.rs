pub mod client;

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use tokio::sync::watch;
use tokio_util::task::TaskTracker;

use crate::{
    error::ReportError,
    models::{EventReceipt, ProctorEvent, ProctorEventType, RiskScore},
};

pub use client::{BatchReport, ProctorApiClient};

const ENABLE_LOGS: bool = true;
const LOG_TARGET: &str = "proctor::reporter";

use crate::{log_debug, log_info, log_warn};

/// Destination for proctoring events.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn send_event(&self, event: &ProctorEvent) -> Result<EventReceipt, ReportError>;
}

/// Fire-and-forget relay of session events to an [`EventSink`].
///
/// Each report runs on its own task; the caller never waits for the backend.
/// Failures are logged and dropped. The risk score of the most recently
/// queued event that got an answer is published for display; a slow answer
/// to an older event never replaces it.
pub struct RemoteReporter {
    session_id: String,
    sink: Arc<dyn EventSink>,
    tasks: TaskTracker,
    risk_tx: watch::Sender<Option<RiskScore>>,
    next_seq: AtomicU64,
    risk_seq: Arc<AtomicU64>,
}

impl RemoteReporter {
    pub fn new(session_id: impl Into<String>, sink: Arc<dyn EventSink>) -> Self {
        let (risk_tx, _) = watch::channel(None);
        Self {
            session_id: session_id.into(),
            sink,
            tasks: TaskTracker::new(),
            risk_tx,
            next_seq: AtomicU64::new(0),
            risk_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Queue an event for delivery. Returns `false` once the reporter is
    /// closed.
    pub fn report_event(&self, event_type: ProctorEventType, confidence: f64) -> bool {
        self.report(ProctorEvent::new(self.session_id.clone(), event_type, confidence))
    }

    pub fn report(&self, event: ProctorEvent) -> bool {
        if self.tasks.is_closed() {
            log_debug!("reporter closed, dropping {}", event.event_type);
            return false;
        }

        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let sink = Arc::clone(&self.sink);
        let risk_tx = self.risk_tx.clone();
        let risk_seq = Arc::clone(&self.risk_seq);
        self.tasks.spawn(async move {
            match sink.send_event(&event).await {
                Ok(receipt) => {
                    log_info!(
                        "event {} logged, risk={:.2}",
                        event.event_type,
                        receipt.risk
                    );
                    // the watch lock orders the check against other publishers
                    let published = risk_tx.send_if_modified(|risk| {
                        if seq <= risk_seq.load(Ordering::SeqCst) {
                            return false;
                        }
                        risk_seq.store(seq, Ordering::SeqCst);
                        *risk = Some(receipt.risk_score());
                        true
                    });
                    if !published {
                        log_debug!("stale risk for {} ignored", event.event_type);
                    }
                }
                Err(err) => {
                    log_warn!("failed to report {}: {}", event.event_type, err);
                }
            }
        });
        true
    }

    pub fn latest_risk(&self) -> Option<RiskScore> {
        *self.risk_tx.borrow()
    }

    pub fn subscribe_risk(&self) -> watch::Receiver<Option<RiskScore>> {
        self.risk_tx.subscribe()
    }

    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Stop accepting events and wait up to `timeout` for in-flight ones.
    pub async fn close(&self, timeout: Duration) {
        self.tasks.close();
        if tokio::time::timeout(timeout, self.tasks.wait()).await.is_err() {
            log_warn!(
                "{} report(s) still in flight after {}ms, abandoning",
                self.tasks.len(),
                timeout.as_millis()
            );
        }
    }
}
