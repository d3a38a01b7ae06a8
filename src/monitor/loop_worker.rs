use std::sync::Arc;

use serde_json::json;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use crate::{
    arming::ArmingGate,
    detectors::{ClipboardGuard, Detection, FocusDetector, FullscreenDetector},
    environment::EnvironmentEvent,
    ledger::{LedgerState, ViolationLedger, ViolationOutcome},
    models::{ProctorEvent, ProctorEventType, RiskScore, SessionStatus},
    reporter::RemoteReporter,
    sensing::{FaceSample, FacePresenceState, PresenceTransition, SensingController},
    timer::ExamCountdown,
};

use super::state::MonitorSnapshot;

const ENABLE_LOGS: bool = true;
const LOG_TARGET: &str = "proctor::monitor";

use crate::{log_debug, log_error, log_info, log_warn};

pub const NO_FACE_NOTICE: &str = "No face detected";
const NO_FACE_CONFIDENCE: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    Unmounted,
    Disqualified,
}

/// Single owner of the detectors for one session. Environment events and
/// face samples are handled one at a time in arrival order. Ledger, risk and
/// countdown changes made elsewhere wake the loop so the broadcast snapshot
/// follows them.
pub(crate) struct MonitorLoop {
    pub(crate) gate: ArmingGate,
    pub(crate) ledger: Arc<ViolationLedger>,
    pub(crate) reporter: Arc<RemoteReporter>,
    pub(crate) events: Option<mpsc::UnboundedReceiver<EnvironmentEvent>>,
    pub(crate) face_samples: Option<mpsc::UnboundedReceiver<FaceSample>>,
    pub(crate) ledger_state: Option<watch::Receiver<LedgerState>>,
    pub(crate) risk: Option<watch::Receiver<Option<RiskScore>>>,
    pub(crate) remaining: Option<watch::Receiver<u64>>,
    pub(crate) sensing: SensingController,
    pub(crate) clipboard: ClipboardGuard,
    pub(crate) countdown: Option<ExamCountdown>,
    pub(crate) fullscreen: FullscreenDetector,
    pub(crate) focus: FocusDetector,
    pub(crate) face: FacePresenceState,
    pub(crate) absence_threshold: u32,
    pub(crate) snapshot_tx: watch::Sender<MonitorSnapshot>,
    pub(crate) cancel_token: CancellationToken,
}

async fn recv_or_pending<T>(rx: &mut Option<mpsc::UnboundedReceiver<T>>) -> Option<T> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// `false` once the sender is gone.
async fn changed_or_pending<T>(rx: &mut Option<watch::Receiver<T>>) -> bool {
    match rx {
        Some(rx) => rx.changed().await.is_ok(),
        None => std::future::pending().await,
    }
}

impl MonitorLoop {
    pub(crate) async fn run(mut self) -> LoopExit {
        let mut armed_seen = self.gate.is_armed();
        self.publish();

        let exit = loop {
            if self.ledger.is_disqualified() {
                break LoopExit::Disqualified;
            }

            tokio::select! {
                biased;
                _ = self.cancel_token.cancelled() => break LoopExit::Unmounted,
                _ = self.gate.wait_armed(), if !armed_seen => {
                    armed_seen = true;
                }
                event = recv_or_pending(&mut self.events) => match event {
                    Some(event) => self.handle_event(event),
                    None => {
                        log_warn!("environment closed its event stream");
                        self.events = None;
                    }
                },
                sample = recv_or_pending(&mut self.face_samples) => match sample {
                    Some(sample) => self.handle_face_sample(sample),
                    None => {
                        log_warn!("face sampler stopped");
                        self.face_samples = None;
                    }
                },
                // strikes recorded through a shared ledger handle
                open = changed_or_pending(&mut self.ledger_state) => {
                    if !open {
                        self.ledger_state = None;
                    }
                }
                open = changed_or_pending(&mut self.risk) => {
                    if !open {
                        self.risk = None;
                    }
                }
                open = changed_or_pending(&mut self.remaining) => {
                    if !open {
                        self.remaining = None;
                    }
                }
            }

            self.publish();
        };
        // a strike may land between the last check and the cancellation
        let exit = if self.ledger.is_disqualified() {
            LoopExit::Disqualified
        } else {
            exit
        };

        self.release(exit).await;
        exit
    }

    fn handle_event(&mut self, event: EnvironmentEvent) {
        let armed = self.gate.is_armed();
        let detection = match event {
            EnvironmentEvent::FullscreenChanged {
                is_fullscreen,
                vendor,
            } => self.fullscreen.observe(is_fullscreen, vendor, armed),
            EnvironmentEvent::VisibilityChanged { hidden } => {
                self.focus.on_visibility_change(hidden, armed)
            }
            EnvironmentEvent::WindowBlur { active_element } => {
                self.focus.on_blur(&active_element, armed)
            }
            EnvironmentEvent::ClipboardBlocked { action } => {
                log_debug!("blocked clipboard action {:?}", action);
                self.clipboard.record(action);
                None
            }
        };

        if let Some(detection) = detection {
            self.apply(detection);
        }
    }

    fn apply(&mut self, detection: Detection) {
        match self.ledger.record_violation(detection.reason) {
            // the `disqualified` report is sent on the way out of the loop
            ViolationOutcome::Recorded(_) | ViolationOutcome::Disqualified(_) => {
                self.reporter
                    .report_event(detection.event_type, detection.confidence);
            }
            ViolationOutcome::Ignored => {}
        }
    }

    fn handle_face_sample(&mut self, sample: FaceSample) {
        if !self.gate.is_armed() {
            return;
        }

        match self.face.observe(sample.present, self.absence_threshold) {
            PresenceTransition::WarningRaised => {
                log_warn!(
                    "no face for {} consecutive samples (luminance={:.1}, skin_ratio={:.3})",
                    self.face.consecutive_absences,
                    sample.stats.avg_luminance,
                    sample.stats.skin_ratio
                );
                self.ledger.emit_notice(NO_FACE_NOTICE);
                let event = ProctorEvent::new(
                    self.reporter.session_id(),
                    ProctorEventType::NoFace,
                    NO_FACE_CONFIDENCE,
                )
                .with_metadata(json!({
                    "consecutive_absences": self.face.consecutive_absences,
                    "avg_luminance": sample.stats.avg_luminance,
                    "skin_ratio": sample.stats.skin_ratio,
                }));
                self.reporter.report(event);
            }
            PresenceTransition::WarningCleared => log_info!("face back in frame"),
            PresenceTransition::Unchanged => {}
        }
    }

    fn build_snapshot(&self, previous: &MonitorSnapshot) -> MonitorSnapshot {
        let armed = self.gate.is_armed();
        let mut session = previous.session.clone();
        session.armed = armed;

        MonitorSnapshot {
            session,
            violations: self.ledger.count(),
            strike_limit: previous.strike_limit,
            ledger_state: self.ledger.state(),
            fullscreen: self.fullscreen.state(),
            fullscreen_blocker: self.fullscreen.blocker_visible(armed)
                && !self.ledger.is_disqualified(),
            face: self.face,
            camera_available: self.sensing.is_active(),
            clipboard: self.clipboard.tally(),
            exam_remaining_ms: match &self.remaining {
                Some(rx) => Some(*rx.borrow()),
                None => previous.exam_remaining_ms,
            },
            risk: match &self.risk {
                Some(rx) => *rx.borrow(),
                None => previous.risk,
            },
        }
    }

    fn publish(&self) {
        self.snapshot_tx.send_modify(|snapshot| {
            *snapshot = self.build_snapshot(snapshot);
        });
    }

    /// Release every detector resource. Runs on both exit paths.
    async fn release(&mut self, exit: LoopExit) {
        if exit == LoopExit::Disqualified {
            self.reporter
                .report_event(ProctorEventType::Disqualified, 1.0);
        }
        self.gate.cancel();
        self.events = None;
        self.face_samples = None;

        if let Err(err) = self.sensing.stop_sensing().await {
            log_error!("failed to stop face sensing: {err:#}");
        }
        self.clipboard.release();
        if let Some(countdown) = &self.countdown {
            countdown.stop().await;
        }

        let status = match exit {
            LoopExit::Disqualified => SessionStatus::Disqualified,
            LoopExit::Unmounted => SessionStatus::Ended,
        };
        log_info!(
            "monitor released for session {} ({})",
            self.reporter.session_id(),
            status.as_str()
        );
        self.snapshot_tx.send_modify(|snapshot| {
            *snapshot = self.build_snapshot(snapshot);
            snapshot.session.status = status;
            snapshot.session.ended_at = Some(chrono::Utc::now());
            snapshot.face = FacePresenceState::default();
        });
    }
}
