use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use tokio::{sync::watch, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::{
    arming::ArmingGate,
    detectors::{ClipboardGuard, FocusDetector, FullscreenDetector},
    environment::ProctorEnvironment,
    ledger::ViolationLedger,
    listener::MonitorListener,
    models::{ProctorEventType, ProctorSession, RiskScore},
    reporter::{EventSink, RemoteReporter},
    sensing::{FacePresenceState, SamplerSettings, SensingController},
    settings::MonitorConfig,
    timer::ExamCountdown,
};

use super::{
    loop_worker::{LoopExit, MonitorLoop},
    state::MonitorSnapshot,
};

const ENABLE_LOGS: bool = true;
const LOG_TARGET: &str = "proctor::monitor";

use crate::{log_info, log_warn};

/// The exam-integrity monitor for one proctored session.
///
/// Created by [`ProctorMonitor::mount`] when the monitored view appears and
/// torn down by [`ProctorMonitor::unmount`]. Dropping it without unmounting
/// still cancels every task it started.
pub struct ProctorMonitor {
    config: MonitorConfig,
    env: Arc<dyn ProctorEnvironment>,
    gate: ArmingGate,
    ledger: Arc<ViolationLedger>,
    reporter: Arc<RemoteReporter>,
    countdown: Option<ExamCountdown>,
    snapshot_rx: watch::Receiver<MonitorSnapshot>,
    cancel_token: CancellationToken,
    loop_handle: Option<JoinHandle<LoopExit>>,
}

impl ProctorMonitor {
    pub async fn mount(
        session_id: impl Into<String>,
        config: MonitorConfig,
        env: Arc<dyn ProctorEnvironment>,
        sink: Arc<dyn EventSink>,
        listener: Arc<dyn MonitorListener>,
    ) -> Result<Self> {
        config.validate().context("invalid monitor config")?;

        let session = ProctorSession::begin(session_id, Utc::now());
        log_info!("mounting monitor for session {}", session.id);

        let cancel_token = CancellationToken::new();
        let gate = ArmingGate::new(config.arming_delay());
        let ledger = Arc::new(ViolationLedger::new(Arc::clone(&listener)));
        let reporter = Arc::new(RemoteReporter::new(session.id.clone(), sink));

        let events = env.subscribe();
        let clipboard = ClipboardGuard::engage(Arc::clone(&env));
        gate.arm();

        if let Err(err) = env.request_fullscreen().await {
            log_warn!("initial fullscreen request failed: {}", err);
        }

        let mut sensing = SensingController::new();
        let face_samples = match env.open_camera().await {
            Ok(camera) => {
                let settings = SamplerSettings {
                    interval: config.face_sample_interval(),
                    capture_timeout: config.face_capture_timeout(),
                    heuristic: config.face.clone(),
                    debug_samples: config.debug_face_samples,
                };
                Some(sensing.start_sensing(camera, gate.clone(), settings, &cancel_token)?)
            }
            Err(err) => {
                log_warn!("camera unavailable, face sensing disabled: {}", err);
                reporter.report_event(ProctorEventType::CameraDenied, 1.0);
                None
            }
        };

        let countdown = match config.exam_time_limit_ms {
            Some(limit_ms) => {
                let countdown = ExamCountdown::new();
                countdown.start(limit_ms, Arc::clone(&listener)).await?;
                Some(countdown)
            }
            None => None,
        };

        let mut initial = MonitorSnapshot::new(session);
        initial.exam_remaining_ms = config.exam_time_limit_ms;
        let (snapshot_tx, snapshot_rx) = watch::channel(initial);

        let event_loop = MonitorLoop {
            gate: gate.clone(),
            ledger: Arc::clone(&ledger),
            reporter: Arc::clone(&reporter),
            events: Some(events),
            face_samples,
            ledger_state: Some(ledger.subscribe()),
            risk: Some(reporter.subscribe_risk()),
            remaining: countdown.as_ref().map(ExamCountdown::subscribe),
            sensing,
            clipboard,
            countdown: countdown.clone(),
            fullscreen: FullscreenDetector::new(),
            focus: FocusDetector::new(),
            face: FacePresenceState::default(),
            absence_threshold: config.face.absence_threshold,
            snapshot_tx,
            cancel_token: cancel_token.clone(),
        };
        let loop_handle = tokio::spawn(event_loop.run());

        Ok(Self {
            config,
            env,
            gate,
            ledger,
            reporter,
            countdown,
            snapshot_rx,
            cancel_token,
            loop_handle: Some(loop_handle),
        })
    }

    pub fn session_id(&self) -> &str {
        self.reporter.session_id()
    }

    pub fn is_armed(&self) -> bool {
        self.gate.is_armed()
    }

    pub fn violations(&self) -> u32 {
        self.ledger.count()
    }

    pub fn is_disqualified(&self) -> bool {
        self.ledger.is_disqualified()
    }

    /// Shared strike ledger. Strikes recorded through it are picked up by
    /// the monitor loop like detector strikes, including disqualification.
    pub fn ledger(&self) -> Arc<ViolationLedger> {
        Arc::clone(&self.ledger)
    }

    pub fn latest_risk(&self) -> Option<RiskScore> {
        self.reporter.latest_risk()
    }

    pub fn subscribe_risk(&self) -> watch::Receiver<Option<RiskScore>> {
        self.reporter.subscribe_risk()
    }

    /// Current render model. Risk and remaining exam time are re-read here
    /// as well, since they can still move after the loop has exited.
    pub fn snapshot(&self) -> MonitorSnapshot {
        let mut snapshot = self.snapshot_rx.borrow().clone();
        snapshot.risk = self.reporter.latest_risk();
        if let Some(countdown) = &self.countdown {
            snapshot.exam_remaining_ms = Some(*countdown.subscribe().borrow());
        }
        snapshot
    }

    /// Change notifications for the render model while the session runs.
    pub fn subscribe(&self) -> watch::Receiver<MonitorSnapshot> {
        self.snapshot_rx.clone()
    }

    /// The "return to test" action of the fullscreen blocker. Best-effort:
    /// returns whether the environment is fullscreen afterwards. Failures are
    /// logged and never count as violations.
    pub async fn request_fullscreen(&self) -> bool {
        if self.env.is_fullscreen() {
            return true;
        }
        match self.env.request_fullscreen().await {
            Ok(()) => true,
            Err(err) => {
                log_warn!("fullscreen request rejected: {}", err);
                false
            }
        }
    }

    /// The single action offered by the disqualification screen.
    pub fn leave_session(&self) {
        log_info!("leaving session {} to {}", self.session_id(), self.config.exit_path);
        self.env.navigate(&self.config.exit_path);
    }

    /// Tear down: stop every detector, release the camera, and give
    /// in-flight reports a bounded chance to finish. Returns the final
    /// snapshot.
    pub async fn unmount(mut self) -> Result<MonitorSnapshot> {
        self.cancel_token.cancel();
        self.gate.cancel();

        let exit = match self.loop_handle.take() {
            Some(handle) => Some(
                handle
                    .await
                    .map_err(|err| anyhow!("monitor loop failed to join: {err}"))?,
            ),
            None => None,
        };

        self.reporter.close(self.config.report_drain_timeout()).await;
        log_info!(
            "monitor unmounted for session {} after {:?}",
            self.session_id(),
            exit
        );
        Ok(self.snapshot())
    }
}

impl Drop for ProctorMonitor {
    fn drop(&mut self) {
        self.cancel_token.cancel();
        self.gate.cancel();
    }
}
