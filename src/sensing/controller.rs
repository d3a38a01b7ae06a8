use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::{arming::ArmingGate, environment::CameraStream};

use super::loop_worker::{face_sampling_loop, FaceSample, SamplerSettings};

const ENABLE_LOGS: bool = true;
const LOG_TARGET: &str = "proctor::face";

use crate::log_info;

/// Owns the webcam stream and the sampling task for one session.
pub struct SensingController {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
    camera: Option<Arc<dyn CameraStream>>,
}

impl SensingController {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
            camera: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    /// Take ownership of `camera` and start sampling it. Samples are only
    /// taken while `gate` is armed.
    pub fn start_sensing(
        &mut self,
        camera: Box<dyn CameraStream>,
        gate: ArmingGate,
        settings: SamplerSettings,
        parent: &CancellationToken,
    ) -> Result<mpsc::UnboundedReceiver<FaceSample>> {
        if self.handle.is_some() {
            camera.stop();
            bail!("face sensing already active");
        }

        let camera: Arc<dyn CameraStream> = Arc::from(camera);
        let cancel_token = parent.child_token();
        let (tx, rx) = mpsc::unbounded_channel();

        log_info!(
            "starting face sampler every {}ms",
            settings.interval.as_millis()
        );
        let handle = tokio::spawn(face_sampling_loop(
            Arc::clone(&camera),
            gate,
            settings,
            tx,
            cancel_token.clone(),
        ));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        self.camera = Some(camera);
        Ok(rx)
    }

    /// Cancel the sampler, wait for it, and release the camera.
    pub async fn stop_sensing(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        let joined = match self.handle.take() {
            Some(handle) => handle.await.context("face sampler task failed to join"),
            None => Ok(()),
        };

        if let Some(camera) = self.camera.take() {
            camera.stop();
            log_info!("camera released");
        }

        joined
    }
}

impl Default for SensingController {
    fn default() -> Self {
        Self::new()
    }
}
