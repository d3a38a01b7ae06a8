use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::{sync::watch, task::JoinHandle};

const ENABLE_LOGS: bool = true;
const LOG_TARGET: &str = "proctor::arming";

use crate::{log_debug, log_info};

pub const DEFAULT_ARMING_DELAY: Duration = Duration::from_millis(3000);

/// Grace period before detectors may record anything.
///
/// Cloning shares the flag, so detectors running on other tasks see the
/// same arming state.
#[derive(Clone)]
pub struct ArmingGate {
    armed: Arc<watch::Sender<bool>>,
    timer: Arc<Mutex<Option<JoinHandle<()>>>>,
    delay: Duration,
}

impl ArmingGate {
    pub fn new(delay: Duration) -> Self {
        Self {
            armed: Arc::new(watch::channel(false).0),
            timer: Arc::new(Mutex::new(None)),
            delay,
        }
    }

    /// Start the one-shot arming timer. A second call while a timer is
    /// pending or after arming does nothing.
    pub fn arm(&self) {
        let mut guard = match self.timer.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if guard.is_some() || self.is_armed() {
            return;
        }

        let armed = Arc::clone(&self.armed);
        let delay = self.delay;
        log_debug!("arming in {}ms", delay.as_millis());
        *guard = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if !armed.send_replace(true) {
                log_info!("monitor armed after {}ms grace period", delay.as_millis());
            }
        }));
    }

    pub fn is_armed(&self) -> bool {
        *self.armed.borrow()
    }

    /// Resolves once the gate is armed; immediately if it already is.
    pub async fn wait_armed(&self) {
        let mut rx = self.armed.subscribe();
        // the sender lives in `self`, so the channel cannot close here
        let _ = rx.wait_for(|armed| *armed).await;
    }

    /// Abort a pending timer. The flag is left as it is.
    pub fn cancel(&self) {
        let handle = match self.timer.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            handle.abort();
        }
    }
}
