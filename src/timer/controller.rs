use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, Result};
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
    time::{self, Instant},
};

use crate::listener::MonitorListener;

use super::{CountdownState, CountdownStatus};

const ENABLE_LOGS: bool = true;
const LOG_TARGET: &str = "proctor::timer";

use crate::{log_debug, log_info};

/// Second-resolution exam countdown. Publishes the remaining time and calls
/// [`MonitorListener::on_time_up`] once when it runs out.
#[derive(Clone)]
pub struct ExamCountdown {
    state: Arc<Mutex<CountdownState>>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    tick_interval: Duration,
    remaining_tx: watch::Sender<u64>,
}

impl ExamCountdown {
    pub fn new() -> Self {
        let (remaining_tx, _) = watch::channel(0);
        Self {
            state: Arc::new(Mutex::new(CountdownState::default())),
            ticker: Arc::new(Mutex::new(None)),
            tick_interval: Duration::from_secs(1),
            remaining_tx,
        }
    }

    pub async fn get_state(&self) -> CountdownState {
        let mut guard = self.state.lock().await;
        guard.sync_from_anchor();
        guard.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.remaining_tx.subscribe()
    }

    pub async fn start(&self, limit_ms: u64, listener: Arc<dyn MonitorListener>) -> Result<()> {
        if limit_ms == 0 {
            return Err(anyhow!("exam time limit must be greater than zero"));
        }

        {
            let mut state = self.state.lock().await;
            if state.status == CountdownStatus::Running {
                return Err(anyhow!("countdown already running"));
            }
            state.begin(limit_ms, Instant::now());
        }
        self.remaining_tx.send_replace(limit_ms);
        log_info!("exam countdown started: {}s", limit_ms / 1000);

        self.spawn_ticker(listener).await;
        Ok(())
    }

    /// Stop without firing `on_time_up`.
    pub async fn stop(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
        let mut state = self.state.lock().await;
        if state.status == CountdownStatus::Running {
            state.stop();
            log_debug!("exam countdown stopped with {}ms left", state.remaining_ms());
        }
    }

    async fn spawn_ticker(&self, listener: Arc<dyn MonitorListener>) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(handle) = ticker_guard.take() {
            handle.abort();
        }

        let state = self.state.clone();
        let remaining_tx = self.remaining_tx.clone();
        let tick_interval = self.tick_interval;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(tick_interval);
            // the first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;

                let remaining = {
                    let mut guard = state.lock().await;
                    if guard.status != CountdownStatus::Running {
                        break;
                    }
                    guard.sync_from_anchor();
                    let remaining = guard.remaining_ms();
                    if remaining == 0 {
                        guard.expire();
                    }
                    remaining
                };

                remaining_tx.send_replace(remaining);

                if remaining == 0 {
                    log_info!("exam time limit reached");
                    listener.on_time_up();
                    break;
                }
            }
        });

        *ticker_guard = Some(handle);
    }
}

impl Default for ExamCountdown {
    fn default() -> Self {
        Self::new()
    }
}
