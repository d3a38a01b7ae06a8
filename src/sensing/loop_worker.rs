use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tokio::{
    sync::mpsc,
    time::{Duration, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::{arming::ArmingGate, environment::CameraStream};

use super::{
    config::FaceHeuristicConfig,
    face::{classify_frame, FrameStats},
};

const ENABLE_LOGS: bool = true;
const LOG_TARGET: &str = "proctor::face";

use crate::{log_info, log_warn};

/// Per-sample statistics are always logged at debug; the debug-samples
/// setting lifts them to info so they show under the default filter.
pub(crate) fn sample_log_level(debug_samples: bool) -> log::Level {
    if debug_samples {
        log::Level::Info
    } else {
        log::Level::Debug
    }
}

/// One classified webcam frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceSample {
    pub present: bool,
    pub stats: FrameStats,
    pub captured_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SamplerSettings {
    pub interval: Duration,
    pub capture_timeout: Duration,
    pub heuristic: FaceHeuristicConfig,
    pub debug_samples: bool,
}

pub async fn face_sampling_loop(
    camera: Arc<dyn CameraStream>,
    gate: ArmingGate,
    settings: SamplerSettings,
    samples: mpsc::UnboundedSender<FaceSample>,
    cancel_token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(settings.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if !gate.is_armed() {
                    continue;
                }

                let fut = sample_once(camera.as_ref(), &settings);
                match tokio::time::timeout(settings.capture_timeout, fut).await {
                    Ok(Ok(sample)) => {
                        if samples.send(sample).is_err() {
                            log_info!("face sample receiver dropped, stopping sampler");
                            break;
                        }
                    }
                    Ok(Err(err)) => log_warn!("face sample skipped: {err:#}"),
                    Err(_) => log_warn!(
                        "face capture timeout (> {}ms), sample skipped",
                        settings.capture_timeout.as_millis()
                    ),
                }
            }
            _ = cancel_token.cancelled() => {
                log_info!("face sampler shutting down");
                break;
            }
        }
    }
}

async fn sample_once(camera: &dyn CameraStream, settings: &SamplerSettings) -> Result<FaceSample> {
    let started = Instant::now();
    let captured_at = Utc::now();
    let frame = camera
        .capture_frame()
        .await
        .context("camera frame capture failed")?;

    let heuristic = settings.heuristic.clone();
    let (present, stats) = tokio::task::spawn_blocking(move || classify_frame(&frame, &heuristic))
        .await
        .context("face analysis worker join failed")?;

    if ENABLE_LOGS {
        log::log!(
            target: LOG_TARGET,
            sample_log_level(settings.debug_samples),
            "face sample present={} luminance={:.1} skin_ratio={:.3} took {}ms",
            present,
            stats.avg_luminance,
            stats.skin_ratio,
            started.elapsed().as_millis()
        );
    }

    Ok(FaceSample {
        present,
        stats,
        captured_at,
    })
}
