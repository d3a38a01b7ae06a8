#![allow(dead_code)]

use std::{
    sync::{
        atomic::{AtomicBool, AtomicU32, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use image::{Rgba, RgbaImage};
use tokio::sync::mpsc;

use proctor_monitor::{
    ActiveElement, CameraStream, EnvironmentError, EnvironmentEvent, EventReceipt, EventSink,
    FullscreenVendor, MonitorListener, ProctorEnvironment, ProctorEvent, ReportError,
    WarningEvent,
};

pub const FACE: Rgba<u8> = Rgba([205, 150, 120, 255]);
pub const EMPTY_ROOM: Rgba<u8> = Rgba([70, 90, 120, 255]);

/// Webcam whose picture can be switched between a face and an empty room.
pub struct CameraScript {
    pub show_face: AtomicBool,
    pub captures: AtomicU32,
    pub stopped: AtomicBool,
}

impl CameraScript {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            show_face: AtomicBool::new(true),
            captures: AtomicU32::new(0),
            stopped: AtomicBool::new(false),
        })
    }

    pub fn set_face(&self, visible: bool) {
        self.show_face.store(visible, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

struct FakeCamera(Arc<CameraScript>);

#[async_trait]
impl CameraStream for FakeCamera {
    async fn capture_frame(&self) -> Result<RgbaImage, EnvironmentError> {
        if self.0.is_stopped() {
            return Err(EnvironmentError::Capture("stream stopped".into()));
        }
        self.0.captures.fetch_add(1, Ordering::SeqCst);
        let mut frame = RgbaImage::from_pixel(320, 240, EMPTY_ROOM);
        if self.0.show_face.load(Ordering::SeqCst) {
            for y in 40..200 {
                for x in 80..240 {
                    frame.put_pixel(x, y, FACE);
                }
            }
        }
        Ok(frame)
    }

    fn stop(&self) {
        self.0.stopped.store(true, Ordering::SeqCst);
    }
}

/// In-memory stand-in for the browser shell.
pub struct FakeEnvironment {
    subscribers: Mutex<Vec<mpsc::UnboundedSender<EnvironmentEvent>>>,
    fullscreen: AtomicBool,
    reject_fullscreen: AtomicBool,
    pub fullscreen_requests: AtomicU32,
    clipboard_blocked: AtomicBool,
    camera_denied: bool,
    pub camera: Arc<CameraScript>,
    pub navigations: Mutex<Vec<String>>,
}

impl FakeEnvironment {
    pub fn new() -> Arc<Self> {
        Self::build(false)
    }

    pub fn without_camera() -> Arc<Self> {
        Self::build(true)
    }

    fn build(camera_denied: bool) -> Arc<Self> {
        Arc::new(Self {
            subscribers: Mutex::new(Vec::new()),
            fullscreen: AtomicBool::new(false),
            reject_fullscreen: AtomicBool::new(false),
            fullscreen_requests: AtomicU32::new(0),
            clipboard_blocked: AtomicBool::new(false),
            camera_denied,
            camera: CameraScript::new(),
            navigations: Mutex::new(Vec::new()),
        })
    }

    /// Deliver an event to live subscribers; `false` when nobody listens.
    pub fn emit(&self, event: EnvironmentEvent) -> bool {
        let mut subscribers = self.subscribers.lock().unwrap();
        subscribers.retain(|tx| !tx.is_closed());
        let mut delivered = false;
        for tx in subscribers.iter() {
            delivered |= tx.send(event.clone()).is_ok();
        }
        delivered
    }

    pub fn hide_document(&self) -> bool {
        self.emit(EnvironmentEvent::VisibilityChanged { hidden: true })
    }

    pub fn show_document(&self) -> bool {
        self.emit(EnvironmentEvent::VisibilityChanged { hidden: false })
    }

    pub fn blur_to(&self, element: &str) -> bool {
        self.emit(EnvironmentEvent::WindowBlur {
            active_element: ActiveElement::Element(element.into()),
        })
    }

    pub fn blur_on_body(&self) -> bool {
        self.emit(EnvironmentEvent::WindowBlur {
            active_element: ActiveElement::Body,
        })
    }

    pub fn exit_fullscreen(&self, vendor: FullscreenVendor) -> bool {
        self.fullscreen.store(false, Ordering::SeqCst);
        self.emit(EnvironmentEvent::FullscreenChanged {
            is_fullscreen: false,
            vendor,
        })
    }

    pub fn reject_fullscreen_requests(&self, reject: bool) {
        self.reject_fullscreen.store(reject, Ordering::SeqCst);
    }

    pub fn clipboard_blocked(&self) -> bool {
        self.clipboard_blocked.load(Ordering::SeqCst)
    }

    pub fn live_subscribers(&self) -> usize {
        let mut subscribers = self.subscribers.lock().unwrap();
        subscribers.retain(|tx| !tx.is_closed());
        subscribers.len()
    }
}

#[async_trait]
impl ProctorEnvironment for FakeEnvironment {
    fn subscribe(&self) -> mpsc::UnboundedReceiver<EnvironmentEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().unwrap().push(tx);
        rx
    }

    async fn request_fullscreen(&self) -> Result<(), EnvironmentError> {
        self.fullscreen_requests.fetch_add(1, Ordering::SeqCst);
        if self.reject_fullscreen.load(Ordering::SeqCst) {
            return Err(EnvironmentError::PermissionDenied(
                "fullscreen request denied".into(),
            ));
        }
        if !self.fullscreen.swap(true, Ordering::SeqCst) {
            self.emit(EnvironmentEvent::FullscreenChanged {
                is_fullscreen: true,
                vendor: FullscreenVendor::Standard,
            });
        }
        Ok(())
    }

    fn is_fullscreen(&self) -> bool {
        self.fullscreen.load(Ordering::SeqCst)
    }

    fn set_clipboard_blocked(&self, blocked: bool) {
        self.clipboard_blocked.store(blocked, Ordering::SeqCst);
    }

    async fn open_camera(&self) -> Result<Box<dyn CameraStream>, EnvironmentError> {
        if self.camera_denied {
            return Err(EnvironmentError::PermissionDenied(
                "NotAllowedError: camera".into(),
            ));
        }
        Ok(Box::new(FakeCamera(Arc::clone(&self.camera))))
    }

    fn navigate(&self, path: &str) {
        self.navigations.lock().unwrap().push(path.to_string());
    }
}

#[derive(Default)]
pub struct RecordingListener {
    pub warnings: Mutex<Vec<WarningEvent>>,
    pub disqualifications: Mutex<Vec<String>>,
    pub time_ups: AtomicU32,
}

impl RecordingListener {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn messages(&self) -> Vec<String> {
        self.warnings
            .lock()
            .unwrap()
            .iter()
            .map(|w| w.message.clone())
            .collect()
    }

    pub fn disqualifications(&self) -> Vec<String> {
        self.disqualifications.lock().unwrap().clone()
    }
}

impl MonitorListener for RecordingListener {
    fn on_warning(&self, warning: &WarningEvent) {
        self.warnings.lock().unwrap().push(warning.clone());
    }

    fn on_disqualify(&self, reason: &str) {
        self.disqualifications.lock().unwrap().push(reason.to_string());
    }

    fn on_time_up(&self) {
        self.time_ups.fetch_add(1, Ordering::SeqCst);
    }
}

/// Backend stand-in that records every event and answers with a fixed risk.
pub struct RecordingSink {
    pub events: Mutex<Vec<ProctorEvent>>,
    pub risk: f64,
    pub fail: bool,
}

impl RecordingSink {
    pub fn new(risk: f64) -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(Vec::new()),
            risk,
            fail: false,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(Vec::new()),
            risk: 0.0,
            fail: true,
        })
    }

    pub fn event_types(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.event_type.to_string())
            .collect()
    }
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn send_event(&self, event: &ProctorEvent) -> Result<EventReceipt, ReportError> {
        self.events.lock().unwrap().push(event.clone());
        if self.fail {
            return Err(ReportError::Http("connection refused".into()));
        }
        Ok(EventReceipt {
            risk: self.risk,
            event_id: None,
            message: None,
        })
    }
}

/// Let the monitor drain its queues without crossing any timer boundary
/// that matters to the tests.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

/// Sleep until the default 3s arming delay has passed.
pub async fn wait_until_armed() {
    tokio::time::sleep(Duration::from_millis(3_050)).await;
}
