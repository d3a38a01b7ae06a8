//! Exam-integrity monitor for proctored skill assessments.
//!
//! [`ProctorMonitor`] watches a monitored exam view through an injected
//! [`ProctorEnvironment`]: it flags fullscreen exits, tab switches and window
//! focus loss as strikes, suppresses clipboard shortcuts, samples the webcam
//! for face presence, disqualifies on the third strike, and relays events to
//! the proctoring backend.

mod utils;

pub mod arming;
pub mod detectors;
pub mod environment;
pub mod error;
pub mod ledger;
pub mod listener;
pub mod models;
pub mod monitor;
pub mod reporter;
pub mod sensing;
pub mod settings;
pub mod timer;

pub use arming::ArmingGate;
pub use environment::{
    ActiveElement, CameraStream, ClipboardAction, EnvironmentEvent, FullscreenVendor,
    ProctorEnvironment,
};
pub use error::{ConfigError, EnvironmentError, ReportError};
pub use ledger::{LedgerState, ViolationLedger, ViolationOutcome};
pub use listener::{MonitorListener, NoopListener};
pub use models::{
    EventReceipt, ProctorEvent, ProctorEventType, RiskLevel, RiskScore, WarningEvent,
};
pub use monitor::{MonitorSnapshot, ProctorMonitor};
pub use reporter::{BatchReport, EventSink, ProctorApiClient, RemoteReporter};
pub use settings::{ApiConfig, MonitorConfig};
pub use utils::{init_logging, DEFAULT_LOG_LEVEL};
