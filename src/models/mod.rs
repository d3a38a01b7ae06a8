pub mod event;
pub mod session;
pub mod warning;

pub use event::{EventReceipt, ProctorEvent, ProctorEventType, RiskLevel, RiskScore};
pub use session::{ProctorSession, SessionStatus};
pub use warning::WarningEvent;
