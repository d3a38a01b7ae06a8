use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event identifiers understood by the proctoring backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProctorEventType {
    TabSwitch,
    NoFace,
    CameraDenied,
    Disqualified,
    ViolationWarning,
    Other(String),
}

impl ProctorEventType {
    pub fn as_str(&self) -> &str {
        match self {
            ProctorEventType::TabSwitch => "TAB_SWITCH",
            ProctorEventType::NoFace => "NO_FACE",
            ProctorEventType::CameraDenied => "CAMERA_DENIED",
            ProctorEventType::Disqualified => "disqualified",
            ProctorEventType::ViolationWarning => "violation_warning",
            ProctorEventType::Other(name) => name,
        }
    }
}

impl From<String> for ProctorEventType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "TAB_SWITCH" => ProctorEventType::TabSwitch,
            "NO_FACE" => ProctorEventType::NoFace,
            "CAMERA_DENIED" => ProctorEventType::CameraDenied,
            "disqualified" => ProctorEventType::Disqualified,
            "violation_warning" => ProctorEventType::ViolationWarning,
            _ => ProctorEventType::Other(value),
        }
    }
}

impl From<ProctorEventType> for String {
    fn from(value: ProctorEventType) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for ProctorEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body for the event endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProctorEvent {
    pub session_id: String,
    pub event_type: ProctorEventType,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl ProctorEvent {
    pub fn new(
        session_id: impl Into<String>,
        event_type: ProctorEventType,
        confidence: f64,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            event_type,
            confidence: clamp_confidence(confidence),
            timestamp: Utc::now(),
            metadata: serde_json::Value::Object(Default::default()),
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Confidence is a weight in [0, 1]; NaN collapses to 0.
pub fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}

/// Advisory risk computed by the backend. Display only.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct RiskScore(pub f64);

/// Display bucket for a [`RiskScore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskScore {
    pub const MEDIUM_THRESHOLD: f64 = 0.4;
    pub const HIGH_THRESHOLD: f64 = 0.7;

    pub fn level(&self) -> RiskLevel {
        if self.0 >= Self::HIGH_THRESHOLD {
            RiskLevel::High
        } else if self.0 >= Self::MEDIUM_THRESHOLD {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// What the backend returns for a logged event.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EventReceipt {
    #[serde(default)]
    pub risk: f64,
    #[serde(default, alias = "id")]
    pub event_id: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
}

impl EventReceipt {
    pub fn risk_score(&self) -> RiskScore {
        RiskScore(self.risk)
    }
}
