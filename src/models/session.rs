use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum SessionStatus {
    Monitoring,
    Disqualified,
    Ended,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Monitoring => "Monitoring",
            SessionStatus::Disqualified => "Disqualified",
            SessionStatus::Ended => "Ended",
        }
    }
}

/// One proctored attempt, as the host UI sees it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProctorSession {
    /// Opaque identifier issued by the backend when the exam started.
    pub id: String,
    pub armed: bool,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl ProctorSession {
    pub fn begin(id: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            armed: false,
            status: SessionStatus::Monitoring,
            started_at,
            ended_at: None,
        }
    }
}
