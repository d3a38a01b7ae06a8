//! Error types for the proctoring monitor

use thiserror::Error;

/// Failures raised by the host environment (browser shell, test fake).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentError {
    /// The user or the platform refused a permission (camera, fullscreen).
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The capability is not available in this environment.
    #[error("unsupported capability: {0}")]
    Unsupported(String),

    /// Grabbing a frame from the camera failed.
    #[error("frame capture failed: {0}")]
    Capture(String),
}

/// Failures talking to the proctoring backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// Transport-level failure (connect, timeout, TLS)
    #[error("HTTP error: {0}")]
    Http(String),

    /// The backend answered with a non-2xx status
    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body was not the expected JSON
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl ReportError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, ReportError::Status { status, .. } if (400..500).contains(status))
    }

    pub fn is_server_error(&self) -> bool {
        matches!(self, ReportError::Status { status, .. } if *status >= 500)
    }

    pub fn is_auth_error(&self) -> bool {
        matches!(self, ReportError::Status { status: 401 | 403, .. })
    }
}

impl From<reqwest::Error> for ReportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ReportError::Decode(err.to_string())
        } else {
            ReportError::Http(err.to_string())
        }
    }
}

/// Errors loading or validating [`crate::MonitorConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
