use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, sensing::FaceHeuristicConfig};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub events_path: String,
    pub timeout_ms: u64,
    /// Sent as `Authorization: Bearer ...` when present. Obtaining and
    /// storing it is the host's business.
    pub bearer_token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/api".into(),
            events_path: "/proctor-events".into(),
            timeout_ms: 30_000,
            bearer_token: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub arming_delay_ms: u64,
    pub face_sample_interval_ms: u64,
    pub face_capture_timeout_ms: u64,
    pub face: FaceHeuristicConfig,
    pub api: ApiConfig,
    /// Where the disqualification screen's single button leads.
    pub exit_path: String,
    pub exam_time_limit_ms: Option<u64>,
    pub report_drain_timeout_ms: u64,
    /// Log the statistics of every face sample at info level.
    pub debug_face_samples: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            arming_delay_ms: 3_000,
            face_sample_interval_ms: 1_000,
            face_capture_timeout_ms: 800,
            face: FaceHeuristicConfig::default(),
            api: ApiConfig::default(),
            exit_path: "/student/dashboard".into(),
            exam_time_limit_ms: None,
            report_drain_timeout_ms: 2_000,
            debug_face_samples: false,
        }
    }
}

impl MonitorConfig {
    /// Read a JSON config file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults with `PROCTOR_*` environment overrides applied.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("PROCTOR_API_BASE_URL") {
            self.api.base_url = url;
        }
        if let Some(token) = lookup("PROCTOR_API_TOKEN") {
            self.api.bearer_token = Some(token);
        }
        if let Some(raw) = lookup("PROCTOR_ARMING_DELAY_MS") {
            self.arming_delay_ms = raw.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("PROCTOR_ARMING_DELAY_MS is not a number: {raw}"))
            })?;
        }
        if let Some(raw) = lookup("PROCTOR_DEBUG") {
            self.debug_face_samples = raw == "1" || raw.eq_ignore_ascii_case("true");
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.face_sample_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "face_sample_interval_ms must be greater than zero".into(),
            ));
        }
        if self.face_capture_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "face_capture_timeout_ms must be greater than zero".into(),
            ));
        }
        if self.exam_time_limit_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "exam_time_limit_ms must be greater than zero when set".into(),
            ));
        }
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api.base_url is empty".into()));
        }
        self.face.validate().map_err(ConfigError::Invalid)
    }

    pub fn arming_delay(&self) -> Duration {
        Duration::from_millis(self.arming_delay_ms)
    }

    pub fn face_sample_interval(&self) -> Duration {
        Duration::from_millis(self.face_sample_interval_ms)
    }

    pub fn face_capture_timeout(&self) -> Duration {
        Duration::from_millis(self.face_capture_timeout_ms)
    }

    pub fn report_drain_timeout(&self) -> Duration {
        Duration::from_millis(self.report_drain_timeout_ms)
    }
}
