//! HTTP client for the proctoring backend.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tokio::task::JoinSet;

use crate::{
    error::ReportError,
    models::{EventReceipt, ProctorEvent},
    settings::ApiConfig,
};

use super::EventSink;

const ENABLE_LOGS: bool = true;
const LOG_TARGET: &str = "proctor::api";

use crate::{log_debug, log_error, log_warn};

#[derive(Clone)]
pub struct ProctorApiClient {
    config: ApiConfig,
    http_client: reqwest::Client,
}

/// Outcome of [`ProctorApiClient::send_batch_events`], one result per event
/// in input order.
#[derive(Debug)]
pub struct BatchReport {
    pub results: Vec<Result<EventReceipt, ReportError>>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn successful(&self) -> usize {
        self.results.iter().filter(|r| r.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.successful()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EventHistoryBody {
    Bare(Vec<Value>),
    Wrapped {
        #[serde(default)]
        events: Vec<Value>,
    },
}

impl ProctorApiClient {
    pub fn new(config: ApiConfig) -> Result<Self, ReportError> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("proctor-monitor/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn with_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request.header(reqwest::header::ACCEPT, "application/json");
        match &self.config.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Turn a non-2xx response into [`ReportError::Status`], preferring the
    /// backend's `message` or `detail` field over the status text.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ReportError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let fallback = status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string();
        let message = match response.json::<Value>().await {
            Ok(body) => body
                .get("message")
                .or_else(|| body.get("detail"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or(fallback),
            Err(_) => fallback,
        };

        Err(ReportError::Status {
            status: status.as_u16(),
            message,
        })
    }

    pub async fn send_event(&self, event: &ProctorEvent) -> Result<EventReceipt, ReportError> {
        let url = self.url(&self.config.events_path);
        log_debug!("POST {} {}", url, event.event_type);

        let response = self
            .with_auth(self.http_client.post(&url))
            .json(event)
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(EventReceipt {
                risk: 0.0,
                event_id: None,
                message: None,
            });
        }
        serde_json::from_str(&body).map_err(|err| ReportError::Decode(err.to_string()))
    }

    /// Events logged so far for a session. Accepts a bare array or
    /// `{"events": [...]}`.
    pub async fn event_history(&self, session_id: &str) -> Result<Vec<Value>, ReportError> {
        let url = self.url(&format!("events/{session_id}/"));
        let response = self.with_auth(self.http_client.get(&url)).send().await?;
        let response = Self::check_status(response).await?;

        match response.json::<EventHistoryBody>().await? {
            EventHistoryBody::Bare(events) | EventHistoryBody::Wrapped { events } => Ok(events),
        }
    }

    /// Send several events concurrently. Individual failures are collected,
    /// not propagated.
    pub async fn send_batch_events(&self, events: &[ProctorEvent]) -> BatchReport {
        let mut set = JoinSet::new();
        for (index, event) in events.iter().cloned().enumerate() {
            let client = self.clone();
            set.spawn(async move { (index, client.send_event(&event).await) });
        }

        let mut results: Vec<Option<Result<EventReceipt, ReportError>>> =
            (0..events.len()).map(|_| None).collect();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, result)) => results[index] = Some(result),
                Err(err) => log_warn!("batch send task failed: {}", err),
            }
        }

        let report = BatchReport {
            results: results
                .into_iter()
                .map(|r| r.unwrap_or_else(|| Err(ReportError::Http("send task aborted".into()))))
                .collect(),
        };
        log_debug!(
            "batch of {} events: {} sent, {} failed",
            report.total(),
            report.successful(),
            report.failed()
        );
        report
    }

    pub async fn session_status(&self, session_id: &str) -> Result<Value, ReportError> {
        let url = self.url(&format!("session/{session_id}/status/"));
        let response = self.with_auth(self.http_client.get(&url)).send().await?;
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    pub async fn end_session(&self, session_id: &str) -> Result<Value, ReportError> {
        let url = self.url(&format!("session/{session_id}/end/"));
        let response = self
            .with_auth(self.http_client.post(&url))
            .json(&serde_json::json!({}))
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|err| ReportError::Decode(err.to_string()))
    }

    /// `true` when `{base}/health` answers 2xx. Never fails.
    pub async fn check_health(&self) -> bool {
        match self.http_client.get(self.url("health")).send().await {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                log_error!("API health check failed: {}", err);
                false
            }
        }
    }
}

#[async_trait]
impl EventSink for ProctorApiClient {
    async fn send_event(&self, event: &ProctorEvent) -> Result<EventReceipt, ReportError> {
        ProctorApiClient::send_event(self, event).await
    }
}
