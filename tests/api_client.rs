use std::sync::{Arc, Mutex};

use proctor_monitor::{
    ApiConfig, EventSink, ProctorApiClient, ProctorEvent, ProctorEventType, ReportError,
};
use serde_json::Value;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};

#[derive(Debug, Clone)]
struct RecordedRequest {
    method: String,
    path: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl RecordedRequest {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

type Responder = fn(&RecordedRequest) -> (u16, &'static str);

/// Minimal HTTP/1.1 backend: one request per connection, canned replies.
async fn spawn_backend(respond: Responder) -> (String, Arc<Mutex<Vec<RecordedRequest>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let request = read_request(&mut socket).await;
            let (status, body) = respond(&request);
            log.lock().unwrap().push(request);

            let response = format!(
                "HTTP/1.1 {status} X\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    (format!("http://{addr}/api"), seen)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> RecordedRequest {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let header_end = loop {
        let n = socket.read(&mut chunk).await.unwrap();
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        if n == 0 {
            break buf.len();
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let path = request_line.next().unwrap_or_default().to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    RecordedRequest {
        method,
        path,
        headers,
        body: String::from_utf8_lossy(&buf[header_end..]).to_string(),
    }
}

fn client(base_url: String, token: Option<&str>) -> ProctorApiClient {
    ProctorApiClient::new(ApiConfig {
        base_url,
        bearer_token: token.map(str::to_string),
        timeout_ms: 5_000,
        ..ApiConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn posts_events_with_bearer_token_and_reads_risk() {
    let (base, seen) = spawn_backend(|_| (201, r#"{"risk": 0.42, "id": 17}"#)).await;
    let api = client(base, Some("tok-123"));

    let event = ProctorEvent::new("session-9", ProctorEventType::TabSwitch, 0.8);
    let receipt = api.send_event(&event).await.unwrap();
    assert_eq!(receipt.risk, 0.42);
    assert_eq!(receipt.event_id, Some(serde_json::json!(17)));

    let requests = seen.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/api/proctor-events");
    assert_eq!(request.header("authorization"), Some("Bearer tok-123"));

    let body: Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(body["session_id"], "session-9");
    assert_eq!(body["event_type"], "TAB_SWITCH");
    assert_eq!(body["confidence"], 0.8);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn works_through_the_sink_trait_without_a_token() {
    let (base, seen) = spawn_backend(|_| (200, "")).await;
    let sink: Arc<dyn EventSink> = Arc::new(client(base, None));

    let event = ProctorEvent::new("s", ProctorEventType::Disqualified, 1.0);
    let receipt = sink.send_event(&event).await.unwrap();
    assert_eq!(receipt.risk, 0.0);

    let request = seen.lock().unwrap()[0].clone();
    assert_eq!(request.header("authorization"), None);
    assert!(request.body.contains(r#""event_type":"disqualified""#));
}

#[tokio::test]
async fn server_errors_carry_the_backend_detail() {
    let (base, _) = spawn_backend(|_| (500, r#"{"detail": "boom"}"#)).await;
    let api = client(base, None);

    let event = ProctorEvent::new("s", ProctorEventType::NoFace, 0.7);
    let err = api.send_event(&event).await.unwrap_err();
    assert_eq!(
        err,
        ReportError::Status {
            status: 500,
            message: "boom".into()
        }
    );
    assert!(err.is_server_error());
    assert!(!err.is_auth_error());
}

#[tokio::test]
async fn unauthorized_is_an_auth_error() {
    let (base, _) = spawn_backend(|_| (401, r#"{"message": "token expired"}"#)).await;
    let api = client(base, Some("stale"));

    let event = ProctorEvent::new("s", ProctorEventType::TabSwitch, 1.0);
    let err = api.send_event(&event).await.unwrap_err();
    assert!(err.is_auth_error());
    assert!(err.is_client_error());
    assert!(err.to_string().contains("token expired"));
}

#[tokio::test]
async fn garbage_body_is_a_decode_error() {
    let (base, _) = spawn_backend(|_| (200, "not json")).await;
    let api = client(base, None);

    let event = ProctorEvent::new("s", ProctorEventType::TabSwitch, 1.0);
    assert!(matches!(
        api.send_event(&event).await,
        Err(ReportError::Decode(_))
    ));
}

#[tokio::test]
async fn history_accepts_wrapped_and_bare_bodies() {
    let (base, seen) = spawn_backend(|request| {
        if request.path.ends_with("/events/wrapped/") {
            (200, r#"{"events": [{"event_type": "TAB_SWITCH"}, {"event_type": "NO_FACE"}]}"#)
        } else {
            (200, r#"[{"event_type": "CAMERA_DENIED"}]"#)
        }
    })
    .await;
    let api = client(base, None);

    let wrapped = api.event_history("wrapped").await.unwrap();
    assert_eq!(wrapped.len(), 2);
    assert_eq!(wrapped[1]["event_type"], "NO_FACE");

    let bare = api.event_history("bare").await.unwrap();
    assert_eq!(bare.len(), 1);

    let paths: Vec<_> = seen.lock().unwrap().iter().map(|r| r.path.clone()).collect();
    assert_eq!(paths, vec!["/api/events/wrapped/", "/api/events/bare/"]);
}

#[tokio::test]
async fn end_session_posts_to_the_session_endpoint() {
    let (base, seen) = spawn_backend(|_| (200, r#"{"status": "ended"}"#)).await;
    let api = client(base, Some("t"));

    let body = api.end_session("abc").await.unwrap();
    assert_eq!(body["status"], "ended");

    let request = seen.lock().unwrap()[0].clone();
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/api/session/abc/end/");
}

#[tokio::test]
async fn health_check_reports_reachability() {
    let (base, _) = spawn_backend(|request| {
        if request.path == "/api/health" {
            (200, r#"{"ok": true}"#)
        } else {
            (404, "{}")
        }
    })
    .await;
    assert!(client(base, None).check_health().await);

    let closed = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = closed.local_addr().unwrap();
    drop(closed);
    assert!(!client(format!("http://{addr}/api"), None).check_health().await);
}

#[tokio::test]
async fn session_status_reads_the_status_endpoint() {
    let (base, seen) = spawn_backend(|_| (200, r#"{"status": "active", "risk": 0.2}"#)).await;
    let api = client(base, Some("t"));

    let status = api.session_status("abc").await.unwrap();
    assert_eq!(status["status"], "active");

    let request = seen.lock().unwrap()[0].clone();
    assert_eq!(request.method, "GET");
    assert_eq!(request.path, "/api/session/abc/status/");
    assert_eq!(request.header("authorization"), Some("Bearer t"));
}

#[tokio::test]
async fn batch_keeps_input_order_and_counts_failures() {
    let (base, seen) = spawn_backend(|request| {
        if request.body.contains("NO_FACE") {
            (500, r#"{"detail": "camera pipeline down"}"#)
        } else {
            (201, r#"{"risk": 0.3}"#)
        }
    })
    .await;
    let api = client(base, None);

    let events = vec![
        ProctorEvent::new("s", ProctorEventType::TabSwitch, 1.0),
        ProctorEvent::new("s", ProctorEventType::NoFace, 0.7),
        ProctorEvent::new("s", ProctorEventType::ViolationWarning, 1.0),
    ];
    let report = api.send_batch_events(&events).await;

    assert_eq!(report.total(), 3);
    assert_eq!(report.successful(), 2);
    assert_eq!(report.failed(), 1);
    assert!(!report.is_success());
    assert!(report.results[0].is_ok());
    assert!(matches!(
        &report.results[1],
        Err(ReportError::Status { status: 500, .. })
    ));
    assert_eq!(seen.lock().unwrap().len(), 3);
}
