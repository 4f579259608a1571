//! Router-level tests for the webhook receiver.
//!
//! The analyzer and channel are mocks, so these exercise request parsing,
//! status mapping and the panic guard without any outbound traffic.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use alertbridge_core::{Analyzer, Locale};
use alertbridge_notify::{
    AlertDispatcher, AlertMessage, ContentRenderer, NotificationChannel, NotifyError, TemplateSet,
};
use alertbridge_server::{build_router, AppState};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

#[derive(Clone, Copy, PartialEq)]
enum Reply {
    Accept,
    Reject,
    Panic,
}

struct MockChannel {
    sent: Arc<Mutex<Vec<AlertMessage>>>,
    reply: Reply,
}

#[async_trait::async_trait]
impl NotificationChannel for MockChannel {
    async fn deliver(&self, message: &AlertMessage) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(message.clone());
        match self.reply {
            Reply::Accept => Ok(()),
            Reply::Reject => Err(NotifyError::Rejected {
                channel: "mock",
                message: "StatusCode 1: x".into(),
            }),
            Reply::Panic => panic!("webhook client exploded"),
        }
    }

    fn channel_name(&self) -> &str {
        "feishu"
    }
}

struct MockAnalyzer {
    calls: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<Value>>>,
}

#[async_trait::async_trait]
impl Analyzer for MockAnalyzer {
    async fn analyze(&self, batch: &Value) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(batch.clone());
        Some("restart the exporter".into())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

struct TestApp {
    router: Router,
    sent: Arc<Mutex<Vec<AlertMessage>>>,
    analyzer_calls: Arc<AtomicUsize>,
    analyzed: Arc<Mutex<Vec<Value>>>,
}

fn app(reply: Reply) -> TestApp {
    let sent = Arc::new(Mutex::new(Vec::new()));
    let analyzer_calls = Arc::new(AtomicUsize::new(0));
    let analyzed = Arc::new(Mutex::new(Vec::new()));

    let templates = TemplateSet {
        firing: vec!["**{alertname}** {status}\n".into(), "ends: {ends_at}\n".into()],
        resolved: vec!["**{alertname}** {status}\n".into()],
    };
    let dispatcher = AlertDispatcher::new(
        ContentRenderer::new(Arc::new(templates), Locale::Zh),
        Box::new(MockChannel {
            sent: sent.clone(),
            reply,
        }),
        Arc::new(MockAnalyzer {
            calls: analyzer_calls.clone(),
            seen: analyzed.clone(),
        }),
    );

    TestApp {
        router: build_router(Arc::new(AppState::new(dispatcher))),
        sent,
        analyzer_calls,
        analyzed,
    }
}

async fn post_alert(router: Router, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/handle_alert")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn high_cpu(status: &str) -> Value {
    json!({
        "status": status,
        "labels": {"alertname": "HighCPU", "instance": "web-1"},
        "annotations": {},
        "startsAt": "2024-01-01T00:00:00",
        "endsAt": "0001-01-01T00:00:00Z",
        "fingerprint": "abc"
    })
}

#[tokio::test]
async fn firing_batch_is_analyzed_and_delivered() {
    let t = app(Reply::Accept);
    let body = json!({"receiver": "ops", "alerts": [high_cpu("firing")]});

    let (status, json) = post_alert(t.router, &body.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"status": "success"}));

    assert_eq!(t.analyzer_calls.load(Ordering::SeqCst), 1);
    assert_eq!(t.analyzed.lock().unwrap()[0], body);

    let sent = t.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].title, "🚨 告警通知");
    assert_eq!(sent[0].content, "**HighCPU** FIRING\nends: 告警持续中，尚未恢复\n");
    assert!(sent[0].analysis.as_deref().unwrap().ends_with("restart the exporter"));
}

#[tokio::test]
async fn resolved_batch_skips_analysis() {
    let t = app(Reply::Accept);
    let body = json!({"alerts": [high_cpu("resolved")]});

    let (status, json) = post_alert(t.router, &body.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "success");
    assert_eq!(t.analyzer_calls.load(Ordering::SeqCst), 0);
    assert_eq!(t.sent.lock().unwrap()[0].title, "✅ 告警恢复");
}

#[tokio::test]
async fn empty_or_missing_alerts_are_ignored() {
    for body in [r#"{"alerts": []}"#, r#"{"receiver": "ops"}"#] {
        let t = app(Reply::Accept);
        let (status, json) = post_alert(t.router, body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({"status": "ignored"}));
        assert_eq!(t.analyzer_calls.load(Ordering::SeqCst), 0);
        assert!(t.sent.lock().unwrap().is_empty());
    }
}

#[tokio::test]
async fn channel_rejection_reports_failed() {
    let t = app(Reply::Reject);
    let body = json!({"alerts": [high_cpu("firing")]});
    let (status, json) = post_alert(t.router, &body.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"status": "failed"}));
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    for body in ["{not json", "[1, 2]", "\"alerts\""] {
        let t = app(Reply::Accept);
        let (status, json) = post_alert(t.router, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, json!({"status": "error", "message": "Invalid JSON"}));
    }
}

#[tokio::test]
async fn wrongly_shaped_alerts_are_server_errors() {
    let t = app(Reply::Accept);
    let (status, json) = post_alert(t.router, r#"{"alerts": "HighCPU"}"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["status"], "error");
    assert!(json["message"].as_str().unwrap().starts_with("invalid alerts"));
}

#[tokio::test]
async fn handler_panic_becomes_500() {
    let t = app(Reply::Panic);
    let body = json!({"alerts": [high_cpu("firing")]});
    let (status, json) = post_alert(t.router, &body.to_string()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json,
        json!({"status": "error", "message": "webhook client exploded"})
    );
}

#[tokio::test]
async fn health_reports_channel_and_version() {
    let t = app(Reply::Accept);
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = t.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["channel"], "feishu");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn null_alert_fields_render_with_defaults() {
    let t = app(Reply::Accept);
    let body = r#"{"alerts": [{"status": "firing", "labels": null, "annotations": null, "endsAt": null}]}"#;
    let (status, json) = post_alert(t.router, body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"status": "success"}));
    assert!(t.sent.lock().unwrap()[0].content.starts_with("**告警** FIRING\n"));
}
