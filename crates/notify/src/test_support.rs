//! Throwaway webhook endpoint for channel tests.

use std::sync::{Arc, Mutex};

use axum::http::{header, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;

pub(crate) struct MockWebhook {
    pub url: String,
    received: Arc<Mutex<Vec<Value>>>,
}

impl MockWebhook {
    /// Every JSON body posted so far.
    pub fn received(&self) -> Vec<Value> {
        self.received.lock().unwrap().clone()
    }
}

/// Serve `POST /hook` on an ephemeral port, answering every request with
/// `status` and the literal `body`.
pub(crate) async fn spawn_webhook(status: StatusCode, body: &str) -> MockWebhook {
    let received = Arc::new(Mutex::new(Vec::new()));
    let captured = received.clone();
    let body = body.to_string();

    let app = Router::new().route(
        "/hook",
        post(move |Json(payload): Json<Value>| {
            let captured = captured.clone();
            let body = body.clone();
            async move {
                captured.lock().unwrap().push(payload);
                (status, [(header::CONTENT_TYPE, "application/json")], body)
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockWebhook {
        url: format!("http://{addr}/hook"),
        received,
    }
}
