//! Shared test utilities: an in-process mock of the coach backend.

#![allow(dead_code)]

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TOKEN: &str = "test-token";

/// How the mock answers message requests.
#[derive(Clone)]
pub enum Behavior {
    Reply,
    Fail(StatusCode, &'static str),
    Delay(Duration),
}

pub struct MockBackend {
    behavior: Behavior,
    calls: AtomicUsize,
    clears: AtomicUsize,
    bodies: Mutex<Vec<Value>>,
    paths: Mutex<Vec<String>>,
    auth_headers: Mutex<Vec<Option<String>>>,
}

impl MockBackend {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }

    pub fn bodies(&self) -> Vec<Value> {
        self.bodies.lock().unwrap().clone()
    }

    pub fn last_body(&self) -> Value {
        self.bodies().last().cloned().expect("no request body recorded")
    }

    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }

    pub fn auth_headers(&self) -> Vec<Option<String>> {
        self.auth_headers.lock().unwrap().clone()
    }

    fn record(&self, path: &str, headers: &HeaderMap, body: Value) -> usize {
        self.paths.lock().unwrap().push(path.to_string());
        self.auth_headers.lock().unwrap().push(
            headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        );
        self.bodies.lock().unwrap().push(body);
        self.calls.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// Starts the mock on an ephemeral port and returns its base URL.
pub async fn spawn_backend(behavior: Behavior) -> (String, Arc<MockBackend>) {
    let state = Arc::new(MockBackend {
        behavior,
        calls: AtomicUsize::new(0),
        clears: AtomicUsize::new(0),
        bodies: Mutex::new(Vec::new()),
        paths: Mutex::new(Vec::new()),
        auth_headers: Mutex::new(Vec::new()),
    });

    let app = Router::new()
        .route("/api/ai-coach/conversation", get(conversation_handler))
        .route(
            "/api/ai-coach/conversation/messages-with-data",
            post(with_data_handler),
        )
        .route("/api/ai-coach/conversation/messages", post(message_handler))
        .route("/api/ai-coach/conversation/clear", post(clear_handler))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind mock backend");
    let addr: SocketAddr = listener.local_addr().expect("no local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock backend stopped");
    });

    (format!("http://{}", addr), state)
}

/// A base URL where nothing is listening.
pub async fn unused_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind");
    let addr = listener.local_addr().expect("no local address");
    drop(listener);
    format!("http://{}", addr)
}

fn reply_body(message: &str, n: usize) -> Value {
    json!({
        "conversation_uuid": "conv-42",
        "user_message": {
            "uuid": uuid::Uuid::new_v4().to_string(),
            "role": "user",
            "content": message,
            "created_at": "2026-02-07T08:00:00Z"
        },
        "assistant_message": {
            "uuid": uuid::Uuid::new_v4().to_string(),
            "role": "assistant",
            "content": format!("Coach reply #{}", n),
            "created_at": "2026-02-07T08:00:02Z",
            "input_tokens": 100,
            "output_tokens": 20
        }
    })
}

async fn respond(state: &MockBackend, message: &str, n: usize) -> Response {
    match &state.behavior {
        Behavior::Reply => Json(reply_body(message, n)).into_response(),
        Behavior::Fail(status, body) => (*status, *body).into_response(),
        Behavior::Delay(delay) => {
            tokio::time::sleep(*delay).await;
            Json(reply_body(message, n)).into_response()
        }
    }
}

async fn with_data_handler(
    State(state): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let message = body["message"].as_str().unwrap_or_default().to_string();
    let n = state.record("/api/ai-coach/conversation/messages-with-data", &headers, body);
    respond(&state, &message, n).await
}

async fn message_handler(
    State(state): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let message = body["message"].as_str().unwrap_or_default().to_string();
    let n = state.record("/api/ai-coach/conversation/messages", &headers, body);
    respond(&state, &message, n).await
}

async fn conversation_handler(headers: HeaderMap) -> Response {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", TOKEN));
    if !authorized {
        return (StatusCode::UNAUTHORIZED, "missing token").into_response();
    }
    Json(json!({
        "uuid": "conv-42",
        "messages": [
            { "uuid": "m-1", "role": 0, "content": "How did I sleep?" },
            { "uuid": "m-2", "role": 1, "content": "Quite well.", "input_tokens": 50, "output_tokens": 10 }
        ]
    }))
    .into_response()
}

async fn clear_handler(State(state): State<Arc<MockBackend>>) -> Response {
    state.clears.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "success": true })).into_response()
}
