#![allow(dead_code)]

use std::{
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use expensehub::{
    config::Config,
    create_router,
    models::{Authenticator, MockDirectory, Role},
    AppState,
};

pub const TEST_SECRET: &str = "test-secret";

/// A request the fake backend received.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl RecordedCall {
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn body_json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("recorded body is JSON")
    }
}

#[derive(Clone, Default)]
struct FakeState {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    unauthorized: Arc<AtomicBool>,
    failing: Arc<AtomicBool>,
}

/// Stand-in for the expense backend, bound to an ephemeral local port.
pub struct FakeBackend {
    pub api_base: String,
    state: FakeState,
}

impl FakeBackend {
    pub async fn spawn() -> Self {
        let state = FakeState::default();
        let app = Router::new().fallback(fake_handler).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            api_base: format!("http://{}/api", addr),
            state,
        }
    }

    /// Every later request gets a 401.
    pub fn reject_all(&self) {
        self.state.unauthorized.store(true, Ordering::SeqCst);
    }

    /// Every later request gets a 500 with an error body.
    pub fn fail_all(&self) {
        self.state.failing.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, method: Method, path: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == method && c.path == path)
            .collect()
    }
}

async fn fake_handler(State(state): State<FakeState>, request: Request) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let header_value = |headers: &HeaderMap, name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string())
    };
    let authorization = header_value(request.headers(), header::AUTHORIZATION);
    let content_type = header_value(request.headers(), header::CONTENT_TYPE);
    let body = to_bytes(request.into_body(), usize::MAX).await.unwrap().to_vec();

    state.calls.lock().unwrap().push(RecordedCall {
        method: method.clone(),
        path: path.clone(),
        authorization,
        content_type,
        body,
    });

    if state.unauthorized.load(Ordering::SeqCst) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"detail": "Invalid secret"}))).into_response();
    }
    if state.failing.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "backend exploded"}))).into_response();
    }

    match (method, path.as_str()) {
        (Method::GET, "/api/users/") => Json(json!([
            {"id": 1, "name": "Mia Manager", "role": "Manager"},
            {"id": 2, "username": "marc", "role": "Employee"},
            {"id": 3, "name": "Ada Admin", "role": "Admin"}
        ]))
        .into_response(),
        (Method::POST, "/api/approval-rules/") => (StatusCode::CREATED, Json(json!({"id": 10}))).into_response(),
        (Method::GET, "/api/expenses/my/") => Json(json!([
            {"id": 5, "amount": "42.00", "category": "travel", "status": "approved",
             "created_at": "2024-04-01T10:00:00Z"},
            {"id": 6, "amount": "9.99", "category": "office",
             "created_at": "2024-04-02T10:00:00Z"}
        ]))
        .into_response(),
        (Method::POST, "/api/expenses/") => (StatusCode::CREATED, Json(json!({"id": 7}))).into_response(),
        (Method::GET, "/api/expenses/pending/") => Json(json!([
            {"id": 1, "description": "Taxi to airport", "category": "travel",
             "status": "pending", "amount": "20.00", "user": {"name": "Alice"}},
            {"id": 2, "description": "Team lunch", "category": "meals",
             "status": "pending", "amount": "75.25", "user": null}
        ]))
        .into_response(),
        (Method::POST, p) if p.starts_with("/api/expenses/") => {
            // Whatever the body says, the front must not re-fetch.
            Json(json!({"ok": true, "pending": [1, 2]})).into_response()
        }
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Counts authenticator calls so tests can prove no check happened.
#[derive(Default)]
pub struct CountingAuthenticator {
    pub calls: AtomicUsize,
}

impl Authenticator for CountingAuthenticator {
    fn authenticate(&self, email: &str, password: &str) -> Option<Role> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        MockDirectory.authenticate(email, password)
    }
}

pub fn test_config(api_base: &str) -> Config {
    Config {
        api_base: api_base.to_string(),
        jwt_secret: TEST_SECRET.to_string(),
        ocr_delay: Duration::from_millis(10),
        ..Config::default()
    }
}

pub async fn test_app() -> (Router, FakeBackend) {
    let backend = FakeBackend::spawn().await;
    let app = create_router(AppState::new(test_config(&backend.api_base)));
    (app, backend)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn location(&self) -> Option<&str> {
        self.headers.get(header::LOCATION).and_then(|v| v.to_str().ok())
    }

    pub fn set_cookies(&self) -> Vec<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(|v| v.to_string())
            .collect()
    }

    /// `name=value` of a cookie this response set, ignoring removals.
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.set_cookies()
            .into_iter()
            .filter_map(|c| c.split(';').next().map(|s| s.trim().to_string()))
            .find(|pair| pair.starts_with(&format!("{}=", name)) && pair.len() > name.len() + 1)
    }

    pub fn removes_cookie(&self, name: &str) -> bool {
        self.set_cookies()
            .iter()
            .any(|c| c.starts_with(&format!("{}=;", name)) && c.contains("Max-Age=0"))
    }

    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("response is JSON")
    }
}

pub async fn send(app: &Router, request: axum::http::Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    TestResponse {
        status,
        headers,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    }
}

pub async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> TestResponse {
    let mut builder = axum::http::Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    send(app, builder.body(Body::empty()).unwrap()).await
}

pub async fn post_form(app: &Router, uri: &str, body: &str, cookie: Option<&str>) -> TestResponse {
    let mut builder = axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    send(app, builder.body(Body::from(body.to_string())).unwrap()).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> TestResponse {
    let request = axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

const BOUNDARY: &str = "expensehub-test-boundary";

/// Builds a multipart body from text fields and an optional file.
pub fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((name, file_name, data)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: image/png\r\n\r\n",
                BOUNDARY, name, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub async fn post_multipart(app: &Router, uri: &str, body: Vec<u8>, cookie: Option<&str>) -> TestResponse {
    let mut builder = axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        );
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    send(app, builder.body(Body::from(body)).unwrap()).await
}

/// Logs in with a demo account and returns the session cookie pair.
pub async fn login_as(app: &Router, email: &str, password: &str) -> String {
    let body = format!(
        "email={}&password={}",
        urlencoding::encode(email),
        urlencoding::encode(password)
    );
    let response = post_form(app, "/login", &body, None).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER, "login failed: {}", response.body);
    response.cookie("auth_token").expect("login sets the session cookie")
}
