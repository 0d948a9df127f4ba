//! In-process stand-in for the auth service, bound to an ephemeral port.

use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::probe::TEST_PASSWORD;

pub const STUB_TOKEN: &str = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.stub-payload.stub-signature";

/// How the stub answers each endpoint
#[derive(Debug, Clone)]
pub struct StubBehavior {
    pub health_status: u16,
    pub health_delay: Duration,
    /// Answer health with plain text instead of JSON
    pub health_text: bool,
    pub register_status: u16,
    pub register_delay: Duration,
    /// Answer registration with plain text instead of JSON
    pub register_text: bool,
    /// Echo this email instead of the submitted one
    pub echo_email: Option<String>,
    /// Answer 201 with an empty `data` object
    pub omit_user: bool,
    pub login_status: u16,
    pub login_delay: Duration,
    /// `None` leaves `accessToken` out of the login response
    pub token: Option<String>,
}

impl Default for StubBehavior {
    fn default() -> Self {
        Self {
            health_status: 200,
            health_delay: Duration::ZERO,
            health_text: false,
            register_status: 201,
            register_delay: Duration::ZERO,
            register_text: false,
            echo_email: None,
            omit_user: false,
            login_status: 200,
            login_delay: Duration::ZERO,
            token: Some(STUB_TOKEN.to_string()),
        }
    }
}

#[derive(Debug, Default)]
pub struct StubLog {
    /// Endpoint names in arrival order
    pub calls: Vec<String>,
    /// Endpoints that received `Content-Type: application/json`
    pub json_content_type: Vec<String>,
    /// Emails the stub has accepted as registered
    pub registered: Vec<(String, String)>,
    /// Emails submitted to login
    pub login_emails: Vec<String>,
}

struct StubState {
    behavior: StubBehavior,
    log: Mutex<StubLog>,
}

impl StubState {
    fn record(&self, endpoint: &str, headers: &HeaderMap) {
        let mut log = self.log.lock().unwrap();
        log.calls.push(endpoint.to_string());
        let is_json = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map_or(false, |v| v.starts_with("application/json"));
        if is_json {
            log.json_content_type.push(endpoint.to_string());
        }
    }
}

pub struct StubServer {
    pub base_url: String,
    state: Arc<StubState>,
}

impl StubServer {
    pub fn calls(&self) -> Vec<String> {
        self.state.log.lock().unwrap().calls.clone()
    }

    pub fn login_emails(&self) -> Vec<String> {
        self.state.log.lock().unwrap().login_emails.clone()
    }

    pub fn saw_json_content_type(&self, endpoint: &str) -> bool {
        self.state
            .log
            .lock()
            .unwrap()
            .json_content_type
            .iter()
            .any(|e| e == endpoint)
    }
}

/// Start the stub; its base URL ends in `/api` like the real service
pub async fn spawn(behavior: StubBehavior) -> StubServer {
    let state = Arc::new(StubState {
        behavior,
        log: Mutex::new(StubLog::default()),
    });

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    StubServer {
        base_url: format!("http://{}/api", addr),
        state,
    }
}

/// Base URL of a port nothing listens on
pub async fn unused_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/api", addr)
}

fn status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

async fn health(State(state): State<Arc<StubState>>, headers: HeaderMap) -> Response {
    state.record("health", &headers);
    pause(state.behavior.health_delay).await;
    let code = status(state.behavior.health_status);
    if state.behavior.health_text {
        return (code, "OK").into_response();
    }
    (
        code,
        Json(json!({ "status": "OK", "timestamp": "2026-10-19T00:00:00Z" })),
    )
        .into_response()
}

async fn register(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record("register", &headers);
    let behavior = &state.behavior;
    pause(behavior.register_delay).await;

    if behavior.register_status != 201 {
        return (
            status(behavior.register_status),
            Json(json!({ "success": false, "error": "Email already registered" })),
        )
            .into_response();
    }
    if behavior.register_text {
        return (StatusCode::CREATED, "Registration successful").into_response();
    }

    let submitted = body["email"].as_str().unwrap_or_default().trim().to_lowercase();
    let email = behavior.echo_email.clone().unwrap_or(submitted);
    let password = body["password"].as_str().unwrap_or_default().to_string();
    state
        .log
        .lock()
        .unwrap()
        .registered
        .push((email.clone(), password));

    if behavior.omit_user {
        return (
            StatusCode::CREATED,
            Json(json!({ "success": true, "data": {} })),
        )
            .into_response();
    }

    (
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Registration successful",
            "data": {
                "userId": 42,
                "user": {
                    "id": 42,
                    "email": email,
                    "firstName": body["firstName"],
                    "lastName": body["lastName"],
                    "role": body["role"],
                },
                "tokens": { "accessToken": STUB_TOKEN, "expiresIn": "24h" }
            }
        })),
    )
        .into_response()
}

async fn login(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.record("login", &headers);
    let behavior = &state.behavior;
    pause(behavior.login_delay).await;
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default();

    let known = {
        let mut log = state.log.lock().unwrap();
        log.login_emails.push(email.clone());
        log.registered
            .iter()
            .any(|(e, p)| *e == email && p == password && p == TEST_PASSWORD)
    };

    if behavior.login_status != 200 || !known {
        let code = if behavior.login_status != 200 {
            behavior.login_status
        } else {
            401
        };
        return (
            status(code),
            Json(json!({ "success": false, "error": "Invalid email or password" })),
        );
    }

    let mut tokens = json!({ "expiresIn": "24h" });
    if let Some(token) = &behavior.token {
        tokens["accessToken"] = json!(token);
    }

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": "Login successful",
            "data": {
                "user": { "id": 42, "email": email, "role": "landlord" },
                "tokens": tokens
            }
        })),
    )
}
