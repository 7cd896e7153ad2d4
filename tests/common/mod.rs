#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    body::Body,
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use futures::StreamExt;
use once_cell::sync::Lazy;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use vidcat::storage::memory::MemoryStore;
use vidcat::{AppState, Config};

pub const ADMIN_EMAIL: &str = "ana@example.com";
pub const USER_EMAIL: &str = "bo@example.com";
pub const PASSWORD: &str = "Secret123!";

/// Builds an unsigned three-segment token carrying `claims`.
pub fn make_token(claims: Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{}.{}.sig", header, payload)
}

static ADMIN_TOKEN: Lazy<String> =
    Lazy::new(|| make_token(json!({ "username": "ana", "role": "admin", "email": ADMIN_EMAIL })));

static USER_TOKEN: Lazy<String> =
    Lazy::new(|| make_token(json!({ "username": "bo", "role": "user", "email": USER_EMAIL })));

pub fn admin_token() -> String {
    String::clone(&ADMIN_TOKEN)
}

pub fn user_token() -> String {
    String::clone(&USER_TOKEN)
}

/// Shared state of the fake catalog server.
#[derive(Default)]
pub struct Backend {
    /// Every request as `METHOD /path`.
    pub calls: Mutex<Vec<String>>,
    pub videos: Mutex<Vec<Value>>,
    pub users: Mutex<Vec<Value>>,
    pub login_delay: Mutex<Option<Duration>>,
    pub users_delay: Mutex<Option<Duration>>,
    /// When set, media streams drop the connection after the first chunk.
    pub break_streams: Mutex<bool>,
    /// Content type and size of the last uploaded `video` part.
    pub last_upload: Mutex<Option<(String, usize)>>,
    /// When set, every admin route and any bearer-carrying `/videos` call answers 401.
    pub reject_tokens: Mutex<bool>,
}

impl Backend {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

pub struct TestContext {
    pub backend: Arc<Backend>,
    pub base_url: String,
    pub store: Arc<MemoryStore>,
    pub state: AppState,
}

impl TestContext {
    /// Starts a fake server with two users and two videos, and a client pointed at it.
    pub async fn new() -> Self {
        let backend = Arc::new(Backend::default());
        *backend.videos.lock().unwrap() = vec![
            json!({ "id": 1, "title": "Intro", "category": "docs", "file_path": "intro.mp4", "duration": "1:30", "size": "12MB" }),
            json!({ "id": 2, "title": "Deep dive", "category": "talks", "file_path": "deep.mp4" }),
        ];
        *backend.users.lock().unwrap() = vec![
            json!({ "id": 1, "username": "ana", "email": ADMIN_EMAIL, "role": "admin" }),
            json!({ "id": 2, "username": "bo", "email": USER_EMAIL, "role": "user" }),
        ];

        let addr = spawn_server(backend.clone()).await;
        let base_url = format!("http://{}", addr);
        let store = Arc::new(MemoryStore::new());
        let state = client_state(&base_url, store.clone());

        Self {
            backend,
            base_url,
            store,
            state,
        }
    }
}

/// A client with in-memory storage, pointed at `base_url`.
pub fn client_state(base_url: &str, store: Arc<MemoryStore>) -> AppState {
    let config = Config {
        api_base_url: base_url.to_string(),
        notification_dismiss: Duration::from_secs(5),
        ..Config::default()
    };
    AppState::new(config, store)
}

pub async fn spawn_server(backend: Arc<Backend>) -> SocketAddr {
    let app = Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/verify", post(verify))
        .route("/videos", get(list_videos))
        .route("/videos/{id}", get(get_video))
        .route("/videos/stream/{id}", get(stream_video))
        .route("/admin/upload", post(upload))
        .route("/admin/users", get(list_users))
        .route("/admin/users/{id}", delete(delete_user))
        .route("/admin/users/{id}/role", put(set_role))
        .route("/admin/videos/{id}", delete(delete_video))
        .with_state(backend);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "message": text }))).into_response()
}

fn is_admin(backend: &Backend, headers: &HeaderMap) -> bool {
    if *backend.reject_tokens.lock().unwrap() {
        return false;
    }
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.strip_prefix("Bearer ") == Some(ADMIN_TOKEN.as_str()))
        .unwrap_or(false)
}

async fn login(State(backend): State<Arc<Backend>>, Json(body): Json<Value>) -> Response {
    backend.record("POST /login".to_string());
    let delay = *backend.login_delay.lock().unwrap();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let token = match (body["email"].as_str(), body["password"].as_str()) {
        (Some(ADMIN_EMAIL), Some(PASSWORD)) => admin_token(),
        (Some(USER_EMAIL), Some(PASSWORD)) => user_token(),
        (Some("garbled@example.com"), Some(PASSWORD)) => "not-a-token".to_string(),
        _ => return message(StatusCode::UNAUTHORIZED, "Invalid credentials"),
    };
    Json(json!({ "token": token })).into_response()
}

async fn register(State(backend): State<Arc<Backend>>, Json(body): Json<Value>) -> Response {
    backend.record("POST /register".to_string());
    if body["email"].as_str() == Some(ADMIN_EMAIL) {
        return (StatusCode::CONFLICT, Json(json!({ "error": "Email already registered" }))).into_response();
    }
    message(StatusCode::CREATED, "Check your inbox to verify your account.")
}

async fn verify(State(backend): State<Arc<Backend>>, Json(body): Json<Value>) -> Response {
    backend.record("POST /verify".to_string());
    match body["token"].as_str() {
        Some("good-token") => message(StatusCode::OK, "Email verified."),
        _ => message(StatusCode::BAD_REQUEST, "Invalid or expired token"),
    }
}

async fn list_videos(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    backend.record("GET /videos".to_string());
    if headers.contains_key("authorization") && *backend.reject_tokens.lock().unwrap() {
        return message(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    Json(Value::Array(backend.videos.lock().unwrap().clone())).into_response()
}

async fn get_video(State(backend): State<Arc<Backend>>, Path(id): Path<i64>) -> Response {
    backend.record(format!("GET /videos/{}", id));
    let video = backend
        .videos
        .lock()
        .unwrap()
        .iter()
        .find(|v| v["id"].as_i64() == Some(id))
        .cloned();
    match video {
        Some(video) => Json(video).into_response(),
        None => message(StatusCode::NOT_FOUND, "Video not found"),
    }
}

async fn stream_video(State(backend): State<Arc<Backend>>, Path(id): Path<i64>) -> Response {
    backend.record(format!("GET /videos/stream/{}", id));
    if *backend.break_streams.lock().unwrap() {
        let chunks = futures::stream::iter(vec![
            Ok(vec![7u8; 512]),
            Err(std::io::Error::other("connection dropped")),
        ])
        .then(|chunk| async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            chunk
        });
        return (StatusCode::OK, Body::from_stream(chunks)).into_response();
    }
    (StatusCode::OK, vec![7u8; 1024]).into_response()
}

async fn upload(State(backend): State<Arc<Backend>>, headers: HeaderMap, mut multipart: Multipart) -> Response {
    backend.record("POST /admin/upload".to_string());
    if !is_admin(&backend, &headers) {
        return message(StatusCode::UNAUTHORIZED, "Unauthorized");
    }

    let mut title = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("title") => title = field.text().await.ok(),
            Some("video") => {
                let content_type = field.content_type().unwrap_or_default().to_string();
                let size = field.bytes().await.map(|b| b.len()).unwrap_or_default();
                *backend.last_upload.lock().unwrap() = Some((content_type, size));
            }
            _ => {
                let _ = field.bytes().await;
            }
        }
    }

    let mut videos = backend.videos.lock().unwrap();
    let id = videos.len() as i64 + 1;
    videos.push(json!({ "id": id, "title": title.unwrap_or_default(), "category": "new", "file_path": "new.mp4" }));
    message(StatusCode::CREATED, "Video uploaded successfully.")
}

async fn list_users(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    backend.record("GET /admin/users".to_string());
    let delay = *backend.users_delay.lock().unwrap();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    if !is_admin(&backend, &headers) {
        return message(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    Json(Value::Array(backend.users.lock().unwrap().clone())).into_response()
}

async fn delete_user(State(backend): State<Arc<Backend>>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    backend.record(format!("DELETE /admin/users/{}", id));
    if !is_admin(&backend, &headers) {
        return message(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    backend.users.lock().unwrap().retain(|u| u["id"].as_i64() != Some(id));
    StatusCode::NO_CONTENT.into_response()
}

async fn set_role(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    backend.record(format!("PUT /admin/users/{}/role", id));
    if !is_admin(&backend, &headers) {
        return message(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    let mut users = backend.users.lock().unwrap();
    match users.iter_mut().find(|u| u["id"].as_i64() == Some(id)) {
        Some(user) => {
            user["role"] = body["role"].clone();
            message(StatusCode::OK, "Role updated")
        }
        None => message(StatusCode::NOT_FOUND, "User not found"),
    }
}

async fn delete_video(State(backend): State<Arc<Backend>>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    backend.record(format!("DELETE /admin/videos/{}", id));
    if !is_admin(&backend, &headers) {
        return message(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    backend.videos.lock().unwrap().retain(|v| v["id"].as_i64() != Some(id));
    message(StatusCode::OK, "Video deleted")
}
