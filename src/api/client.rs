use std::ffi::OsString;
use std::path::{Path, PathBuf};

use futures::StreamExt;
use http::{Method, StatusCode, header};
use reqwest::multipart::{Form, Part};
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;

use crate::api::payloads::*;
use crate::error::{AppError, Result};
use crate::models::session::Role;
use crate::models::user::User;
use crate::models::video::Video;

/// The body attached to a request.
pub enum RequestBody {
    Empty,
    Json(Vec<u8>),
    Multipart(Form),
}

/// Options for a single API call.
pub struct RequestOptions<'a> {
    pub method: Method,
    pub token: Option<&'a str>,
    pub body: RequestBody,
}

impl<'a> RequestOptions<'a> {
    pub fn get() -> Self {
        Self {
            method: Method::GET,
            token: None,
            body: RequestBody::Empty,
        }
    }

    pub fn delete() -> Self {
        Self {
            method: Method::DELETE,
            ..Self::get()
        }
    }

    /// A request carrying `payload` as JSON.
    pub fn json<T: Serialize>(method: Method, payload: &T) -> Result<Self> {
        Ok(Self {
            method,
            token: None,
            body: RequestBody::Json(sonic_rs::to_vec(payload)?),
        })
    }

    pub fn multipart(form: Form) -> Self {
        Self {
            method: Method::POST,
            token: None,
            body: RequestBody::Multipart(form),
        }
    }

    pub fn bearer(mut self, token: Option<&'a str>) -> Self {
        self.token = token;
        self
    }
}

/// Thin wrapper over `reqwest` for the catalog API.
///
/// Every call is one-shot: no retries, no timeout, no caching.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins `path` to the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        let path = path.trim();
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    pub fn video_path(id: i64) -> String {
        format!("/videos/{}", id)
    }

    pub fn video_stream_path(id: i64) -> String {
        format!("/videos/stream/{}", id)
    }

    pub fn admin_user_path(id: i64) -> String {
        format!("/admin/users/{}", id)
    }

    pub fn admin_user_role_path(id: i64) -> String {
        format!("/admin/users/{}/role", id)
    }

    pub fn admin_video_path(id: i64) -> String {
        format!("/admin/videos/{}", id)
    }

    /// The URL the player streams a video from.
    pub fn stream_url(&self, id: i64) -> String {
        self.endpoint(&Self::video_stream_path(id))
    }

    /// The direct file URL for a catalog entry's `file_path`.
    pub fn file_url(&self, file_path: &str) -> String {
        self.endpoint(&format!("/stream/{}", file_path.trim_start_matches('/')))
    }

    /// Issues the request and fails on transport errors or non-success status.
    async fn send(&self, endpoint: &str, options: RequestOptions<'_>) -> Result<reqwest::Response> {
        let url = self.endpoint(endpoint);
        let bearer = options.token.is_some();
        let mut builder = self.http.request(options.method.clone(), &url);

        if let Some(token) = options.token {
            builder = builder.bearer_auth(token);
        }

        builder = match options.body {
            RequestBody::Empty => builder,
            RequestBody::Json(bytes) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(bytes),
            RequestBody::Multipart(form) => builder.multipart(form),
        };

        tracing::debug!("➡️ {} {}", options.method, endpoint);

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("❌ API request to {} failed: {}", endpoint, e);
                return Err(AppError::Network(e.to_string()));
            }
        };

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        let message = sonic_rs::from_slice::<ErrorBody>(&body)
            .ok()
            .and_then(ErrorBody::into_message);
        let err = match AppError::api(status, message) {
            AppError::Api { status, message } if bearer && status == StatusCode::UNAUTHORIZED => {
                AppError::SessionRejected(message)
            }
            err => err,
        };
        tracing::error!("❌ API error on {}: {}", endpoint, err);
        Err(err)
    }

    /// Issues the request and returns the raw success body.
    async fn execute(&self, endpoint: &str, options: RequestOptions<'_>) -> Result<Vec<u8>> {
        let response = self.send(endpoint, options).await?;
        match response.bytes().await {
            Ok(bytes) => Ok(bytes.to_vec()),
            Err(e) => {
                tracing::error!("❌ Reading response from {} failed: {}", endpoint, e);
                Err(AppError::Network(e.to_string()))
            }
        }
    }

    /// Issues the request and decodes the success body as `T`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions<'_>,
    ) -> Result<T> {
        let body = self.execute(endpoint, options).await?;
        sonic_rs::from_slice::<T>(&body).map_err(|e| {
            tracing::error!("❌ Unexpected payload from {}: {}", endpoint, e);
            AppError::Payload(format!("{}: {}", endpoint, e))
        })
    }

    /// Like `request`, for endpoints whose body may be empty or only carry a message.
    pub async fn request_message(
        &self,
        endpoint: &str,
        options: RequestOptions<'_>,
    ) -> Result<MessageResponse> {
        let body = self.execute(endpoint, options).await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(MessageResponse::default());
        }
        Ok(sonic_rs::from_slice::<MessageResponse>(&body).unwrap_or_else(|e| {
            tracing::debug!("Ignoring non-message body from {}: {}", endpoint, e);
            MessageResponse::default()
        }))
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let payload = LoginRequest { email, password };
        self.request("/login", RequestOptions::json(Method::POST, &payload)?)
            .await
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<MessageResponse> {
        let payload = RegisterRequest {
            username,
            email,
            password,
        };
        self.request_message("/register", RequestOptions::json(Method::POST, &payload)?)
            .await
    }

    pub async fn verify(&self, token: &str) -> Result<MessageResponse> {
        self.request_message("/verify", RequestOptions::json(Method::POST, &VerifyRequest { token })?)
            .await
    }

    pub async fn list_videos(&self, token: Option<&str>) -> Result<Vec<Video>> {
        self.request("/videos", RequestOptions::get().bearer(token))
            .await
    }

    pub async fn get_video(&self, id: i64, token: &str) -> Result<Video> {
        self.request(&Self::video_path(id), RequestOptions::get().bearer(Some(token)))
            .await
    }

    pub async fn upload_video(&self, upload: VideoUpload, token: &str) -> Result<MessageResponse> {
        let mime = upload.mime_type();
        let body = reqwest::Body::wrap_stream(ReaderStream::new(upload.file));
        let part = Part::stream_with_length(body, upload.len)
            .file_name(upload.file_name)
            .mime_str(mime)
            .map_err(|e| AppError::Validation(format!("Invalid file type: {}", e)))?;

        let form = Form::new()
            .text("title", upload.title)
            .text("category", upload.category)
            .text("description", upload.description)
            .part("video", part);

        tracing::info!("📤 Uploading video ({})", mime);
        self.request_message("/admin/upload", RequestOptions::multipart(form).bearer(Some(token)))
            .await
    }

    pub async fn list_users(&self, token: &str) -> Result<Vec<User>> {
        self.request("/admin/users", RequestOptions::get().bearer(Some(token)))
            .await
    }

    pub async fn delete_user(&self, id: i64, token: &str) -> Result<MessageResponse> {
        self.request_message(&Self::admin_user_path(id), RequestOptions::delete().bearer(Some(token)))
            .await
    }

    pub async fn set_user_role(&self, id: i64, role: Role, token: &str) -> Result<MessageResponse> {
        let options = RequestOptions::json(Method::PUT, &RoleUpdateRequest { role })?.bearer(Some(token));
        self.request_message(&Self::admin_user_role_path(id), options)
            .await
    }

    pub async fn delete_video(&self, id: i64, token: &str) -> Result<MessageResponse> {
        self.request_message(&Self::admin_video_path(id), RequestOptions::delete().bearer(Some(token)))
            .await
    }

    /// Streams a video's media bytes into `destination`, returning the byte count.
    ///
    /// Bytes land in a sibling `.part` file that is renamed into place once
    /// the stream completes, and removed if it does not.
    pub async fn download_stream(&self, id: i64, token: Option<&str>, destination: &Path) -> Result<u64> {
        let endpoint = Self::video_stream_path(id);
        let response = self.send(&endpoint, RequestOptions::get().bearer(token)).await?;

        let partial = partial_path(destination);
        match save_body(&endpoint, response, &partial, destination).await {
            Ok(written) => {
                tracing::info!("✅ Saved {} bytes to {}", written, destination.display());
                Ok(written)
            }
            Err(e) => {
                if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
                    if cleanup.kind() != std::io::ErrorKind::NotFound {
                        tracing::warn!("⚠️ Could not remove {}: {}", partial.display(), cleanup);
                    }
                }
                Err(e)
            }
        }
    }
}

fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination.file_name().map(OsString::from).unwrap_or_default();
    name.push(".part");
    destination.with_file_name(name)
}

async fn save_body(endpoint: &str, response: reqwest::Response, partial: &Path, destination: &Path) -> Result<u64> {
    let mut file = tokio::fs::File::create(partial).await?;
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| {
            tracing::error!("❌ Stream from {} interrupted: {}", endpoint, e);
            AppError::Network(e.to_string())
        })?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    drop(file);

    tokio::fs::rename(partial, destination).await?;
    Ok(written)
}

/// True when the server no longer accepts the bearer token.
///
/// A 401 on an unauthenticated call such as `/login` is a plain API error.
pub fn is_auth_rejection(err: &AppError) -> bool {
    matches!(err, AppError::SessionRejected(_))
}
