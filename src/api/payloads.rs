use serde::{Deserialize, Serialize};

use crate::models::session::Role;

/// The request payload for user login.
#[derive(Serialize, Debug)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// The response payload for a successful login.
#[derive(Deserialize, Debug)]
pub struct LoginResponse {
    pub token: String,
}

/// The request payload for user registration.
#[derive(Serialize, Debug)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// The request payload for email verification.
#[derive(Serialize, Debug)]
pub struct VerifyRequest<'a> {
    pub token: &'a str,
}

/// The request payload for changing a user's role.
#[derive(Serialize, Debug)]
pub struct RoleUpdateRequest {
    pub role: Role,
}

/// The response payload for endpoints that only report a message.
///
/// Also used for endpoints that may answer with an empty body.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// The shape of an application-level error body.
#[derive(Deserialize, Debug, Default)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.message.or(self.error)
    }
}

/// A video file to upload with its catalog metadata.
#[derive(Debug)]
pub struct VideoUpload {
    pub title: String,
    pub category: String,
    pub description: String,
    pub file_name: String,
    /// The open file, positioned at its start.
    pub file: tokio::fs::File,
    pub len: u64,
    /// The first bytes of the file, enough for type sniffing.
    pub head: Vec<u8>,
}

impl VideoUpload {
    /// How many leading bytes are read for type sniffing.
    pub const SNIFF_LEN: u64 = 8192;

    /// The MIME type sniffed from the file's leading bytes.
    pub fn mime_type(&self) -> &'static str {
        infer::get(&self.head)
            .map(|kind| kind.mime_type())
            .unwrap_or("application/octet-stream")
    }
}
