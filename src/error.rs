use http::StatusCode;
use thiserror::Error;

/// The user-facing text for transport failures.
pub const NETWORK_MESSAGE: &str = "Cannot reach the server. Check your connection and try again.";

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Input rejected on the client before any request was made.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The server answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        status: StatusCode,
        message: String,
    },

    /// The server answered 401 to a request that carried the bearer token.
    #[error("Session rejected: {0}")]
    SessionRejected(String),

    /// The server could not be reached, or the response body could not be read.
    #[error("Network error: {0}")]
    Network(String),

    /// A session token whose payload could not be decoded.
    #[error("Token decode error")]
    Decode,

    /// A response body that does not match the expected schema.
    #[error("Unexpected response payload: {0}")]
    Payload(String),

    /// The action needs a session (or an admin session) that is not present.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// An I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Builds an `AppError::Api` from a status and an optional server message.
    ///
    /// Falls back to `Error {status}` when the server did not supply a message.
    pub fn api(status: StatusCode, message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("Error {}", status.as_u16()));
        AppError::Api { status, message }
    }

    /// Returns the text shown to the user in a notification.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Api { message, .. } => message.clone(),
            AppError::SessionRejected(message) => message.clone(),
            AppError::Network(_) => NETWORK_MESSAGE.to_string(),
            AppError::Decode => "Your session token could not be read. Please sign in again.".to_string(),
            AppError::Payload(_) => "The server sent an unexpected response.".to_string(),
            AppError::Unauthorized(msg) => msg.clone(),
            AppError::Io(_) => "A local file could not be read or written.".to_string(),
            AppError::Serialization(_) => "Internal error".to_string(),
        }
    }

    /// Logs the error at a level matching its kind.
    pub fn log(&self, context: &str) {
        match self {
            AppError::Validation(msg) => {
                tracing::debug!("Validation error in {}: {}", context, msg);
            }
            AppError::Api { status, message } => {
                tracing::warn!("API error in {}: {} {}", context, status, message);
            }
            AppError::SessionRejected(message) => {
                tracing::warn!("🔒 Session rejected in {}: {}", context, message);
            }
            AppError::Network(e) => {
                tracing::error!("❌ Network error in {}: {}", context, e);
            }
            AppError::Decode => {
                tracing::warn!("Token decode failed in {}", context);
            }
            AppError::Payload(e) => {
                tracing::error!("❌ Payload error in {}: {}", context, e);
            }
            AppError::Unauthorized(msg) => {
                tracing::warn!("Unauthorized in {}: {}", context, msg);
            }
            AppError::Io(e) => {
                tracing::error!("❌ IO error in {}: {}", context, e);
            }
            AppError::Serialization(e) => {
                tracing::error!("❌ Serialization error in {}: {}", context, e);
            }
        }
    }
}

impl From<sonic_rs::Error> for AppError {
    fn from(e: sonic_rs::Error) -> Self {
        AppError::Serialization(e.to_string())
    }
}

impl From<garde::Report> for AppError {
    fn from(report: garde::Report) -> Self {
        let message = report
            .iter()
            .next()
            .map(|(path, error)| format!("{}: {}", path, error))
            .unwrap_or_else(|| "Invalid input".to_string());
        AppError::Validation(message)
    }
}
