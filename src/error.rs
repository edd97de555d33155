//! Error types for scribe-relay
//!
//! `AppError` covers configuration loading and the raw HTTP transcription relay.
//! Callable endpoints use `handlers::callable::CallableError` instead, which speaks
//! the callable wire protocol.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Client-facing body for any transcription failure that is not an empty transcript
pub const TRANSCRIPTION_FAILED_MESSAGE: &str = "Error occurred while transcribing";

/// Client-facing body when the upstream answered 200 without a body
pub const EMPTY_TRANSCRIPTION_MESSAGE: &str = "Failed to transcribe audio.";

/// Main error type for the application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read config file {path}: {source}")]
    ConfigFileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration in {path}: {reason}")]
    ConfigValidationFailed { path: String, reason: String },

    #[error("Only allowed POST")]
    MethodNotAllowed,

    #[error("Missing audio file")]
    MissingAudioFile,

    /// Upstream or parse failure; details are logged where the failure happened
    #[error("{}", TRANSCRIPTION_FAILED_MESSAGE)]
    TranscriptionFailed,

    #[error("{}", EMPTY_TRANSCRIPTION_MESSAGE)]
    EmptyTranscription,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            // Client-input errors answer in plain text
            Self::MethodNotAllowed => {
                (StatusCode::METHOD_NOT_ALLOWED, self.to_string()).into_response()
            }
            Self::MissingAudioFile => (StatusCode::BAD_REQUEST, self.to_string()).into_response(),
            Self::TranscriptionFailed | Self::EmptyTranscription => {
                let body = Json(serde_json::json!({ "error": self.to_string() }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
            Self::Config(_)
            | Self::ConfigFileRead { .. }
            | Self::ConfigParseFailed { .. }
            | Self::ConfigValidationFailed { .. }
            | Self::Internal(_) => {
                tracing::error!(error = %self, "Internal error reached the response boundary");
                let body = Json(serde_json::json!({ "error": "Internal server error" }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

/// Convenience type alias for Results
pub type AppResult<T> = Result<T, AppError>;
