//! Callable-function wire protocol
//!
//! Callable endpoints take `{"data": <payload>}` and answer `{"result": <value>}`.
//! Failures answer `{"error": {"status": "<CODE>", "message": "..."}}` with an HTTP
//! status derived from the code. Callers authenticate with a bearer token; the
//! verified identity is exposed to handlers through the [`Caller`] extractor.

use crate::auth::CallerIdentity;
use crate::handlers::AppState;
use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Request, rejection::JsonRejection},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

/// Error codes understood by callable clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionsErrorCode {
    InvalidArgument,
    Unauthenticated,
    Internal,
    Unknown,
}

impl FunctionsErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Internal => "INTERNAL",
            Self::Unknown => "UNKNOWN",
        }
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::InvalidArgument => StatusCode::BAD_REQUEST,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Internal | Self::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Typed error returned by a callable handler
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}: {message}", .code.as_str())]
pub struct CallableError {
    pub code: FunctionsErrorCode,
    pub message: String,
}

impl CallableError {
    pub fn new(code: FunctionsErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(FunctionsErrorCode::InvalidArgument, message)
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(FunctionsErrorCode::Unauthenticated, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(FunctionsErrorCode::Internal, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(FunctionsErrorCode::Unknown, message)
    }
}

impl IntoResponse for CallableError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({
            "error": {
                "status": self.code.as_str(),
                "message": self.message,
            }
        }));
        (self.code.http_status(), body).into_response()
    }
}

/// Inbound envelope
#[derive(Debug, Deserialize)]
pub struct CallableRequest<T> {
    pub data: T,
}

/// Outbound envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct CallableResponse<T> {
    pub result: T,
}

impl<T> CallableResponse<T> {
    pub fn new(result: T) -> Self {
        Self { result }
    }
}

/// JSON extractor that unwraps the `data` envelope
///
/// Bodies that are not JSON, lack `data`, or do not match `T` are rejected with
/// `INVALID_ARGUMENT`.
pub struct CallableJson<T>(pub T);

impl<S, T> FromRequest<S> for CallableJson<T>
where
    Json<CallableRequest<T>>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = CallableError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<CallableRequest<T>>::from_request(req, state).await {
            Ok(Json(envelope)) => Ok(CallableJson(envelope.data)),
            Err(rejection) => {
                tracing::debug!(error = %rejection, "Rejected callable request body");
                Err(CallableError::invalid_argument(rejection.body_text()))
            }
        }
    }
}

/// Identity of the caller, if any
///
/// No `Authorization` header yields `Caller(None)`. A header that fails
/// verification rejects the request with `UNAUTHENTICATED`. Without a configured
/// secret no token can be verified and every caller is anonymous.
#[derive(Debug, Clone)]
pub struct Caller(pub Option<CallerIdentity>);

impl FromRequestParts<AppState> for Caller {
    type Rejection = CallableError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(AUTHORIZATION) else {
            return Ok(Caller(None));
        };

        let Some(authenticator) = state.authenticator() else {
            tracing::debug!("Authorization header ignored: no auth.jwt_secret configured");
            return Ok(Caller(None));
        };

        let header = header.to_str().map_err(|_| {
            tracing::warn!("Authorization header is not valid ASCII");
            CallableError::unauthenticated("Unauthenticated")
        })?;

        match authenticator.verify_header(header) {
            Ok(identity) => Ok(Caller(Some(identity))),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    expired = e.is_expired(),
                    "Caller token rejected"
                );
                Err(CallableError::unauthenticated("Unauthenticated"))
            }
        }
    }
}
