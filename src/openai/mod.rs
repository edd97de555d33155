//! Outbound client for the upstream AI API
//!
//! One call per relayed request, no retries. Failures carry as much diagnostic
//! detail as is available so handlers can log it before flattening the error into
//! a generic client-facing message.

use crate::middleware::RequestId;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use thiserror::Error;

pub mod client;
pub mod types;

pub use client::OpenAiClient;

/// Failure of a single outbound call
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// The upstream answered, but not with the expected status
    #[error("{endpoint} returned HTTP {status}")]
    Status {
        endpoint: String,
        status: StatusCode,
        headers: HeaderMap,
        body: String,
    },

    /// No usable response: connect, TLS, timeout or body read failure
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The outbound request could not be assembled
    #[error("failed to build request for {endpoint}: {source}")]
    Build {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// A 2xx response whose body did not have the expected shape
    #[error("malformed response from {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },
}

impl UpstreamError {
    /// Capture status, headers and body of a rejected response
    pub(crate) async fn from_response(endpoint: String, response: reqwest::Response) -> Self {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .unwrap_or_else(|e| format!("<unreadable body: {}>", e));
        Self::Status {
            endpoint,
            status,
            headers,
            body,
        }
    }

    /// Log everything known about the failure
    ///
    /// Response detail when the upstream answered, request detail when it did not,
    /// the bare message otherwise.
    pub fn log(&self, request_id: RequestId, operation: &str) {
        match self {
            Self::Status {
                endpoint,
                status,
                headers,
                body,
            } => {
                tracing::error!(
                    request_id = %request_id,
                    operation,
                    endpoint = %endpoint,
                    status = %status,
                    headers = ?headers,
                    body = %body,
                    "Upstream rejected request"
                );
            }
            Self::Transport { endpoint, source } => {
                tracing::error!(
                    request_id = %request_id,
                    operation,
                    endpoint = %endpoint,
                    error = %source,
                    is_timeout = source.is_timeout(),
                    is_connect = source.is_connect(),
                    "Upstream request failed without a response"
                );
            }
            Self::Build { .. } | Self::MalformedResponse { .. } => {
                tracing::error!(
                    request_id = %request_id,
                    operation,
                    error = %self,
                    "Upstream call failed"
                );
            }
        }
    }
}
