//! HTTP client for the upstream transcription and chat-completion endpoints

use super::UpstreamError;
use super::types::{
    ChatCompletionRequest, ChatCompletionResponse, TRANSCRIPTION_MODEL, TranscriptionResponse,
};
use crate::config::OpenAiConfig;
use crate::error::{AppError, AppResult};
use crate::upload::AudioFile;
use axum::body::Bytes;
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};

const TRANSCRIPTIONS_PATH: &str = "/audio/transcriptions";
const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

/// Content type used when the upload's own content type is not a valid MIME type
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Client for the upstream AI API
///
/// Built once at startup and shared by all handlers. The underlying
/// `reqwest::Client` pools connections across requests.
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.base_url)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

impl OpenAiClient {
    /// Create a client from configuration
    pub fn new(config: &OpenAiConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("scribe-relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url().to_string(),
            api_key: config
                .api_key()
                .map(|key| SecretString::from(key.expose_secret().to_owned())),
        })
    }

    /// Base URL outbound paths are appended to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key.expose_secret()),
            // Forwarded without a key; the upstream answers 401
            None => builder,
        }
    }

    /// Send an audio file for transcription
    ///
    /// Returns `Ok(None)` when the upstream answered 200 with an empty body.
    /// Any status other than exactly 200 is an error.
    pub async fn transcribe(
        &self,
        audio: AudioFile,
        prompt: Option<&str>,
    ) -> Result<Option<String>, UpstreamError> {
        let endpoint = self.endpoint(TRANSCRIPTIONS_PATH);

        let file_part = audio_part(audio).map_err(|source| UpstreamError::Build {
            endpoint: endpoint.clone(),
            source,
        })?;

        let mut form = Form::new()
            .part("file", file_part)
            .text("model", TRANSCRIPTION_MODEL);
        if let Some(prompt) = prompt.filter(|p| !p.is_empty()) {
            form = form.text("prompt", prompt.to_owned());
        }

        let response = self
            .authorized(self.http.post(&endpoint))
            .multipart(form)
            .send()
            .await
            .map_err(|source| UpstreamError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;

        if response.status() != StatusCode::OK {
            return Err(UpstreamError::from_response(endpoint, response).await);
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| UpstreamError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;

        if body.is_empty() {
            return Ok(None);
        }

        let parsed: TranscriptionResponse =
            serde_json::from_slice(&body).map_err(|e| UpstreamError::MalformedResponse {
                endpoint,
                reason: e.to_string(),
            })?;

        Ok(Some(parsed.text))
    }

    /// Send a chat-completion request
    ///
    /// Any 2xx status is accepted; the body must carry a `choices` array.
    pub async fn chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, UpstreamError> {
        let endpoint = self.endpoint(CHAT_COMPLETIONS_PATH);

        let response = self
            .authorized(self.http.post(&endpoint))
            .json(request)
            .send()
            .await
            .map_err(|source| UpstreamError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(UpstreamError::from_response(endpoint, response).await);
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| UpstreamError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;

        serde_json::from_slice(&body).map_err(|e| UpstreamError::MalformedResponse {
            endpoint,
            reason: e.to_string(),
        })
    }
}

/// Multipart part for the audio file, preserving filename and content type
fn audio_part(audio: AudioFile) -> Result<Part, reqwest::Error> {
    let length = audio.data.len() as u64;
    let build = |data: Bytes| {
        Part::stream_with_length(reqwest::Body::from(data), length)
            .file_name(audio.filename.clone())
    };

    let content_type = audio
        .content_type
        .as_deref()
        .unwrap_or(FALLBACK_CONTENT_TYPE);

    match build(audio.data.clone()).mime_str(content_type) {
        Ok(part) => Ok(part),
        Err(e) => {
            tracing::warn!(
                filename = %audio.filename,
                content_type = %content_type,
                error = %e,
                "Upload has an invalid content type, forwarding as {}",
                FALLBACK_CONTENT_TYPE
            );
            build(audio.data.clone()).mime_str(FALLBACK_CONTENT_TYPE)
        }
    }
}
