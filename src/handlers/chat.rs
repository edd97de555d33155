//! Chat-completion relay
//!
//! Handles the `/callGPTAPI` callable: a prompt template and input text become a
//! two-message chat request, and the first completion is relayed back.

use crate::handlers::AppState;
use crate::handlers::callable::{Caller, CallableError, CallableJson, CallableResponse};
use crate::middleware::RequestId;
use crate::openai::types::ChatCompletionRequest;
use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};

/// Client-facing message for every upstream failure
pub const CHAT_FAILED_MESSAGE: &str = "Failed to call GPT API";

/// Callable payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRelayRequest {
    pub input_text: String,
    pub prompt_content: String,
    pub gpt_model: String,
}

impl ChatRelayRequest {
    /// Outbound request for this payload
    pub fn to_completion_request(&self) -> ChatCompletionRequest {
        ChatCompletionRequest::from_prompt(&self.gpt_model, &self.prompt_content, &self.input_text)
    }
}

/// Callable result
///
/// `message` is omitted when the upstream returned no content for its first choice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatRelayResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// `/callGPTAPI` handler
///
/// The caller's identity is logged for auditing only; anonymous callers are served.
pub async fn handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Caller(caller): Caller,
    CallableJson(request): CallableJson<ChatRelayRequest>,
) -> Result<Json<CallableResponse<ChatRelayResponse>>, CallableError> {
    let uid = caller.as_ref().map(|c| c.uid.as_str());

    tracing::info!(
        request_id = %request_id,
        uid = ?uid,
        model = %request.gpt_model,
        input_chars = request.input_text.chars().count(),
        prompt_chars = request.prompt_content.chars().count(),
        "Received chat relay request"
    );
    tracing::debug!(
        request_id = %request_id,
        input_text = %request.input_text,
        prompt_content = %request.prompt_content,
        "Chat relay input"
    );

    let completion = state
        .openai()
        .chat_completion(&request.to_completion_request())
        .await
        .map_err(|e| {
            e.log(request_id, "chat_completion");
            CallableError::internal(CHAT_FAILED_MESSAGE)
        })?;

    let message = completion.first_message();

    tracing::info!(
        request_id = %request_id,
        has_message = message.is_some(),
        "Chat relay succeeded"
    );
    tracing::debug!(request_id = %request_id, message = ?message, "Chat relay response");

    Ok(Json(CallableResponse::new(ChatRelayResponse { message })))
}
