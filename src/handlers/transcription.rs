//! Transcription relay
//!
//! Handles `/uploadFile`: a multipart audio upload is repackaged and forwarded to
//! the upstream transcription endpoint, and the transcript is relayed back.

use crate::error::AppError;
use crate::handlers::AppState;
use crate::middleware::RequestId;
use crate::upload::UploadForm;
use axum::{
    Extension, Json,
    extract::{FromRequest, Multipart, Request, State},
    http::Method,
};
use serde::{Deserialize, Serialize};

/// Successful transcription response
#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptionResponse {
    pub transcript: String,
}

/// `/uploadFile` handler
///
/// Mounted for every method so non-POST requests get the plain-text 405 body
/// without their body ever being read. Upstream failures are logged here and
/// answered with a fixed message; no upstream detail reaches the caller.
pub async fn handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    request: Request,
) -> Result<Json<TranscriptionResponse>, AppError> {
    if request.method() != Method::POST {
        tracing::info!(
            request_id = %request_id,
            method = %request.method(),
            "Rejected upload with non-POST method"
        );
        return Err(AppError::MethodNotAllowed);
    }

    let multipart = Multipart::from_request(request, &state)
        .await
        .map_err(|rejection| {
            tracing::error!(
                request_id = %request_id,
                error = %rejection,
                "Upload is not a readable multipart body"
            );
            AppError::TranscriptionFailed
        })?;

    let form = UploadForm::parse(multipart).await.map_err(|e| {
        tracing::error!(
            request_id = %request_id,
            error = %e,
            "Failed to parse upload"
        );
        AppError::TranscriptionFailed
    })?;

    let prompt = form.prompt_hint().map(str::to_owned);
    let Some(audio) = form.file else {
        tracing::warn!(request_id = %request_id, "Upload contained no file part");
        return Err(AppError::MissingAudioFile);
    };

    tracing::info!(
        request_id = %request_id,
        field = %audio.field_name,
        filename = %audio.filename,
        content_type = ?audio.content_type,
        bytes = audio.data.len(),
        has_prompt = prompt.is_some(),
        "Forwarding upload for transcription"
    );

    match state.openai().transcribe(audio, prompt.as_deref()).await {
        Ok(Some(transcript)) => {
            tracing::info!(
                request_id = %request_id,
                transcript_chars = transcript.chars().count(),
                "Transcription succeeded"
            );
            tracing::debug!(request_id = %request_id, transcript = %transcript, "Transcript");
            Ok(Json(TranscriptionResponse { transcript }))
        }
        Ok(None) => {
            tracing::error!(
                request_id = %request_id,
                "Upstream answered 200 with an empty body"
            );
            Err(AppError::EmptyTranscription)
        }
        Err(e) => {
            e.log(request_id, "transcription");
            Err(AppError::TranscriptionFailed)
        }
    }
}
