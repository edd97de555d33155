//! Sequential multipart parsing for audio uploads
//!
//! The whole body is read into an [`UploadForm`] before any outbound call is made.
//! Parts carrying a filename are files; the text field `prompt` is the transcription
//! hint; anything else is ignored.

use axum::body::Bytes;
use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use thiserror::Error;

/// Name of the optional text field forwarded as a transcription hint
pub const PROMPT_FIELD: &str = "prompt";

/// An uploaded audio file, held in memory
#[derive(Debug, Clone)]
pub struct AudioFile {
    /// Form field the file arrived under (any name is accepted)
    pub field_name: String,
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Typed view of an upload request body
#[derive(Debug, Default)]
pub struct UploadForm {
    pub prompt: Option<String>,
    pub file: Option<AudioFile>,
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("malformed multipart body: {0}")]
    Multipart(#[from] MultipartError),
}

impl UploadForm {
    /// Consume every part of the body
    ///
    /// When several file parts are present the last one wins.
    pub async fn parse(mut multipart: Multipart) -> Result<Self, UploadError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await? {
            let field_name = field.name().unwrap_or_default().to_string();

            if let Some(filename) = field.file_name().map(str::to_string) {
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await?;

                tracing::debug!(
                    field = %field_name,
                    filename = %filename,
                    content_type = ?content_type,
                    bytes = data.len(),
                    "Received file part"
                );

                if let Some(previous) = &form.file {
                    tracing::warn!(
                        previous_filename = %previous.filename,
                        filename = %filename,
                        "Multiple file parts in upload, keeping the last one"
                    );
                }

                form.file = Some(AudioFile {
                    field_name,
                    filename,
                    content_type,
                    data,
                });
            } else if field_name == PROMPT_FIELD {
                form.prompt = Some(field.text().await?);
            } else {
                tracing::debug!(field = %field_name, "Ignoring unknown form field");
            }
        }

        Ok(form)
    }

    /// Prompt hint worth forwarding upstream
    pub fn prompt_hint(&self) -> Option<&str> {
        self.prompt.as_deref().filter(|p| !p.is_empty())
    }
}
