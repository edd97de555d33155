//! Template seeding
//!
//! Handles the `/seedDefaultTemplates` callable: writes the canonical prompt
//! templates into the caller's collection.

use crate::handlers::AppState;
use crate::handlers::callable::{Caller, CallableError, CallableResponse};
use crate::middleware::RequestId;
use crate::store::{StoreError, TemplateStore};
use crate::templates::{TemplateDocument, TemplateKey};
use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Callable result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeedResponse {
    pub success: bool,
}

/// A seed that stopped part way
///
/// Writes before `key` are kept; re-seeding restores everything.
#[derive(Error, Debug)]
#[error("failed to write template {key} (already written: {written:?}): {source}")]
pub struct SeedFailure {
    pub key: TemplateKey,
    pub written: Vec<TemplateKey>,
    #[source]
    pub source: StoreError,
}

/// Write every canonical template for `uid`, in order, stopping at the first failure
pub async fn seed_default_templates(
    store: &dyn TemplateStore,
    uid: &str,
) -> Result<(), SeedFailure> {
    let mut written = Vec::with_capacity(TemplateKey::ALL.len());
    for key in TemplateKey::ALL {
        if let Err(source) = store.put(uid, key, TemplateDocument::canonical(key)).await {
            return Err(SeedFailure {
                key,
                written,
                source,
            });
        }
        written.push(key);
    }
    Ok(())
}

/// `/seedDefaultTemplates` handler
///
/// Anonymous callers are rejected before any write.
pub async fn handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Caller(caller): Caller,
) -> Result<Json<CallableResponse<SeedResponse>>, CallableError> {
    let Some(caller) = caller else {
        tracing::warn!(request_id = %request_id, "Template seed requested without authentication");
        return Err(CallableError::unauthenticated(
            "The function must be called while authenticated.",
        ));
    };

    seed_default_templates(state.store(), &caller.uid)
        .await
        .map_err(|failure| {
            tracing::error!(
                request_id = %request_id,
                uid = %caller.uid,
                failed_key = %failure.key,
                written = ?failure.written,
                error = %failure.source,
                store_path = ?failure.source.path(),
                "Template seed stopped part way"
            );
            // Display omits server paths
            CallableError::unknown(failure.source.to_string())
        })?;

    tracing::info!(
        request_id = %request_id,
        uid = %caller.uid,
        templates = TemplateKey::ALL.len(),
        "Seeded default templates"
    );

    Ok(Json(CallableResponse::new(SeedResponse { success: true })))
}
