//! HTTP request handlers for the relay API

use crate::auth::Authenticator;
use crate::config::Config;
use crate::error::AppResult;
use crate::middleware::request_id_middleware;
use crate::openai::OpenAiClient;
use crate::store::{self, TemplateStore};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware,
    routing::{any, get, post},
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

pub mod callable;
pub mod chat;
pub mod health;
pub mod templates;
pub mod transcription;

/// Application state shared across all handlers
///
/// Built once at startup. All fields are Arc'd for cheap cloning across Axum handlers.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    openai: Arc<OpenAiClient>,
    authenticator: Option<Arc<Authenticator>>,
    store: Arc<dyn TemplateStore>,
}

impl AppState {
    /// Create state with the template store selected in configuration
    pub fn new(config: Arc<Config>) -> AppResult<Self> {
        let store = store::from_config(&config.store)?;
        Self::with_store(config, store)
    }

    /// Create state around an existing template store
    pub fn with_store(config: Arc<Config>, store: Arc<dyn TemplateStore>) -> AppResult<Self> {
        let openai = Arc::new(OpenAiClient::new(&config.openai)?);
        let authenticator = Authenticator::from_config(&config.auth).map(Arc::new);

        if config.openai.api_key().is_none() {
            tracing::warn!(
                "No upstream API key configured (openai.api_key or {}); upstream calls will be rejected",
                crate::config::API_KEY_ENV
            );
        }
        if authenticator.is_none() {
            tracing::warn!(
                "No caller token secret configured (auth.jwt_secret or {}); all callers are anonymous",
                crate::config::JWT_SECRET_ENV
            );
        }

        Ok(Self {
            config,
            openai,
            authenticator,
            store,
        })
    }

    /// Get reference to the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get reference to the upstream API client
    pub fn openai(&self) -> &OpenAiClient {
        &self.openai
    }

    /// Caller token verifier, absent when no secret is configured
    pub fn authenticator(&self) -> Option<&Authenticator> {
        self.authenticator.as_deref()
    }

    /// Get reference to the template store
    pub fn store(&self) -> &dyn TemplateStore {
        self.store.as_ref()
    }
}

/// Build the full application router
///
/// CORS is permissive and outermost so browser preflights are answered before
/// any handler runs.
pub fn router(state: AppState) -> Router {
    let max_upload_bytes = state.config().server.max_upload_bytes;
    let request_timeout = Duration::from_secs(state.config().server.request_timeout_seconds);

    Router::new()
        .route(
            "/uploadFile",
            any(transcription::handler).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/callGPTAPI", post(chat::handler))
        .route("/seedDefaultTemplates", post(templates::handler))
        .route("/health", get(health::handler))
        .with_state(state)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(CorsLayer::permissive())
}
