//! scribe-relay - backend relay for a clinical scribe app
//!
//! Accepts recorded audio and forwards it to a speech-to-text API, relays
//! prompt-plus-transcript requests to a chat-completion API, and seeds each
//! user's default prompt templates. Clients never hold the upstream API key.

pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openai;
pub mod store;
pub mod telemetry;
pub mod templates;
pub mod upload;
