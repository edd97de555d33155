//! Command-line interface for scribe-relay
//!
//! Provides argument parsing and subcommand handling for the scribe-relay binary.

use clap::{Parser, Subcommand};

/// Relay for clinical audio transcription and prompt-driven note generation
#[derive(Parser)]
#[command(name = "scribe-relay")]
#[command(version)]
#[command(about = "Relay for clinical audio transcription and note generation")]
#[command(
    long_about = "scribe-relay forwards recorded clinical audio to a speech-to-text API, \
    turns transcripts into notes through a chat-completion API, and seeds each user's \
    prompt templates. Upstream credentials never leave the server."
)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate a template configuration file
    Config {
        /// Output file path (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// Generate template configuration content
pub fn generate_config_template() -> &'static str {
    r#"# scribe-relay Configuration
# ==========================
#
# This file configures the HTTP server, the upstream AI API, caller
# authentication, the template store and logging.

# ─────────────────────────────────────────────────────────────────────────────
# SERVER CONFIGURATION
# ─────────────────────────────────────────────────────────────────────────────

[server]
# IP address to bind to (0.0.0.0 for all interfaces, 127.0.0.1 for localhost only)
host = "0.0.0.0"

# Port to listen on
port = 3000

# Deadline for a whole request in seconds, including the upstream call (max 540)
request_timeout_seconds = 60

# Largest accepted upload for /uploadFile in bytes (25 MiB)
max_upload_bytes = 26214400

# ─────────────────────────────────────────────────────────────────────────────
# UPSTREAM AI API
# ─────────────────────────────────────────────────────────────────────────────

[openai]
# API key for the speech-to-text and chat-completion endpoints.
# Prefer the OPENAI_API_KEY environment variable, which overrides this value.
# api_key = "sk-..."

# Base URL of the OpenAI-compatible API
base_url = "https://api.openai.com/v1"

# ─────────────────────────────────────────────────────────────────────────────
# CALLER AUTHENTICATION
# ─────────────────────────────────────────────────────────────────────────────
#
# Callable endpoints accept an HS256 bearer token whose `sub` claim is the
# user id. Without a secret every caller is anonymous and
# /seedDefaultTemplates always answers UNAUTHENTICATED.

[auth]
# Prefer the RELAY_JWT_SECRET environment variable, which overrides this value.
# jwt_secret = "change-me"

# Optional `iss` and `aud` claims to require
# issuer = "https://auth.example.com"
# audience = "scribe-app"

# ─────────────────────────────────────────────────────────────────────────────
# TEMPLATE STORE
# ─────────────────────────────────────────────────────────────────────────────

[store]
# Backend: "memory" (lost on restart) or "file" (one JSON file per template)
backend = "memory"

# Root directory for the file backend
# path = "/var/lib/scribe-relay/templates"

# ─────────────────────────────────────────────────────────────────────────────
# OBSERVABILITY
# ─────────────────────────────────────────────────────────────────────────────

[observability]
# Log level: "trace", "debug", "info", "warn", "error"
# Transcripts and prompt text are only logged at "debug".
log_level = "info"
"#
}
