//! Configuration management for scribe-relay
//!
//! Parses TOML configuration files and provides typed access to settings.
//! Secrets may also come from the environment, which wins over the file.

use crate::error::{AppError, AppResult};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use std::path::Path;
use std::str::FromStr;

/// Environment variable that overrides `openai.api_key`
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable that overrides `auth.jwt_secret`
pub const JWT_SECRET_ENV: &str = "RELAY_JWT_SECRET";

/// Hard ceiling on the request deadline (matches the longest HTTP function deadline)
const MAX_REQUEST_TIMEOUT_SECONDS: u64 = 540;

/// Root configuration structure
#[derive(Debug, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Largest accepted multipart body for `/uploadFile`
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_request_timeout() -> u64 {
    60
}

fn default_max_upload_bytes() -> usize {
    // The transcription API rejects files above 25 MiB
    25 * 1024 * 1024
}

/// Upstream AI API settings
#[derive(Debug, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default, deserialize_with = "deserialize_secret")]
    api_key: Option<SecretString>,
    #[serde(default = "default_base_url")]
    base_url: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
        }
    }
}

impl OpenAiConfig {
    /// API key sent as the bearer token on every outbound call
    pub fn api_key(&self) -> Option<&SecretString> {
        self.api_key.as_ref()
    }

    /// Base URL without a trailing slash, e.g. `https://api.openai.com/v1`
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

/// Caller authentication for callable endpoints
#[derive(Debug, Default, Deserialize)]
pub struct AuthConfig {
    #[serde(default, deserialize_with = "deserialize_secret")]
    jwt_secret: Option<SecretString>,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub audience: Option<String>,
}

impl AuthConfig {
    /// HS256 secret used to verify caller tokens; `None` disables authentication
    pub fn jwt_secret(&self) -> Option<&SecretString> {
        self.jwt_secret.as_ref()
    }
}

/// Template store backend selection
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    File,
}

/// Document store configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Root directory for the file backend
    #[serde(default)]
    pub path: Option<String>,
}

/// Observability configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Empty strings are treated the same as an absent secret
fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty()).map(SecretString::from))
}

impl Config {
    /// Load configuration from a TOML file, apply environment overrides, validate
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let path_display = path.as_ref().display().to_string();

        let content = std::fs::read_to_string(path.as_ref()).map_err(|source| {
            AppError::ConfigFileRead {
                path: path_display.clone(),
                source,
            }
        })?;

        let mut config: Self =
            toml::from_str(&content).map_err(|source| AppError::ConfigParseFailed {
                path: path_display.clone(),
                source,
            })?;

        config.apply_env_overrides(|key| std::env::var(key).ok());

        config
            .validate()
            .map_err(|e| AppError::ConfigValidationFailed {
                path: path_display,
                reason: e.to_string(),
            })?;

        Ok(config)
    }

    /// Replace secrets with values from `lookup` when it returns a non-empty value
    ///
    /// `lookup` is normally `std::env::var`; tests pass a closure instead of
    /// mutating the process environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|v| !v.is_empty()) {
            self.openai.api_key = Some(SecretString::from(key));
        }
        if let Some(secret) = lookup(JWT_SECRET_ENV).filter(|v| !v.is_empty()) {
            self.auth.jwt_secret = Some(SecretString::from(secret));
        }
    }

    /// Validate configuration after parsing
    ///
    /// This is called automatically by `from_file()` and `from_str()`.
    pub fn validate(&self) -> AppResult<()> {
        if self.server.request_timeout_seconds == 0 {
            return Err(AppError::Config(
                "server.request_timeout_seconds must be greater than 0".to_string(),
            ));
        }
        if self.server.request_timeout_seconds > MAX_REQUEST_TIMEOUT_SECONDS {
            return Err(AppError::Config(format!(
                "server.request_timeout_seconds cannot exceed {} seconds, got {}",
                MAX_REQUEST_TIMEOUT_SECONDS, self.server.request_timeout_seconds
            )));
        }

        if self.server.max_upload_bytes == 0 {
            return Err(AppError::Config(
                "server.max_upload_bytes must be greater than 0".to_string(),
            ));
        }

        let base_url = self.openai.base_url();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(AppError::Config(format!(
                "openai.base_url '{}' must start with 'http://' or 'https://'",
                self.openai.base_url
            )));
        }

        if self.store.backend == StoreBackend::File
            && self.store.path.as_deref().is_none_or(str::is_empty)
        {
            return Err(AppError::Config(
                "store.path is required when store.backend = \"file\"\n\n\
                Example fix - add to config.toml:\n\
                [store]\n\
                backend = \"file\"\n\
                path = \"./data/templates\""
                    .to_string(),
            ));
        }

        Ok(())
    }
}

impl FromStr for Config {
    type Err = AppError;

    /// Parse and validate without consulting the environment
    fn from_str(toml_str: &str) -> Result<Self, Self::Err> {
        let config: Config =
            toml::from_str(toml_str).map_err(|source| AppError::ConfigParseFailed {
                path: "<string>".to_string(),
                source,
            })?;

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::io::Write;

    const MINIMAL: &str = r#"
[server]
host = "127.0.0.1"
port = 8080
"#;

    const FULL: &str = r#"
[server]
host = "0.0.0.0"
port = 9000
request_timeout_seconds = 120
max_upload_bytes = 1048576

[openai]
api_key = "sk-file"
base_url = "http://localhost:4010/v1/"

[auth]
jwt_secret = "file-secret"
issuer = "scribe"
audience = "relay"

[store]
backend = "file"
path = "/var/lib/scribe/templates"

[observability]
log_level = "debug"
"#;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = Config::from_str(MINIMAL).expect("should parse minimal config");
        assert_eq!(config.server.request_timeout_seconds, 60);
        assert_eq!(config.server.max_upload_bytes, 25 * 1024 * 1024);
        assert_eq!(config.openai.base_url(), "https://api.openai.com/v1");
        assert!(config.openai.api_key().is_none());
        assert!(config.auth.jwt_secret().is_none());
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_full_config_parses_every_section() {
        let config = Config::from_str(FULL).expect("should parse full config");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.max_upload_bytes, 1_048_576);
        assert_eq!(
            config.openai.api_key().map(|k| k.expose_secret().to_string()),
            Some("sk-file".to_string())
        );
        // Trailing slash is trimmed so paths can be appended safely
        assert_eq!(config.openai.base_url(), "http://localhost:4010/v1");
        assert_eq!(config.auth.issuer.as_deref(), Some("scribe"));
        assert_eq!(config.auth.audience.as_deref(), Some("relay"));
        assert_eq!(config.store.backend, StoreBackend::File);
        assert_eq!(config.observability.log_level, "debug");
    }

    #[test]
    fn test_empty_api_key_is_treated_as_absent() {
        let toml = format!("{MINIMAL}\n[openai]\napi_key = \"\"\n");
        let config = Config::from_str(&toml).expect("should parse");
        assert!(config.openai.api_key().is_none());
    }

    #[test]
    fn test_api_key_is_redacted_in_debug_output() {
        let config = Config::from_str(FULL).expect("should parse full config");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-file"));
        assert!(!debug.contains("file-secret"));
    }

    #[test]
    fn test_env_overrides_win_over_file() {
        let mut config = Config::from_str(FULL).expect("should parse full config");
        config.apply_env_overrides(|key| match key {
            API_KEY_ENV => Some("sk-env".to_string()),
            JWT_SECRET_ENV => Some("env-secret".to_string()),
            _ => None,
        });
        assert_eq!(
            config.openai.api_key().map(|k| k.expose_secret().to_string()),
            Some("sk-env".to_string())
        );
        assert_eq!(
            config.auth.jwt_secret().map(|k| k.expose_secret().to_string()),
            Some("env-secret".to_string())
        );
    }

    #[test]
    fn test_empty_env_value_does_not_clear_file_value() {
        let mut config = Config::from_str(FULL).expect("should parse full config");
        config.apply_env_overrides(|_| Some(String::new()));
        assert!(config.openai.api_key().is_some());
        assert!(config.auth.jwt_secret().is_some());
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 8080
request_timeout_seconds = 0
"#;
        let err = Config::from_str(toml).expect_err("zero timeout should be rejected");
        assert!(err.to_string().contains("request_timeout_seconds"));
    }

    #[test]
    fn test_rejects_excessive_timeout() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 8080
request_timeout_seconds = 541
"#;
        let err = Config::from_str(toml).expect_err("timeout above 540 should be rejected");
        assert!(err.to_string().contains("540"));
    }

    #[test]
    fn test_rejects_zero_upload_limit() {
        let toml = format!("{MINIMAL}max_upload_bytes = 0\n");
        let err = Config::from_str(&toml).expect_err("zero upload limit should be rejected");
        assert!(err.to_string().contains("max_upload_bytes"));
    }

    #[test]
    fn test_rejects_base_url_without_scheme() {
        let toml = format!("{MINIMAL}\n[openai]\nbase_url = \"api.openai.com/v1\"\n");
        let err = Config::from_str(&toml).expect_err("schemeless base_url should be rejected");
        assert!(err.to_string().contains("openai.base_url"));
    }

    #[test]
    fn test_file_store_requires_path() {
        let toml = format!("{MINIMAL}\n[store]\nbackend = \"file\"\n");
        let err = Config::from_str(&toml).expect_err("file store without path should fail");
        assert!(err.to_string().contains("store.path"));
    }

    #[test]
    fn test_unknown_store_backend_is_parse_error() {
        let toml = format!("{MINIMAL}\n[store]\nbackend = \"firestore\"\n");
        let err = Config::from_str(&toml).expect_err("unknown backend should fail");
        assert!(matches!(err, AppError::ConfigParseFailed { .. }));
    }

    #[test]
    fn test_from_file_missing_file_reports_path() {
        let err = Config::from_file("/nonexistent/scribe-relay.toml")
            .expect_err("missing file should fail");
        match err {
            AppError::ConfigFileRead { path, .. } => {
                assert_eq!(path, "/nonexistent/scribe-relay.toml")
            }
            other => panic!("expected ConfigFileRead, got {other:?}"),
        }
    }

    #[test]
    fn test_from_file_validation_error_reports_path() {
        let mut file = tempfile::NamedTempFile::new().expect("should create temp file");
        writeln!(
            file,
            "[server]\nhost = \"127.0.0.1\"\nport = 8080\nrequest_timeout_seconds = 0"
        )
        .expect("should write config");

        let err = Config::from_file(file.path()).expect_err("invalid config should fail");
        match err {
            AppError::ConfigValidationFailed { path, reason } => {
                assert_eq!(path, file.path().display().to_string());
                assert!(reason.contains("request_timeout_seconds"));
            }
            other => panic!("expected ConfigValidationFailed, got {other:?}"),
        }
    }
}
