//! Configuration for the relay.
//!
//! Settings come from an optional TOML file and are then overlaid with the
//! environment variables the relay has always honoured (`PORT`,
//! `WEBHOOK_SECRET`, `TELEGRAM_BOT_TOKEN`, `TELEGRAM_CHAT_ID`,
//! `GITHUB_REPOSITORY`, ...). The result is validated once at startup and is
//! read-only afterwards.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::ConfigError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Webhook authentication and repository filter.
    #[serde(default)]
    pub github: GitHubConfig,

    /// Telegram Bot API destination.
    #[serde(default)]
    pub telegram: TelegramConfig,
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// TCP port to listen on (default 3000).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Minimum tracing level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Maximum accepted request body size in bytes.
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_port() -> u16 {
    3000
}
fn default_log_level() -> String {
    "info".into()
}
fn default_body_limit() -> usize {
    2 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            log_level: default_log_level(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

// ---------------------------------------------------------------------------
// GitHub
// ---------------------------------------------------------------------------

/// Webhook-side settings.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// Shared secret used to sign deliveries. Unset or empty disables
    /// signature verification.
    #[serde(default)]
    pub webhook_secret: Option<String>,

    /// Only events for this `owner/repo` produce alerts.
    #[serde(default)]
    pub repository: Option<String>,
}

impl GitHubConfig {
    /// The webhook secret, or `None` when verification is disabled.
    pub fn webhook_secret(&self) -> Option<&str> {
        self.webhook_secret.as_deref().filter(|s| !s.is_empty())
    }

    /// The repository filter, or `None` when all repositories are accepted.
    pub fn target_repository(&self) -> Option<&str> {
        self.repository.as_deref().filter(|s| !s.is_empty())
    }
}

impl fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("webhook_secret", &self.webhook_secret().map(|_| "<redacted>"))
            .field("repository", &self.repository)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Telegram
// ---------------------------------------------------------------------------

/// Telegram Bot API settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token issued by BotFather. Required.
    #[serde(default)]
    pub bot_token: String,

    /// Destination chat id (numeric id or `@channel`). Required.
    #[serde(default)]
    pub chat_id: String,

    /// Bot API base URL (default `https://api.telegram.org`).
    #[serde(default = "default_telegram_api_url")]
    pub api_url: String,

    /// Upper bound on a single `sendMessage` call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_telegram_api_url() -> String {
    "https://api.telegram.org".into()
}
fn default_timeout_secs() -> u64 {
    5
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            chat_id: String::new(),
            api_url: default_telegram_api_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("api_url", &self.api_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Loading & resolving
// ---------------------------------------------------------------------------

impl AppConfig {
    /// Load an [`AppConfig`] from a TOML file at the given path.
    ///
    /// This does **not** apply environment overrides -- call
    /// [`apply_env`](Self::apply_env) afterwards.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading configuration");

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        debug!("configuration parsed successfully");
        Ok(config)
    }

    /// Build a configuration from defaults and the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Overlay settings from environment variables.
    ///
    /// `lookup` resolves a variable name to its value; empty values are
    /// treated as unset so an exported-but-blank variable never clobbers a
    /// value from the config file.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(port) = get("PORT") {
            self.server.port = parse_number(&port, "PORT")?;
        }
        if let Some(level) = get("LOG_LEVEL") {
            self.server.log_level = level;
        }
        if let Some(secret) = get("WEBHOOK_SECRET") {
            self.github.webhook_secret = Some(secret);
        }
        if let Some(repo) = get("GITHUB_REPOSITORY") {
            self.github.repository = Some(repo);
        }
        if let Some(token) = get("TELEGRAM_BOT_TOKEN") {
            self.telegram.bot_token = token;
        }
        if let Some(chat_id) = get("TELEGRAM_CHAT_ID") {
            self.telegram.chat_id = chat_id;
        }
        if let Some(url) = get("TELEGRAM_API_URL") {
            self.telegram.api_url = url;
        }
        if let Some(secs) = get("NOTIFY_TIMEOUT_SECS") {
            self.telegram.timeout_secs = parse_number(&secs, "NOTIFY_TIMEOUT_SECS")?;
        }

        debug!("environment overrides applied");
        Ok(())
    }

    /// Validate that all required fields are present and sane.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.telegram.bot_token.trim().is_empty() {
            return Err(ConfigError::EnvVarMissing {
                var: "TELEGRAM_BOT_TOKEN".into(),
                field: "telegram.bot_token".into(),
            });
        }
        if self.telegram.chat_id.trim().is_empty() {
            return Err(ConfigError::EnvVarMissing {
                var: "TELEGRAM_CHAT_ID".into(),
                field: "telegram.chat_id".into(),
            });
        }
        if self.telegram.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "telegram.timeout_secs".into(),
                detail: "timeout must be > 0".into(),
            });
        }
        if let Some(repo) = self.github.target_repository() {
            if !repo.contains('/') {
                return Err(ConfigError::InvalidValue {
                    field: "github.repository".into(),
                    detail: "repository must be in 'owner/repo' format".into(),
                });
            }
        }
        if self.github.webhook_secret().is_none() {
            warn!("no webhook secret configured; signature verification is disabled");
        }

        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(value: &str, var: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        field: var.into(),
        detail: format!("'{}' is not a valid number", value),
    })
}
