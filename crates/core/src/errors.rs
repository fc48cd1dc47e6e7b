//! Error types for the cirelay core library.
//!
//! Each subsystem has its own error type derived with `thiserror`, and a
//! top-level [`CoreError`] enum unifies them all for callers that want a
//! single error type.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Unified error type for the entire core library.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Notification(#[from] NotificationError),

    #[error(transparent)]
    Webhook(#[from] WebhookError),
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("configuration parse error: {0}")]
    ParseError(String),

    /// A required setting has no value after files and environment are merged.
    #[error("required environment variable '{var}' is not set (needed for config field '{field}')")]
    EnvVarMissing {
        var: String,
        field: String,
    },

    /// A config value is invalid.
    #[error("invalid configuration value for '{field}': {detail}")]
    InvalidValue {
        field: String,
        detail: String,
    },

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Notification errors
// ---------------------------------------------------------------------------

/// Errors from delivering a message to the chat transport.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// Transport-level failure (connect, TLS, body read).
    #[error("notification HTTP error: {0}")]
    HttpError(#[source] reqwest::Error),

    /// The request did not complete within the configured timeout.
    #[error("notification request timed out")]
    Timeout,

    /// The Bot API answered with a non-success status.
    #[error("Telegram API error (HTTP {status}): {body}")]
    ApiError {
        status: u16,
        body: String,
    },
}

impl From<reqwest::Error> for NotificationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            NotificationError::Timeout
        } else {
            NotificationError::HttpError(err)
        }
    }
}

// ---------------------------------------------------------------------------
// Webhook errors
// ---------------------------------------------------------------------------

/// Faults raised while processing an authenticated webhook delivery.
///
/// Both variants end up as an opaque 500 for the sender; the detail is only
/// logged server-side.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Body is not JSON, or lacks a field the event kind requires.
    #[error("invalid webhook payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    /// The alert could not be delivered.
    #[error("alert delivery failed: {0}")]
    Delivery(#[from] NotificationError),
}
