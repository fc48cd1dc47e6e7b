//! cirelay core library.
//!
//! Receives GitHub Actions webhook deliveries, authenticates them, and relays
//! `workflow_run` / `check_suite` failures to a Telegram chat. This crate
//! holds the transport-independent pieces: configuration, the payload model,
//! signature verification, alert formatting and delivery, and the dispatcher
//! that ties them together.

pub mod config;
pub mod dispatch;
pub mod errors;
pub mod models;
pub mod notify;
pub mod signature;

// Re-exports for convenience.
pub use config::AppConfig;
pub use dispatch::{WebhookDispatcher, WebhookOutcome};
pub use notify::Notifier;
