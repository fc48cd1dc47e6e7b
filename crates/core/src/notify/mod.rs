//! Failure alerts: message formatting and delivery.
//!
//! The formatters are pure functions producing Telegram HTML. The
//! [`Notifier`] facade formats an event and hands the text to the
//! [`telegram::TelegramNotifier`] transport.
//!
//! Repository and branch names are inserted without HTML escaping. They come
//! from an authenticated GitHub delivery and GitHub restricts the characters
//! they may contain, but an unsigned deployment accepts them from anyone.

pub mod telegram;

use serde::Serialize;
use tracing::info;

use crate::config::TelegramConfig;
use crate::errors::NotificationError;
use crate::models::{CheckSuiteEvent, RepositoryRef, WorkflowRunInfo};

/// Length of the abbreviated commit hash shown in alerts.
const SHORT_SHA_LEN: usize = 7;

// ---------------------------------------------------------------------------
// Message value
// ---------------------------------------------------------------------------

/// Markup dialect of a message body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ParseMode {
    #[default]
    #[serde(rename = "HTML")]
    Html,
}

/// A formatted alert ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    pub text: String,
    pub parse_mode: ParseMode,
}

impl NotificationMessage {
    /// Wrap Telegram-HTML text.
    pub fn html(text: String) -> Self {
        Self {
            text,
            parse_mode: ParseMode::Html,
        }
    }
}

// ---------------------------------------------------------------------------
// Notifier facade
// ---------------------------------------------------------------------------

/// Formats failure events and sends them to the configured chat.
pub struct Notifier {
    telegram: telegram::TelegramNotifier,
}

impl Notifier {
    /// Create a notifier from the Telegram configuration.
    pub fn new(config: &TelegramConfig) -> Result<Self, NotificationError> {
        Ok(Self {
            telegram: telegram::TelegramNotifier::new(config)?,
        })
    }

    /// Send a workflow-run failure alert.
    pub async fn notify_workflow_run_failure(
        &self,
        run: &WorkflowRunInfo,
        repository: &RepositoryRef,
    ) -> Result<(), NotificationError> {
        info!(
            repo = %repository.full_name,
            workflow = %run.name,
            "sending workflow run failure notification"
        );
        let message = NotificationMessage::html(format_workflow_run_failure(run, repository));
        self.telegram.send(&message).await
    }

    /// Send a check-suite failure alert.
    pub async fn notify_check_suite_failure(
        &self,
        event: &CheckSuiteEvent,
    ) -> Result<(), NotificationError> {
        info!(
            repo = %event.repository.full_name,
            sha = %short_sha(&event.check_suite.head_sha),
            "sending check suite failure notification"
        );
        let message = NotificationMessage::html(format_check_suite_failure(event));
        self.telegram.send(&message).await
    }
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Format a workflow-run failure alert (Telegram HTML).
pub fn format_workflow_run_failure(run: &WorkflowRunInfo, repository: &RepositoryRef) -> String {
    format!(
        "\n❌ <b>CI/CD Pipeline Failure</b>\n\
         \n\
         <b>Repository:</b> <a href=\"{}\">{}</a>\n\
         <b>Workflow:</b> {}\n\
         <b>Branch:</b> {}\n\
         <b>Commit:</b> {}\n\
         <b>Status:</b> {}\n\
         \n\
         <a href=\"{}\">View Workflow Run</a>\n",
        repository.html_url,
        repository.full_name,
        run.name,
        branch(run.head_branch.as_deref()),
        short_sha(&run.head_sha),
        run.outcome(),
        run.html_url,
    )
}

/// Format a check-suite failure alert (Telegram HTML).
pub fn format_check_suite_failure(event: &CheckSuiteEvent) -> String {
    let CheckSuiteEvent {
        check_suite,
        repository,
        ..
    } = event;

    format!(
        "\n❌ <b>CI/CD Check Suite Failure</b>\n\
         \n\
         <b>Repository:</b> <a href=\"{}\">{}</a>\n\
         <b>Branch:</b> {}\n\
         <b>Commit:</b> {}\n\
         <b>Status:</b> {}\n\
         \n\
         <a href=\"{}/commit/{}/checks\">View Checks</a>\n",
        repository.html_url,
        repository.full_name,
        branch(check_suite.head_branch.as_deref()),
        short_sha(&check_suite.head_sha),
        check_suite.outcome(),
        repository.html_url,
        check_suite.head_sha,
    )
}

/// First seven characters of a commit hash.
fn short_sha(sha: &str) -> &str {
    match sha.char_indices().nth(SHORT_SHA_LEN) {
        Some((idx, _)) => &sha[..idx],
        None => sha,
    }
}

fn branch(head_branch: Option<&str>) -> &str {
    head_branch.unwrap_or("unknown")
}
