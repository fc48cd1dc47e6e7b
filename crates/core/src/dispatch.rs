//! Webhook verification-and-dispatch pipeline.
//!
//! One linear pass per delivery: authenticate, apply the repository filter,
//! route by event kind, check for a completed failure, then format and send
//! the alert. The result is a [`WebhookOutcome`] which the HTTP layer turns
//! into a status code and JSON body.

use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use crate::config::AppConfig;
use crate::errors::{CoreError, WebhookError};
use crate::models::{CheckSuiteEvent, EventKind, InboundEvent, WorkflowRunEvent};
use crate::notify::Notifier;
use crate::signature;

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Result of handling one webhook delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Accepted; an alert may or may not have been sent.
    Processed,
    /// Accepted but skipped because of the repository filter.
    Ignored,
    /// Signature missing or wrong.
    Unauthorized,
    /// Malformed payload or failed delivery. Details are logged only.
    InternalError,
}

impl WebhookOutcome {
    /// HTTP status code for this outcome.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Processed | Self::Ignored => 200,
            Self::Unauthorized => 401,
            Self::InternalError => 500,
        }
    }

    /// JSON response body for this outcome.
    pub fn body(&self) -> Value {
        match self {
            Self::Processed => json!({ "message": "Webhook processed successfully" }),
            Self::Ignored => json!({ "message": "Event ignored - not target repository" }),
            Self::Unauthorized => json!({ "error": "Invalid signature" }),
            Self::InternalError => json!({ "error": "Internal server error" }),
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Authenticates deliveries and relays CI failures to the notifier.
pub struct WebhookDispatcher {
    webhook_secret: Option<String>,
    target_repository: Option<String>,
    notifier: Notifier,
}

impl WebhookDispatcher {
    /// Create a dispatcher from the validated configuration.
    pub fn new(config: &AppConfig, notifier: Notifier) -> Self {
        Self {
            webhook_secret: config.github.webhook_secret().map(str::to_string),
            target_repository: config.github.target_repository().map(str::to_string),
            notifier,
        }
    }

    /// Validate `config` and build the Telegram notifier and dispatcher.
    pub fn from_config(config: &AppConfig) -> Result<Self, CoreError> {
        config.validate()?;
        let notifier = Notifier::new(&config.telegram)?;
        Ok(Self::new(config, notifier))
    }

    /// Handle one delivery.
    ///
    /// `event_kind` and `signature` are the `X-GitHub-Event` and
    /// `X-Hub-Signature-256` header values; `body` is the raw request body.
    pub async fn handle(
        &self,
        event_kind: Option<&str>,
        signature: Option<&str>,
        body: &[u8],
    ) -> WebhookOutcome {
        if !signature::verify(body, signature, self.webhook_secret.as_deref()) {
            warn!("rejecting webhook with invalid signature");
            return WebhookOutcome::Unauthorized;
        }

        match self.process(EventKind::from_header(event_kind), body).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "error processing webhook");
                WebhookOutcome::InternalError
            }
        }
    }

    async fn process(&self, kind: EventKind, body: &[u8]) -> Result<WebhookOutcome, WebhookError> {
        info!(event = %kind, "received GitHub webhook event");

        let payload: Value = serde_json::from_slice(body)?;

        if let Some(ref target) = self.target_repository {
            let repo = payload
                .pointer("/repository/full_name")
                .and_then(Value::as_str);
            if repo != Some(target.as_str()) {
                info!(
                    repo = repo.unwrap_or("<none>"),
                    target = %target,
                    "skipping event for non-target repository"
                );
                return Ok(WebhookOutcome::Ignored);
            }
        }

        match InboundEvent::decode(&kind, payload)? {
            InboundEvent::WorkflowRun(event) => self.handle_workflow_run(&event).await?,
            InboundEvent::CheckSuite(event) => self.handle_check_suite(&event).await?,
            InboundEvent::Ignored(kind) => {
                info!(event = %kind, "ignoring unsupported event type");
            }
        }

        Ok(WebhookOutcome::Processed)
    }

    async fn handle_workflow_run(&self, event: &WorkflowRunEvent) -> Result<(), WebhookError> {
        if !event.is_failure() {
            debug!(
                workflow = %event.workflow_run.name,
                action = %event.action,
                conclusion = event.workflow_run.conclusion.as_deref().unwrap_or("none"),
                "workflow run is not a completed failure, nothing to send"
            );
            return Ok(());
        }

        info!(workflow = %event.workflow_run.name, "processing failed workflow run");
        self.notifier
            .notify_workflow_run_failure(&event.workflow_run, &event.repository)
            .await?;
        Ok(())
    }

    async fn handle_check_suite(&self, event: &CheckSuiteEvent) -> Result<(), WebhookError> {
        if !event.is_failure() {
            debug!(
                repo = %event.repository.full_name,
                action = %event.action,
                conclusion = event.check_suite.conclusion.as_deref().unwrap_or("none"),
                "check suite is not a completed failure, nothing to send"
            );
            return Ok(());
        }

        info!(repo = %event.repository.full_name, "processing failed check suite");
        self.notifier.notify_check_suite_failure(event).await?;
        Ok(())
    }
}
