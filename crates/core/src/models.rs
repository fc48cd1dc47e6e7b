//! GitHub webhook payload types.
//!
//! Only the fields the relay reads are modelled; everything else in the
//! delivery is ignored by serde. Instances live for a single request.

use serde::Deserialize;
use serde_json::Value;

/// Action value GitHub sends once a run or suite has finished.
pub const ACTION_COMPLETED: &str = "completed";

/// Conclusion value that triggers an alert.
pub const CONCLUSION_FAILURE: &str = "failure";

// ---------------------------------------------------------------------------
// Event kind
// ---------------------------------------------------------------------------

/// Event kind declared in the `X-GitHub-Event` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    WorkflowRun,
    CheckSuite,
    /// Any other kind, kept verbatim for logging.
    Other(String),
}

impl EventKind {
    /// Map a header value to a kind. Matching is case-exact; a missing header
    /// becomes `Other("unknown")`.
    pub fn from_header(value: Option<&str>) -> Self {
        match value {
            Some("workflow_run") => Self::WorkflowRun,
            Some("check_suite") => Self::CheckSuite,
            Some(other) => Self::Other(other.to_string()),
            None => Self::Other("unknown".to_string()),
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WorkflowRun => write!(f, "workflow_run"),
            Self::CheckSuite => write!(f, "check_suite"),
            Self::Other(kind) => write!(f, "{}", kind),
        }
    }
}

// ---------------------------------------------------------------------------
// Payload pieces
// ---------------------------------------------------------------------------

/// Repository the event belongs to.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RepositoryRef {
    pub full_name: String,
    pub html_url: String,
}

/// The `workflow_run` object of a `workflow_run` delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowRunInfo {
    pub name: String,
    /// `null` for runs not tied to a branch.
    pub head_branch: Option<String>,
    pub head_sha: String,
    pub status: String,
    pub conclusion: Option<String>,
    pub html_url: String,
}

/// The `check_suite` object of a `check_suite` delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckSuiteInfo {
    pub head_branch: Option<String>,
    pub head_sha: String,
    pub status: String,
    pub conclusion: Option<String>,
}

impl WorkflowRunInfo {
    /// Conclusion if present, otherwise the lifecycle status.
    pub fn outcome(&self) -> &str {
        outcome(self.conclusion.as_deref(), &self.status)
    }
}

impl CheckSuiteInfo {
    /// Conclusion if present, otherwise the lifecycle status.
    pub fn outcome(&self) -> &str {
        outcome(self.conclusion.as_deref(), &self.status)
    }
}

fn outcome<'a>(conclusion: Option<&'a str>, status: &'a str) -> &'a str {
    conclusion.filter(|c| !c.is_empty()).unwrap_or(status)
}

fn is_completed_failure(action: &str, conclusion: Option<&str>) -> bool {
    action == ACTION_COMPLETED && conclusion == Some(CONCLUSION_FAILURE)
}

// ---------------------------------------------------------------------------
// Deliveries
// ---------------------------------------------------------------------------

/// A `workflow_run` delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowRunEvent {
    pub action: String,
    pub workflow_run: WorkflowRunInfo,
    pub repository: RepositoryRef,
}

impl WorkflowRunEvent {
    /// True when the run finished with `conclusion == "failure"`.
    pub fn is_failure(&self) -> bool {
        is_completed_failure(&self.action, self.workflow_run.conclusion.as_deref())
    }
}

/// A `check_suite` delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckSuiteEvent {
    pub action: String,
    pub check_suite: CheckSuiteInfo,
    pub repository: RepositoryRef,
}

impl CheckSuiteEvent {
    /// True when the suite finished with `conclusion == "failure"`.
    pub fn is_failure(&self) -> bool {
        is_completed_failure(&self.action, self.check_suite.conclusion.as_deref())
    }
}

/// A decoded delivery, keyed by its event kind.
#[derive(Debug, Clone)]
pub enum InboundEvent {
    WorkflowRun(WorkflowRunEvent),
    CheckSuite(CheckSuiteEvent),
    /// Unsupported kind; accepted and ignored.
    Ignored(String),
}

impl InboundEvent {
    /// Decode `payload` according to `kind`. Unsupported kinds are not
    /// inspected.
    pub fn decode(kind: &EventKind, payload: Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            EventKind::WorkflowRun => Self::WorkflowRun(serde_json::from_value(payload)?),
            EventKind::CheckSuite => Self::CheckSuite(serde_json::from_value(payload)?),
            EventKind::Other(kind) => Self::Ignored(kind.clone()),
        })
    }

    /// Repository the delivery belongs to.
    pub fn repository(&self) -> Option<&RepositoryRef> {
        match self {
            Self::WorkflowRun(event) => Some(&event.repository),
            Self::CheckSuite(event) => Some(&event.repository),
            Self::Ignored(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn workflow_run_body(action: &str, conclusion: Option<&str>) -> Value {
        json!({
            "action": action,
            "workflow_run": {
                "id": 30433642,
                "name": "CI",
                "head_branch": "main",
                "head_sha": "abcdef1234567890",
                "status": "completed",
                "conclusion": conclusion,
                "html_url": "https://github.com/org/repo/actions/runs/30433642"
            },
            "repository": {
                "id": 1296269,
                "full_name": "org/repo",
                "html_url": "https://github.com/org/repo"
            },
            "sender": { "login": "octocat" }
        })
    }

    #[test]
    fn test_event_kind_from_header() {
        assert_eq!(EventKind::from_header(Some("workflow_run")), EventKind::WorkflowRun);
        assert_eq!(EventKind::from_header(Some("check_suite")), EventKind::CheckSuite);
        assert_eq!(
            EventKind::from_header(Some("Workflow_Run")),
            EventKind::Other("Workflow_Run".into())
        );
        assert_eq!(EventKind::from_header(None).to_string(), "unknown");
    }

    #[test]
    fn test_decode_workflow_run() {
        let body = workflow_run_body("completed", Some("failure"));
        let event = InboundEvent::decode(&EventKind::WorkflowRun, body).unwrap();
        assert_eq!(
            event.repository().map(|r| r.html_url.as_str()),
            Some("https://github.com/org/repo")
        );
        match event {
            InboundEvent::WorkflowRun(run) => {
                assert!(run.is_failure());
                assert_eq!(run.workflow_run.name, "CI");
                assert_eq!(run.repository.full_name, "org/repo");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_failure_requires_completed_action() {
        let body = workflow_run_body("in_progress", Some("failure"));
        let run: WorkflowRunEvent = serde_json::from_value(body).unwrap();
        assert!(!run.is_failure());

        let body = workflow_run_body("completed", Some("success"));
        let run: WorkflowRunEvent = serde_json::from_value(body).unwrap();
        assert!(!run.is_failure());

        let body = workflow_run_body("completed", None);
        let run: WorkflowRunEvent = serde_json::from_value(body).unwrap();
        assert!(!run.is_failure());
        assert_eq!(run.workflow_run.outcome(), "completed");
    }

    #[test]
    fn test_decode_check_suite_missing_field() {
        let body = json!({
            "action": "completed",
            "repository": { "full_name": "o/r", "html_url": "u" }
        });
        assert!(InboundEvent::decode(&EventKind::CheckSuite, body).is_err());
    }

    #[test]
    fn test_unsupported_kind_is_not_parsed() {
        let event =
            InboundEvent::decode(&EventKind::Other("ping".into()), json!({"zen": "hi"})).unwrap();
        assert!(matches!(event, InboundEvent::Ignored(ref k) if k == "ping"));
        assert!(event.repository().is_none());
    }
}
