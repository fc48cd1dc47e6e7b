//! HTTP-level tests for the webhook receiver and health endpoint.
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot`; the
//! Telegram Bot API is replaced by a `wiremock` server.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cirelay_core::config::{AppConfig, GitHubConfig, TelegramConfig};
use cirelay_core::dispatch::WebhookDispatcher;
use cirelay_core::notify::Notifier;
use cirelay_core::signature;
use cirelay_web::WebServer;

// ===========================================================================
// Helpers
// ===========================================================================

const SECRET: &str = "It's a Secret to Everybody";

fn app(api_url: &str, secret: Option<&str>, repo: Option<&str>) -> Router {
    let config = AppConfig {
        github: GitHubConfig {
            webhook_secret: secret.map(str::to_string),
            repository: repo.map(str::to_string),
        },
        telegram: TelegramConfig {
            bot_token: "42:abc".into(),
            chat_id: "1001".into(),
            api_url: api_url.into(),
            timeout_secs: 2,
        },
        ..AppConfig::default()
    };
    let notifier = Notifier::new(&config.telegram).unwrap();
    let dispatcher = WebhookDispatcher::new(&config, notifier);
    WebServer::new(config, dispatcher).router()
}

async fn telegram(expected_calls: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot42:abc/sendMessage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(expected_calls)
        .mount(&server)
        .await;
    server
}

fn failed_run_body(repo: &str) -> Vec<u8> {
    // Pretty-printed on purpose: the signature must cover these exact bytes.
    serde_json::to_vec_pretty(&json!({
        "action": "completed",
        "workflow_run": {
            "name": "Build",
            "head_branch": "main",
            "head_sha": "abcdef1234567",
            "status": "completed",
            "conclusion": "failure",
            "html_url": "https://github.com/org/repo/actions/runs/1"
        },
        "repository": {
            "full_name": repo,
            "html_url": format!("https://github.com/{}", repo)
        }
    }))
    .unwrap()
}

fn webhook(event: &str, signature: Option<&str>, body: Vec<u8>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json")
        .header("x-github-event", event);
    if let Some(sig) = signature {
        builder = builder.header("x-hub-signature-256", sig);
    }
    builder.body(Body::from(body)).unwrap()
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// ===========================================================================
// Tests
// ===========================================================================

#[tokio::test]
async fn health_returns_ok() {
    let server = telegram(0).await;
    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app(&server.uri(), Some(SECRET), None), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn signed_failure_is_relayed() {
    let server = telegram(1).await;
    let body = failed_run_body("org/repo");
    let sig = signature::sign(&body, SECRET).unwrap();

    let (status, resp) = send(
        app(&server.uri(), Some(SECRET), None),
        webhook("workflow_run", Some(&sig), body),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp, json!({ "message": "Webhook processed successfully" }));
}

#[tokio::test]
async fn missing_signature_is_rejected() {
    let server = telegram(0).await;
    let (status, resp) = send(
        app(&server.uri(), Some(SECRET), None),
        webhook("workflow_run", None, failed_run_body("org/repo")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp, json!({ "error": "Invalid signature" }));
}

#[tokio::test]
async fn tampered_body_is_rejected() {
    let server = telegram(0).await;
    let body = failed_run_body("org/repo");
    let sig = signature::sign(&body, SECRET).unwrap();
    let mut tampered = body.clone();
    tampered.push(b'\n');

    let (status, _) = send(
        app(&server.uri(), Some(SECRET), None),
        webhook("workflow_run", Some(&sig), tampered),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn other_repository_is_ignored() {
    let server = telegram(0).await;
    let (status, resp) = send(
        app(&server.uri(), None, Some("org/repo")),
        webhook("workflow_run", None, failed_run_body("org/other")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        resp,
        json!({ "message": "Event ignored - not target repository" })
    );
}

#[tokio::test]
async fn unknown_event_is_acknowledged() {
    let server = telegram(0).await;
    let (status, resp) = send(
        app(&server.uri(), None, None),
        webhook("deployment_status", None, failed_run_body("org/repo")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp, json!({ "message": "Webhook processed successfully" }));
}

#[tokio::test]
async fn delivery_failure_is_opaque_500() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized: bot token 42:abc"))
        .expect(1)
        .mount(&server)
        .await;

    let (status, resp) = send(
        app(&server.uri(), None, None),
        webhook("workflow_run", None, failed_run_body("org/repo")),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp, json!({ "error": "Internal server error" }));
}

#[tokio::test]
async fn malformed_json_is_opaque_500() {
    let server = telegram(0).await;
    let (status, resp) = send(
        app(&server.uri(), None, None),
        webhook("check_suite", None, b"{\"action\":".to_vec()),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp, json!({ "error": "Internal server error" }));
}

#[tokio::test]
async fn body_over_limit_is_rejected() {
    let server = telegram(0).await;
    // Default limit is 2 MiB.
    let body = vec![b' '; 3 * 1024 * 1024];

    let resp = app(&server.uri(), None, None)
        .oneshot(webhook("workflow_run", None, body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
