//! GitHub webhook receiver.
//!
//! The handler only pulls the two headers and the raw body out of the
//! request; everything else happens in [`WebhookDispatcher::handle`].
//!
//! [`WebhookDispatcher::handle`]: cirelay_core::dispatch::WebhookDispatcher::handle

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};

use cirelay_core::dispatch::WebhookOutcome;
use cirelay_core::signature::SIGNATURE_HEADER;

use crate::AppState;

const EVENT_HEADER: &str = "x-github-event";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/webhook", post(github_webhook))
}

async fn github_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let event_type = header_str(&headers, EVENT_HEADER);
    let signature = header_str(&headers, SIGNATURE_HEADER);

    let outcome = state.dispatcher.handle(event_type, signature, &body).await;
    outcome_response(outcome)
}

fn outcome_response(outcome: WebhookOutcome) -> Response {
    let status =
        StatusCode::from_u16(outcome.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(outcome.body())).into_response()
}

/// A header value as `&str`, or `None` if absent or not visible ASCII.
fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
