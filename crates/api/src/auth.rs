//! API-key gate for the `/api` routes.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

/// Header carrying the client's API key.
pub const API_KEY_HEADER: &str = "api_key";

/// Rejects requests whose `api_key` header does not match `expected` with an
/// empty `401`.
pub async fn require_api_key(
    State(expected): State<Arc<str>>,
    req: Request,
    next: Next,
) -> Response {
    let provided = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    if provided != Some(&*expected) {
        tracing::debug!(path = %req.uri().path(), "rejected request without valid api key");
        metrics::counter!("http_unauthorized_total").increment(1);
        return StatusCode::UNAUTHORIZED.into_response();
    }

    next.run(req).await
}
