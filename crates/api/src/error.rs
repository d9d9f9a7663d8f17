//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use business::OrderError;
use common::ErrorKind;
use store::StoreError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// The request body could not be decoded.
    BadRequest(String),
    /// Order placement failed.
    Order(OrderError),
    /// A catalog read failed.
    Store(StoreError),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::BadRequest(_) => ErrorKind::BadRequest,
            ApiError::Order(err) => err.kind(),
            ApiError::Store(err) => err.kind(),
        }
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
        ErrorKind::Unprocessable => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status = status_for(kind);

        let body = match &self {
            _ if kind == ErrorKind::Internal => {
                tracing::error!(error = ?self, "internal server error");
                serde_json::json!({ "error": "internal server error" })
            }
            ApiError::BadRequest(msg) => serde_json::json!({ "error": msg }),
            ApiError::Order(err) => {
                let mut body = serde_json::json!({ "error": err.to_string() });
                if let Some(missing) = err.missing() {
                    body["missing"] = serde_json::json!(missing);
                }
                body
            }
            ApiError::Store(err) => serde_json::json!({ "error": err.to_string() }),
        };

        metrics::counter!("http_errors_total", "status" => status.as_str().to_string())
            .increment(1);
        (status, axum::Json(body)).into_response()
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        ApiError::Order(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}
