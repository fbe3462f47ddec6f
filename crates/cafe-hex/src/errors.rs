use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The order could not be recorded anywhere; the cart is left intact.
    #[error("Failed to place order: {0}")]
    CheckoutFailed(String),

    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, msg) = match &self {
            AppError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
            AppError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
            AppError::CheckoutFailed(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to place order. Please try again.".into(),
            ),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal error".into()),
        };

        let body = serde_json::to_string(&ErrorBody { error: msg })
            .unwrap_or_else(|_| "{\"error\":\"internal serialization\"}".into());
        (code, [("content-type", "application/json")], body).into_response()
    }
}
