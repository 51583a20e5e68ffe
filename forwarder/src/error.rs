//! Closed error taxonomy for the webhook handler.
//!
//! Every failure mode the handler can hit maps to exactly one variant, and
//! the response boundary matches over the set exhaustively. Messages are
//! pre-redacted: no auth token or webhook URL ever reaches a variant.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use thiserror::Error;

/// Failure delivering a message to the Slack webhook.
///
/// The `body` of a rejection has already been redacted of any webhook URL
/// by the time it is stored here.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Slack webhook failed: {status} {body}")]
    Rejected { status: u16, body: String },

    #[error("Slack webhook unreachable: {0}")]
    Transport(String),
}

/// Top-level handler error, matched exhaustively at the response boundary.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("missing configuration: {0}")]
    Configuration(&'static str),

    #[error("Invalid Twilio signature")]
    Authentication,

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error("{0}")]
    Unexpected(String),
}

/// JSON error body returned for every non-2xx response.
#[derive(Serialize)]
struct ErrorResponse {
    ok: bool,
    error: String,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            RelayError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RelayError::Authentication => StatusCode::UNAUTHORIZED,
            RelayError::Delivery(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RelayError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ErrorResponse {
            ok: false,
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
