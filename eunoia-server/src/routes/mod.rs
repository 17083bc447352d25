// eunoia-server/src/routes/mod.rs

use axum::http::StatusCode;
use tracing::error;

use eunoia_core::Error;

pub mod auth;
pub mod entities;
pub mod integrations;
pub mod me;

/// Map a domain error onto the HTTP surface. Persistence and other internal
/// failures are logged in full and surfaced generically; provider failures
/// keep the provider's message, as the original surface did.
pub(crate) fn error_response(err: Error) -> (StatusCode, String) {
    match err {
        Error::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        Error::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
        Error::Auth(msg) => (StatusCode::UNAUTHORIZED, msg),
        Error::Quota(msg) => (StatusCode::TOO_MANY_REQUESTS, msg),
        Error::Llm(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        other => {
            error!("Internal error: {}", other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error, please retry".to_string(),
            )
        }
    }
}
