//! Error taxonomy for the client.
//!
//! Every failure the client can surface is one [`Error`] variant. HTTP responses
//! are mapped onto the taxonomy by [`classify`]; transport, decoding and
//! authorization failures carry their own variants.

use std::time::Duration;

use reqwest::{StatusCode, header::HeaderMap};
use serde::Deserialize;
use thiserror::Error;

/// Errors returned by the client.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP 400 or 404. Suppressible with [`crate::action::Action::catch_bad_request`].
    #[error("bad request ({status}): {message}")]
    BadRequest { status: StatusCode, message: String },

    /// Refresh failure, missing refresh credentials or repeated 401.
    #[error("authorization failed: {0}")]
    Auth(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("rate limited (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },

    #[error("server error ({status}): {message}")]
    Server { status: StatusCode, message: String },

    /// Any other non-success status.
    #[error("unexpected status {status}: {message}")]
    Http { status: StatusCode, message: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("operation cancelled")]
    Cancelled,

    #[error("action worker stopped before producing a result")]
    Interrupted,

    #[error("action panicked: {0}")]
    Panicked(String),
}

impl Error {
    pub fn is_bad_request(&self) -> bool {
        matches!(self, Self::BadRequest { .. })
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    /// Hint from the `Retry-After` header of a 429 response.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }

    /// Status code of the response that produced this error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::BadRequest { status, .. }
            | Self::Server { status, .. }
            | Self::Http { status, .. } => Some(*status),
            Self::Auth(_) => None,
            Self::Forbidden(_) => Some(StatusCode::FORBIDDEN),
            Self::RateLimited { .. } => Some(StatusCode::TOO_MANY_REQUESTS),
            Self::Network(e) => e.status(),
            _ => None,
        }
    }
}

/// Result alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Api { error: ApiErrorBody },
    OAuth {
        error: String,
        error_description: Option<String>,
    },
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Extracts a human readable message from an error response body.
pub(crate) fn error_message(status: StatusCode, body: &[u8]) -> String {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(ErrorBody::Api { error }) => error.message,
        Ok(ErrorBody::OAuth {
            error,
            error_description,
        }) => error_description.unwrap_or(error),
        Err(_) => {
            let text = String::from_utf8_lossy(body).trim().to_string();
            if text.is_empty() {
                status.canonical_reason().unwrap_or("unknown").to_string()
            } else {
                text
            }
        }
    }
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Maps a non-success status onto the error taxonomy. Success statuses yield `None`.
pub(crate) fn classify(status: StatusCode, headers: &HeaderMap, body: &[u8]) -> Option<Error> {
    if status.is_success() {
        return None;
    }

    let message = error_message(status, body);
    let err = match status {
        StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND => Error::BadRequest { status, message },
        StatusCode::UNAUTHORIZED => Error::Auth(message),
        StatusCode::FORBIDDEN => Error::Forbidden(message),
        StatusCode::TOO_MANY_REQUESTS => Error::RateLimited {
            retry_after: retry_after(headers),
        },
        s if s.is_server_error() => Error::Server { status, message },
        _ => Error::Http { status, message },
    };
    Some(err)
}
