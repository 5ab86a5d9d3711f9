//! Error taxonomy and HTTP failure classification.
//!
//! # Design
//! Failed HTTP responses are mapped to a flat, fixed set of [`ErrorKind`]s
//! by [`classify`], a pure function of `(status, body)` — the status code is
//! authoritative, the body only contributes the human-readable message.
//! `NotFound` and `Forbidden` get their own kinds because existence-check
//! endpoints convert exactly those into a boolean `false` instead of an
//! error; everything else propagates unchanged to the caller.

use thiserror::Error;

use crate::http::TransportError;

/// Classification of a failed HTTP response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    NotAcceptable,
    RateLimited,
    Unprocessable,
    /// Any other 4xx status.
    ClientError,
    ServerError,
    ServiceUnavailable,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::BadRequest => "bad request",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::NotFound => "not found",
            ErrorKind::NotAcceptable => "not acceptable",
            ErrorKind::RateLimited => "rate limited",
            ErrorKind::Unprocessable => "unprocessable entity",
            ErrorKind::ClientError => "client error",
            ErrorKind::ServerError => "server error",
            ErrorKind::ServiceUnavailable => "service unavailable",
        };
        f.write_str(name)
    }
}

/// A classified HTTP failure. Immutable once constructed.
#[derive(Debug, Clone, Error)]
#[error("{kind} (HTTP {status}): {message}")]
pub struct HttpError {
    pub kind: ErrorKind,
    pub status: u16,
    pub message: String,
    /// Raw response body, kept verbatim for debugging.
    pub body: String,
}

/// Errors surfaced by the client core.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a 4xx/5xx status.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// An implicit ("the authenticated caller") identifier was used but no
    /// authenticated identity is configured.
    #[error("no authenticated identity is configured")]
    IdentityUnavailable,

    /// The transport collaborator failed before a response was obtained.
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    /// A 2xx response body (or expected header) could not be decoded.
    #[error("decode failed: {0}")]
    Decode(String),
}

impl ApiError {
    /// The classification of the underlying HTTP failure, if this is one.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ApiError::Http(e) => Some(e.kind),
            _ => None,
        }
    }
}

/// Map a failed HTTP response to a typed error.
///
/// Deterministic: identical `(status, body)` inputs always produce an
/// identical result. The message comes from the body's `error` field (or
/// the first `errors[].message`) when the body is a JSON object carrying
/// one, else a generic string built from the status.
pub fn classify(status: u16, body: &str) -> HttpError {
    let kind = match status {
        400 => ErrorKind::BadRequest,
        401 => ErrorKind::Unauthorized,
        403 => ErrorKind::Forbidden,
        404 => ErrorKind::NotFound,
        406 => ErrorKind::NotAcceptable,
        420 => ErrorKind::RateLimited,
        422 => ErrorKind::Unprocessable,
        500 => ErrorKind::ServerError,
        502 | 503 | 504 => ErrorKind::ServiceUnavailable,
        s if s >= 500 => ErrorKind::ServerError,
        _ => ErrorKind::ClientError,
    };
    let message = extract_message(body).unwrap_or_else(|| format!("HTTP {status}"));
    HttpError {
        kind,
        status,
        message,
        body: body.to_string(),
    }
}

/// Pull the upstream error message out of a JSON error body, if present.
fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    if let Some(error) = value.get("error").and_then(|v| v.as_str()) {
        return Some(error.to_string());
    }
    value
        .get("errors")?
        .as_array()?
        .first()?
        .get("message")?
        .as_str()
        .map(str::to_string)
}
