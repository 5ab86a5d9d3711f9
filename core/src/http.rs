//! HTTP transport types for the injected-transport pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The core
//! crate builds `HttpRequest` values and interprets `HttpResponse` values
//! without ever touching the network — the injected [`Transport`] performs
//! the actual round-trip, carrying whatever authentication it was configured
//! with. This separation keeps the core deterministic and easy to test.
//!
//! All fields use owned types (`String`, `Vec`, `BTreeMap`) so values can be
//! recorded, cloned, and replayed freely in tests. Parameters live in a
//! `BTreeMap` so identical logical requests always render identically.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;

/// Flat key→string request parameters, ordered for determinism.
pub type Params = BTreeMap<String, String>;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

/// Which backend a request targets.
///
/// Most endpoints go to the default API host; the search family targets a
/// separate backend. This is an explicit routing decision carried on every
/// request spec, never inferred from the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Host {
    Api,
    Search,
}

/// An HTTP request described as plain data.
///
/// `url` is the absolute base-plus-path URL; `params` travel as a query
/// string for GET/DELETE and as a form body for POST. Encoding is the
/// transport's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub params: Params,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// Look up a header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Opaque failure from the transport collaborator (connection refused, TLS
/// failure, and so on). Distinct from a classified HTTP error: the server
/// was never reached or never answered.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// The injected HTTP collaborator.
///
/// Implementations own connection handling, timeouts, and request signing —
/// none of that lives in the core. An implementation must not treat 4xx/5xx
/// statuses as transport failures; those come back as ordinary
/// `HttpResponse` values for the core to classify.
pub trait Transport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request)
    }
}
