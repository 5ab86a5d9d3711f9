//! Synchronous client core for a social-network REST API.
//!
//! # Overview
//! Exposes hundreds of thin per-endpoint methods (users, friends/followers,
//! direct messages, lists, search) built on a small set of shared
//! mechanisms: identifier resolution, batch resolution, request dispatch
//! against one of two hosts, HTTP failure classification, and cursor-based
//! pagination. All actual I/O goes through an injected [`Transport`], so
//! the core stays deterministic and testable.
//!
//! # Design
//! - `Client` is immutable after construction: a [`Config`] value, the
//!   transport, and an [`IdentityProvider`] for implicit ("me")
//!   identifiers. No global state.
//! - Endpoint methods are one-line compositions of the core primitives;
//!   every design decision (ordering, host routing, error policy) lives in
//!   the primitives, not the call sites.
//! - Callers state identifier intent with [`UserId`] / [`UserRef`] tagged
//!   variants; the core never type-sniffs a value to guess.
//! - Failed responses map to a flat [`ErrorKind`] taxonomy; existence-check
//!   endpoints alone convert `NotFound`/`Forbidden` into `false`.

pub mod client;
pub mod config;
pub mod cursor;
pub mod entity;
pub mod error;
pub mod http;
pub mod ident;
pub mod request;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{Client, RequestOptions, Session};
pub use config::Config;
pub use cursor::{CursorPage, CursorPager, Items, FIRST_CURSOR};
pub use entity::{DirectMessage, Entity, List, Status, User};
pub use error::{classify, ApiError, ErrorKind, HttpError};
pub use http::{Host, HttpMethod, HttpRequest, HttpResponse, Params, Transport, TransportError};
pub use ident::{
    Anonymous, IdentityProvider, ListRef, ParamKeys, StaticIdentity, UserId, UserRef, OWNER_KEYS,
    USER_KEYS,
};
pub use request::{Decoded, RequestSpec, ResponseShape};
