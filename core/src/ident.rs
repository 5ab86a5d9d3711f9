//! User and list identifiers and their resolution into request parameters.
//!
//! # Design
//! A user is referenced either explicitly ([`UserId`]: numeric id or screen
//! name) or implicitly ([`UserRef::Me`]: the authenticated caller). The
//! caller states which variant it means — the core never sniffs a value to
//! guess. Resolution writes into an existing [`Params`] map so it composes
//! with options the call site has already merged in, and never sets both
//! the id key and the screen-name key for one identifier.
//!
//! `Me` is resolved through the [`IdentityProvider`] collaborator at
//! resolution time; the caller's screen name is never cached in the
//! identifier itself.

use std::fmt;

use crate::error::ApiError;
use crate::http::Params;

/// An explicit reference to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserId {
    Numeric(u64),
    /// Passed through verbatim: a leading `@`, a digits-only string, or an
    /// empty-looking string is still a screen name if the caller says so.
    ScreenName(String),
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        UserId::Numeric(id)
    }
}

impl From<&str> for UserId {
    fn from(name: &str) -> Self {
        UserId::ScreenName(name.to_string())
    }
}

impl From<String> for UserId {
    fn from(name: String) -> Self {
        UserId::ScreenName(name)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserId::Numeric(id) => write!(f, "{id}"),
            UserId::ScreenName(name) => f.write_str(name),
        }
    }
}

/// A possibly-implicit reference to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserRef {
    User(UserId),
    /// The authenticated caller, resolved through the identity provider.
    Me,
}

impl From<UserId> for UserRef {
    fn from(id: UserId) -> Self {
        UserRef::User(id)
    }
}

impl From<u64> for UserRef {
    fn from(id: u64) -> Self {
        UserRef::User(UserId::Numeric(id))
    }
}

impl From<&str> for UserRef {
    fn from(name: &str) -> Self {
        UserRef::User(UserId::ScreenName(name.to_string()))
    }
}

impl From<String> for UserRef {
    fn from(name: String) -> Self {
        UserRef::User(UserId::ScreenName(name))
    }
}

/// A reference to a list, by numeric id or by slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListRef {
    Id(u64),
    Slug(String),
}

impl From<u64> for ListRef {
    fn from(id: u64) -> Self {
        ListRef::Id(id)
    }
}

impl From<&str> for ListRef {
    fn from(slug: &str) -> Self {
        ListRef::Slug(slug.to_string())
    }
}

/// Parameter key pair a user identifier resolves under.
///
/// Plain user arguments use `user_id`/`screen_name`; list-ownership
/// endpoints address the owner under `owner_id`/`owner_screen_name`.
#[derive(Debug, Clone, Copy)]
pub struct ParamKeys {
    pub id: &'static str,
    pub screen_name: &'static str,
}

pub const USER_KEYS: ParamKeys = ParamKeys {
    id: "user_id",
    screen_name: "screen_name",
};

pub const OWNER_KEYS: ParamKeys = ParamKeys {
    id: "owner_id",
    screen_name: "owner_screen_name",
};

/// Supplies the authenticated caller's screen name for [`UserRef::Me`].
pub trait IdentityProvider {
    fn current_screen_name(&self) -> Result<String, ApiError>;
}

/// Identity provider for unauthenticated use: `Me` always fails with
/// [`ApiError::IdentityUnavailable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl IdentityProvider for Anonymous {
    fn current_screen_name(&self) -> Result<String, ApiError> {
        Err(ApiError::IdentityUnavailable)
    }
}

/// Identity provider backed by a fixed screen name, typically taken from
/// configuration at client construction.
#[derive(Debug, Clone)]
pub struct StaticIdentity(String);

impl StaticIdentity {
    pub fn new(screen_name: impl Into<String>) -> Self {
        Self(screen_name.into())
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_screen_name(&self) -> Result<String, ApiError> {
        Ok(self.0.clone())
    }
}

/// Resolve one user reference into `params` under the given key pair.
///
/// Exactly one of the two keys is written. `Me` queries the identity
/// provider and fails with `IdentityUnavailable` when none is configured —
/// never silently defaulted.
pub fn resolve_user(
    user: &UserRef,
    keys: ParamKeys,
    params: &mut Params,
    identity: &dyn IdentityProvider,
) -> Result<(), ApiError> {
    match user {
        UserRef::User(UserId::Numeric(id)) => {
            params.insert(keys.id.to_string(), id.to_string());
        }
        UserRef::User(UserId::ScreenName(name)) => {
            params.insert(keys.screen_name.to_string(), name.clone());
        }
        UserRef::Me => {
            let name = identity.current_screen_name()?;
            params.insert(keys.screen_name.to_string(), name);
        }
    }
    Ok(())
}

/// Resolve a batch of explicit user references into `params`.
///
/// Stably partitions the input by variant: all screen names in original
/// relative order under `screen_name`, all numeric ids in original relative
/// order under `user_id`, each comma-joined. An empty partition writes no
/// parameter at all. Identical input order always yields identical output
/// strings, so retries and tests see reproducible requests.
pub fn resolve_users(users: &[UserId], params: &mut Params) {
    let mut ids: Vec<String> = Vec::new();
    let mut names: Vec<&str> = Vec::new();
    for user in users {
        match user {
            UserId::Numeric(id) => ids.push(id.to_string()),
            UserId::ScreenName(name) => names.push(name),
        }
    }
    if !ids.is_empty() {
        params.insert(USER_KEYS.id.to_string(), ids.join(","));
    }
    if !names.is_empty() {
        params.insert(USER_KEYS.screen_name.to_string(), names.join(","));
    }
}

/// Resolve a list reference into `params` (`list_id` or `slug`).
pub fn resolve_list(list: &ListRef, params: &mut Params) {
    match list {
        ListRef::Id(id) => {
            params.insert("list_id".to_string(), id.to_string());
        }
        ListRef::Slug(slug) => {
            params.insert("slug".to_string(), slug.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_id_sets_only_user_id() {
        let mut params = Params::new();
        resolve_user(&UserRef::from(7505382u64), USER_KEYS, &mut params, &Anonymous).unwrap();
        assert_eq!(params.get("user_id").map(String::as_str), Some("7505382"));
        assert!(!params.contains_key("screen_name"));
    }

    #[test]
    fn screen_name_passes_through_verbatim() {
        for name in ["sferik", "@sferik", "0", " "] {
            let mut params = Params::new();
            resolve_user(&UserRef::from(name), USER_KEYS, &mut params, &Anonymous).unwrap();
            assert_eq!(params.get("screen_name").map(String::as_str), Some(name));
            assert!(!params.contains_key("user_id"));
        }
    }

    #[test]
    fn me_resolves_through_identity_provider() {
        let mut params = Params::new();
        resolve_user(
            &UserRef::Me,
            USER_KEYS,
            &mut params,
            &StaticIdentity::new("sferik"),
        )
        .unwrap();
        assert_eq!(params.get("screen_name").map(String::as_str), Some("sferik"));
    }

    #[test]
    fn me_without_identity_fails() {
        let mut params = Params::new();
        let err = resolve_user(&UserRef::Me, USER_KEYS, &mut params, &Anonymous).unwrap_err();
        assert!(matches!(err, ApiError::IdentityUnavailable));
        assert!(params.is_empty());
    }

    #[test]
    fn resolution_extends_existing_params() {
        let mut params = Params::new();
        params.insert("include_entities".to_string(), "true".to_string());
        resolve_user(&UserRef::from(813286u64), USER_KEYS, &mut params, &Anonymous).unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("include_entities").map(String::as_str), Some("true"));
    }

    #[test]
    fn owner_keys_select_owner_parameters() {
        let mut params = Params::new();
        resolve_user(&UserRef::from("sferik"), OWNER_KEYS, &mut params, &Anonymous).unwrap();
        assert_eq!(params.get("owner_screen_name").map(String::as_str), Some("sferik"));
        assert!(!params.contains_key("screen_name"));
    }

    #[test]
    fn batch_partitions_preserve_intra_kind_order() {
        let users = [
            UserId::from(813286u64),
            UserId::from("pengwynn"),
            UserId::from(18755393u64),
            UserId::from("erebor"),
        ];
        let mut params = Params::new();
        resolve_users(&users, &mut params);
        assert_eq!(params.get("user_id").map(String::as_str), Some("813286,18755393"));
        assert_eq!(
            params.get("screen_name").map(String::as_str),
            Some("pengwynn,erebor")
        );
    }

    #[test]
    fn batch_omits_empty_partitions() {
        let mut params = Params::new();
        resolve_users(&[UserId::from("sferik"), UserId::from("pengwynn")], &mut params);
        assert!(!params.contains_key("user_id"));
        assert_eq!(
            params.get("screen_name").map(String::as_str),
            Some("sferik,pengwynn")
        );

        let mut params = Params::new();
        resolve_users(&[], &mut params);
        assert!(params.is_empty());
    }

    #[test]
    fn batch_round_trips_through_the_joined_strings() {
        let users = [
            UserId::from("a"),
            UserId::from(1u64),
            UserId::from("b"),
            UserId::from(2u64),
            UserId::from(3u64),
        ];
        let mut params = Params::new();
        resolve_users(&users, &mut params);

        let names: Vec<&str> = params["screen_name"].split(',').collect();
        let ids: Vec<u64> = params["user_id"]
            .split(',')
            .map(|s| s.parse().unwrap())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn list_resolution() {
        let mut params = Params::new();
        resolve_list(&ListRef::from("presidents"), &mut params);
        assert_eq!(params.get("slug").map(String::as_str), Some("presidents"));

        let mut params = Params::new();
        resolve_list(&ListRef::from(12345678u64), &mut params);
        assert_eq!(params.get("list_id").map(String::as_str), Some("12345678"));
    }
}
