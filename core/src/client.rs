//! The API client and its endpoint methods.
//!
//! # Design
//! `Client` holds an immutable [`Config`], the injected [`Transport`], and
//! an [`IdentityProvider`] for implicit identifiers. Every endpoint method
//! is a thin composition of the core primitives: resolve identifiers into
//! parameters, build a [`RequestSpec`], execute it, wrap the decoded value
//! in an entity view or a [`CursorPager`]. Existence-check endpoints
//! (`user_exists`, `is_list_member`, `is_list_subscriber`) convert
//! `NotFound` and `Forbidden` into `false`; every other failure propagates.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde_json::Value;

use crate::config::Config;
use crate::cursor::{CursorPage, CursorPager, FIRST_CURSOR};
use crate::entity::{DirectMessage, List, Status, User};
use crate::error::{ApiError, ErrorKind};
use crate::http::{Params, Transport};
use crate::ident::{
    resolve_list, resolve_user, resolve_users, Anonymous, IdentityProvider, ListRef, ParamKeys,
    StaticIdentity, UserId, UserRef, OWNER_KEYS, USER_KEYS,
};
use crate::request::RequestSpec;

/// Optional request parameters shared by most endpoints.
///
/// Named, defaulted fields replace the upstream convention of a trailing
/// options hash. Unset fields produce no parameter; booleans encode as
/// `"true"`/`"false"`; the exclusion list comma-joins.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub count: Option<u32>,
    pub page: Option<u32>,
    pub since_id: Option<u64>,
    pub max_id: Option<u64>,
    pub include_entities: Option<bool>,
    pub skip_status: Option<bool>,
    /// User ids to exclude (recommendations).
    pub excluded: Vec<u64>,
}

impl RequestOptions {
    pub fn to_params(&self) -> Params {
        let mut params = Params::new();
        if let Some(count) = self.count {
            params.insert("count".to_string(), count.to_string());
        }
        if let Some(page) = self.page {
            params.insert("page".to_string(), page.to_string());
        }
        if let Some(since_id) = self.since_id {
            params.insert("since_id".to_string(), since_id.to_string());
        }
        if let Some(max_id) = self.max_id {
            params.insert("max_id".to_string(), max_id.to_string());
        }
        if let Some(include_entities) = self.include_entities {
            params.insert("include_entities".to_string(), include_entities.to_string());
        }
        if let Some(skip_status) = self.skip_status {
            params.insert("skip_status".to_string(), skip_status.to_string());
        }
        if !self.excluded.is_empty() {
            let joined: Vec<String> = self.excluded.iter().map(u64::to_string).collect();
            params.insert("excluded".to_string(), joined.join(","));
        }
        params
    }
}

/// Synchronous API client over an injected transport.
pub struct Client<T: Transport> {
    config: Config,
    transport: T,
    identity: Arc<dyn IdentityProvider + Send + Sync>,
}

impl<T: Transport> Client<T> {
    /// Build a client. The identity provider is derived from the config's
    /// screen name; without one, implicit identifiers fail with
    /// [`ApiError::IdentityUnavailable`].
    pub fn new(config: Config, transport: T) -> Self {
        let identity: Arc<dyn IdentityProvider + Send + Sync> =
            match config.current_screen_name() {
                Some(name) => Arc::new(StaticIdentity::new(name)),
                None => Arc::new(Anonymous),
            };
        Self::with_identity(config, transport, identity)
    }

    /// Build a client with an explicit identity provider, for callers whose
    /// identity is not a fixed configuration value.
    pub fn with_identity(
        config: Config,
        transport: T,
        identity: Arc<dyn IdentityProvider + Send + Sync>,
    ) -> Self {
        Self {
            config,
            transport,
            identity,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    fn resolve(&self, user: &UserRef, keys: ParamKeys, params: &mut Params) -> Result<(), ApiError> {
        resolve_user(user, keys, params, self.identity.as_ref())
    }

    /// Run `spec` as an existence check: 2xx means the resource exists,
    /// `NotFound`/`Forbidden` mean it does not, anything else is an error.
    /// The upstream answers 403 for suspended or protected subjects, so
    /// both kinds collapse to `false` here.
    fn exists(&self, spec: &RequestSpec) -> Result<bool, ApiError> {
        match self.round_trip(spec) {
            Ok(_) => Ok(true),
            Err(ApiError::Http(e))
                if matches!(e.kind, ErrorKind::NotFound | ErrorKind::Forbidden) =>
            {
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    fn cursored(
        &self,
        mut spec: RequestSpec,
        item_key: &str,
    ) -> Result<CursorPager<'_, T>, ApiError> {
        spec.params
            .entry("cursor".to_string())
            .or_insert_with(|| FIRST_CURSOR.to_string());
        let envelope = self.execute_json(&spec)?;
        let page = CursorPage::from_envelope(envelope, item_key)?;
        Ok(CursorPager::new(self, spec, page))
    }

    fn user_vec(values: Value) -> Result<Vec<User>, ApiError> {
        match values {
            Value::Array(items) => Ok(items.into_iter().map(User::new).collect()),
            other => Err(ApiError::Decode(format!(
                "expected a JSON array of users, got {other}"
            ))),
        }
    }

    // ----- users ----------------------------------------------------------

    /// Extended information for one user.
    pub fn user(&self, user: &UserRef, options: &RequestOptions) -> Result<User, ApiError> {
        let mut params = options.to_params();
        self.resolve(user, USER_KEYS, &mut params)?;
        let value = self.execute_json(&RequestSpec::get("/1/users/show.json", params))?;
        Ok(User::new(value))
    }

    /// Whether the given user exists (false for deleted and suspended
    /// accounts).
    pub fn user_exists(&self, user: &UserId) -> Result<bool, ApiError> {
        let mut params = Params::new();
        self.resolve(&UserRef::User(user.clone()), USER_KEYS, &mut params)?;
        self.exists(&RequestSpec::get("/1/users/show.json", params).raw())
    }

    /// Extended information for up to 100 users in one call.
    pub fn users(&self, users: &[UserId], options: &RequestOptions) -> Result<Vec<User>, ApiError> {
        let mut params = options.to_params();
        resolve_users(users, &mut params);
        let value = self.execute_json(&RequestSpec::get("/1/users/lookup.json", params))?;
        Self::user_vec(value)
    }

    /// Users matching a people-search query.
    pub fn user_search(&self, query: &str, options: &RequestOptions) -> Result<Vec<User>, ApiError> {
        let mut params = options.to_params();
        params.insert("q".to_string(), query.to_string());
        let value = self.execute_json(&RequestSpec::get("/1/users/search.json", params))?;
        Self::user_vec(value)
    }

    /// The list of suggested-user categories.
    pub fn suggestion_categories(&self) -> Result<Value, ApiError> {
        self.execute_json(&RequestSpec::get("/1/users/suggestions.json", Params::new()))
    }

    /// The suggested-user category for `slug`.
    pub fn suggestions(&self, slug: &str) -> Result<Value, ApiError> {
        self.execute_json(&RequestSpec::get(
            format!("/1/users/suggestions/{slug}.json"),
            Params::new(),
        ))
    }

    /// Users in a suggested-user category.
    pub fn suggest_users(&self, slug: &str) -> Result<Vec<User>, ApiError> {
        let value = self.execute_json(&RequestSpec::get(
            format!("/1/users/suggestions/{slug}/members.json"),
            Params::new(),
        ))?;
        Self::user_vec(value)
    }

    /// URL of a user's profile image, read from the redirect `Location`
    /// header. `size` is one of `mini`, `normal`, `bigger` when given.
    pub fn profile_image(&self, screen_name: &str, size: Option<&str>) -> Result<String, ApiError> {
        let mut params = Params::new();
        if let Some(size) = size {
            params.insert("size".to_string(), size.to_string());
        }
        let response = self.round_trip(
            &RequestSpec::get(format!("/1/users/profile_image/{screen_name}"), params).raw(),
        )?;
        response
            .header("location")
            .map(str::to_string)
            .ok_or_else(|| ApiError::Decode("profile image response missing `Location`".into()))
    }

    /// Recommended users for the authenticated caller. The envelope nests
    /// each user under a `user` field.
    pub fn recommendations(&self, options: &RequestOptions) -> Result<Vec<User>, ApiError> {
        let value =
            self.execute_json(&RequestSpec::get("/1/users/recommendations.json", options.to_params()))?;
        match value {
            Value::Array(items) => Ok(items
                .into_iter()
                .map(|mut item| {
                    let nested = item.get_mut("user").map(Value::take);
                    User::new(nested.unwrap_or(item))
                })
                .collect()),
            other => Err(ApiError::Decode(format!(
                "expected a JSON array of recommendations, got {other}"
            ))),
        }
    }

    /// Accounts the given user can contribute to.
    pub fn contributees(&self, user: &UserRef, options: &RequestOptions) -> Result<Vec<User>, ApiError> {
        let mut params = options.to_params();
        self.resolve(user, USER_KEYS, &mut params)?;
        let value = self.execute_json(&RequestSpec::get("/1/users/contributees.json", params))?;
        Self::user_vec(value)
    }

    /// Accounts that can contribute to the given user.
    pub fn contributors(&self, user: &UserRef, options: &RequestOptions) -> Result<Vec<User>, ApiError> {
        let mut params = options.to_params();
        self.resolve(user, USER_KEYS, &mut params)?;
        let value = self.execute_json(&RequestSpec::get("/1/users/contributors.json", params))?;
        Self::user_vec(value)
    }

    // ----- friends and followers ------------------------------------------

    /// Ids of every user the given user follows, as a cursored traversal.
    pub fn friend_ids(&self, user: &UserRef) -> Result<CursorPager<'_, T>, ApiError> {
        let mut params = Params::new();
        self.resolve(user, USER_KEYS, &mut params)?;
        self.cursored(RequestSpec::get("/1/friends/ids.json", params), "ids")
    }

    /// Ids of every user following the given user, as a cursored traversal.
    pub fn follower_ids(&self, user: &UserRef) -> Result<CursorPager<'_, T>, ApiError> {
        let mut params = Params::new();
        self.resolve(user, USER_KEYS, &mut params)?;
        self.cursored(RequestSpec::get("/1/followers/ids.json", params), "ids")
    }

    // ----- direct messages ------------------------------------------------

    /// Most recent direct messages sent to the authenticated caller.
    pub fn direct_messages(&self, options: &RequestOptions) -> Result<Vec<DirectMessage>, ApiError> {
        let value =
            self.execute_json(&RequestSpec::get("/1/direct_messages.json", options.to_params()))?;
        Self::message_vec(value)
    }

    /// Most recent direct messages sent by the authenticated caller.
    pub fn direct_messages_sent(
        &self,
        options: &RequestOptions,
    ) -> Result<Vec<DirectMessage>, ApiError> {
        let value = self.execute_json(&RequestSpec::get(
            "/1/direct_messages/sent.json",
            options.to_params(),
        ))?;
        Self::message_vec(value)
    }

    /// Send a direct message to `user`.
    pub fn direct_message_create(
        &self,
        user: &UserRef,
        text: &str,
    ) -> Result<DirectMessage, ApiError> {
        let mut params = Params::new();
        params.insert("text".to_string(), text.to_string());
        self.resolve(user, USER_KEYS, &mut params)?;
        let value = self.execute_json(&RequestSpec::post("/1/direct_messages/new.json", params))?;
        Ok(DirectMessage::new(value))
    }

    /// Delete a direct message the caller received. Returns the deleted
    /// message.
    pub fn direct_message_destroy(&self, id: u64) -> Result<DirectMessage, ApiError> {
        let value = self.execute_json(&RequestSpec::delete(
            format!("/1/direct_messages/destroy/{id}.json"),
            Params::new(),
        ))?;
        Ok(DirectMessage::new(value))
    }

    fn message_vec(values: Value) -> Result<Vec<DirectMessage>, ApiError> {
        match values {
            Value::Array(items) => Ok(items.into_iter().map(DirectMessage::new).collect()),
            other => Err(ApiError::Decode(format!(
                "expected a JSON array of direct messages, got {other}"
            ))),
        }
    }

    // ----- lists ----------------------------------------------------------

    fn list_params(&self, owner: &UserRef, list: &ListRef) -> Result<Params, ApiError> {
        let mut params = Params::new();
        self.resolve(owner, OWNER_KEYS, &mut params)?;
        resolve_list(list, &mut params);
        Ok(params)
    }

    /// Members of a list, as a cursored traversal of user objects.
    pub fn list_members(
        &self,
        owner: &UserRef,
        list: &ListRef,
    ) -> Result<CursorPager<'_, T>, ApiError> {
        let params = self.list_params(owner, list)?;
        self.cursored(RequestSpec::get("/1/lists/members.json", params), "users")
    }

    /// Whether `user` is a member of the list.
    pub fn is_list_member(
        &self,
        owner: &UserRef,
        list: &ListRef,
        user: &UserId,
    ) -> Result<bool, ApiError> {
        let mut params = self.list_params(owner, list)?;
        self.resolve(&UserRef::User(user.clone()), USER_KEYS, &mut params)?;
        self.exists(&RequestSpec::get("/1/lists/members/show.json", params).raw())
    }

    /// Add up to 100 members to a list in one call. Returns the updated
    /// list.
    pub fn add_list_members(
        &self,
        owner: &UserRef,
        list: &ListRef,
        users: &[UserId],
    ) -> Result<List, ApiError> {
        let mut params = self.list_params(owner, list)?;
        resolve_users(users, &mut params);
        let value =
            self.execute_json(&RequestSpec::post("/1/lists/members/create_all.json", params))?;
        Ok(List::new(value))
    }

    /// Subscribers of a list, as a cursored traversal of user objects.
    pub fn list_subscribers(
        &self,
        owner: &UserRef,
        list: &ListRef,
    ) -> Result<CursorPager<'_, T>, ApiError> {
        let params = self.list_params(owner, list)?;
        self.cursored(RequestSpec::get("/1/lists/subscribers.json", params), "users")
    }

    /// Whether `user` subscribes to the list.
    pub fn is_list_subscriber(
        &self,
        owner: &UserRef,
        list: &ListRef,
        user: &UserId,
    ) -> Result<bool, ApiError> {
        let mut params = self.list_params(owner, list)?;
        self.resolve(&UserRef::User(user.clone()), USER_KEYS, &mut params)?;
        self.exists(&RequestSpec::get("/1/lists/subscribers/show.json", params).raw())
    }

    // ----- search ---------------------------------------------------------

    /// Recent statuses matching a query, from the search host. The envelope
    /// nests results under `statuses`.
    pub fn search(&self, query: &str, options: &RequestOptions) -> Result<Vec<Status>, ApiError> {
        let mut params = options.to_params();
        params.insert("q".to_string(), query.to_string());
        let value = self.execute_json(
            &RequestSpec::get("/phoenix_search.phoenix", params).on_search_host(),
        )?;
        let statuses = value
            .get("statuses")
            .and_then(Value::as_array)
            .cloned()
            .ok_or_else(|| ApiError::Decode("search envelope missing `statuses`".into()))?;
        Ok(statuses.into_iter().map(Status::new).collect())
    }

    /// Recent statuses containing images, from the search host.
    pub fn images(&self, query: &str, options: &RequestOptions) -> Result<Vec<Status>, ApiError> {
        self.facet_search("/i/search/image_facets.json", query, options)
    }

    /// Recent statuses containing videos, from the search host.
    pub fn videos(&self, query: &str, options: &RequestOptions) -> Result<Vec<Status>, ApiError> {
        self.facet_search("/i/search/video_facets.json", query, options)
    }

    fn facet_search(
        &self,
        path: &str,
        query: &str,
        options: &RequestOptions,
    ) -> Result<Vec<Status>, ApiError> {
        let mut params = options.to_params();
        params.insert("q".to_string(), query.to_string());
        let value = self.execute_json(&RequestSpec::get(path, params).on_search_host())?;
        match value {
            Value::Array(items) => Ok(items.into_iter().map(Status::new).collect()),
            other => Err(ApiError::Decode(format!(
                "expected a JSON array of statuses, got {other}"
            ))),
        }
    }
}

/// Facade holding a lazily-constructed default client.
///
/// Replaces the upstream pattern of a bare namespace forwarding unknown
/// calls to an implicit client: the forwarding surface here is the fixed
/// set of methods below, and the client is built on first use from the
/// session's immutable configuration.
pub struct Session {
    config: Config,
    transport: Arc<dyn Transport + Send + Sync>,
    client: OnceCell<Client<Arc<dyn Transport + Send + Sync>>>,
}

impl Session {
    pub fn new(config: Config, transport: Arc<dyn Transport + Send + Sync>) -> Self {
        Self {
            config,
            transport,
            client: OnceCell::new(),
        }
    }

    fn client(&self) -> &Client<Arc<dyn Transport + Send + Sync>> {
        self.client
            .get_or_init(|| Client::new(self.config.clone(), Arc::clone(&self.transport)))
    }

    pub fn user(&self, user: &UserRef, options: &RequestOptions) -> Result<User, ApiError> {
        self.client().user(user, options)
    }

    pub fn user_exists(&self, user: &UserId) -> Result<bool, ApiError> {
        self.client().user_exists(user)
    }

    pub fn users(&self, users: &[UserId], options: &RequestOptions) -> Result<Vec<User>, ApiError> {
        self.client().users(users, options)
    }

    pub fn user_search(&self, query: &str, options: &RequestOptions) -> Result<Vec<User>, ApiError> {
        self.client().user_search(query, options)
    }

    pub fn suggestion_categories(&self) -> Result<Value, ApiError> {
        self.client().suggestion_categories()
    }

    pub fn suggestions(&self, slug: &str) -> Result<Value, ApiError> {
        self.client().suggestions(slug)
    }

    pub fn suggest_users(&self, slug: &str) -> Result<Vec<User>, ApiError> {
        self.client().suggest_users(slug)
    }

    pub fn profile_image(&self, screen_name: &str, size: Option<&str>) -> Result<String, ApiError> {
        self.client().profile_image(screen_name, size)
    }

    pub fn recommendations(&self, options: &RequestOptions) -> Result<Vec<User>, ApiError> {
        self.client().recommendations(options)
    }

    pub fn contributees(&self, user: &UserRef, options: &RequestOptions) -> Result<Vec<User>, ApiError> {
        self.client().contributees(user, options)
    }

    pub fn contributors(&self, user: &UserRef, options: &RequestOptions) -> Result<Vec<User>, ApiError> {
        self.client().contributors(user, options)
    }

    pub fn friend_ids(
        &self,
        user: &UserRef,
    ) -> Result<CursorPager<'_, Arc<dyn Transport + Send + Sync>>, ApiError> {
        self.client().friend_ids(user)
    }

    pub fn follower_ids(
        &self,
        user: &UserRef,
    ) -> Result<CursorPager<'_, Arc<dyn Transport + Send + Sync>>, ApiError> {
        self.client().follower_ids(user)
    }

    pub fn direct_messages(&self, options: &RequestOptions) -> Result<Vec<DirectMessage>, ApiError> {
        self.client().direct_messages(options)
    }

    pub fn direct_messages_sent(
        &self,
        options: &RequestOptions,
    ) -> Result<Vec<DirectMessage>, ApiError> {
        self.client().direct_messages_sent(options)
    }

    pub fn direct_message_create(
        &self,
        user: &UserRef,
        text: &str,
    ) -> Result<DirectMessage, ApiError> {
        self.client().direct_message_create(user, text)
    }

    pub fn direct_message_destroy(&self, id: u64) -> Result<DirectMessage, ApiError> {
        self.client().direct_message_destroy(id)
    }

    pub fn list_members(
        &self,
        owner: &UserRef,
        list: &ListRef,
    ) -> Result<CursorPager<'_, Arc<dyn Transport + Send + Sync>>, ApiError> {
        self.client().list_members(owner, list)
    }

    pub fn is_list_member(
        &self,
        owner: &UserRef,
        list: &ListRef,
        user: &UserId,
    ) -> Result<bool, ApiError> {
        self.client().is_list_member(owner, list, user)
    }

    pub fn add_list_members(
        &self,
        owner: &UserRef,
        list: &ListRef,
        users: &[UserId],
    ) -> Result<List, ApiError> {
        self.client().add_list_members(owner, list, users)
    }

    pub fn list_subscribers(
        &self,
        owner: &UserRef,
        list: &ListRef,
    ) -> Result<CursorPager<'_, Arc<dyn Transport + Send + Sync>>, ApiError> {
        self.client().list_subscribers(owner, list)
    }

    pub fn is_list_subscriber(
        &self,
        owner: &UserRef,
        list: &ListRef,
        user: &UserId,
    ) -> Result<bool, ApiError> {
        self.client().is_list_subscriber(owner, list, user)
    }

    pub fn search(&self, query: &str, options: &RequestOptions) -> Result<Vec<Status>, ApiError> {
        self.client().search(query, options)
    }

    pub fn images(&self, query: &str, options: &RequestOptions) -> Result<Vec<Status>, ApiError> {
        self.client().images(query, options)
    }

    pub fn videos(&self, query: &str, options: &RequestOptions) -> Result<Vec<Status>, ApiError> {
        self.client().videos(query, options)
    }
}
