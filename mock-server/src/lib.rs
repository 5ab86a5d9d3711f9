//! In-process mock of the upstream social API, for integration tests.
//!
//! Serves a fixed set of fixture users plus a mutable direct-message store.
//! Covers the endpoint families the client core exercises: user show/lookup
//! (including the 404 and 403 failure fixtures), cursored friend/follower
//! ids, direct messages, list membership, the profile-image redirect, and
//! the search-host endpoints. Both logical hosts are served by the same
//! router; tests point the client's api and search hosts at the same
//! listener.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Form, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

/// Ids paged per cursor request. Small so tests traverse several pages.
pub const PAGE_SIZE: usize = 2;

/// A fixture user profile.
#[derive(Clone, Debug, Serialize)]
pub struct MockUser {
    pub id: u64,
    pub id_str: String,
    pub screen_name: String,
    pub name: String,
    pub followers_count: u64,
}

impl MockUser {
    fn new(id: u64, screen_name: &str, name: &str, followers_count: u64) -> Self {
        Self {
            id,
            id_str: id.to_string(),
            screen_name: screen_name.to_string(),
            name: name.to_string(),
            followers_count,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct MockDirectMessage {
    pub id: u64,
    pub id_str: String,
    pub text: String,
    pub sender_screen_name: String,
    pub recipient_screen_name: String,
}

pub struct Fixtures {
    users: Vec<MockUser>,
    /// Screen names the upstream answers 403 for (suspended accounts).
    suspended: Vec<(u64, String)>,
    friends: HashMap<u64, Vec<u64>>,
    /// Members of the one fixture list, `presidents`, owned by sferik.
    list_members: Vec<u64>,
    messages: RwLock<HashMap<u64, MockDirectMessage>>,
    next_message_id: AtomicU64,
}

pub type Db = Arc<Fixtures>;

fn fixtures() -> Fixtures {
    let users = vec![
        MockUser::new(7505382, "sferik", "Erik Michaels-Ober", 2778),
        MockUser::new(14100886, "pengwynn", "Wynn Netherland", 6107),
        MockUser::new(18755393, "erebor", "Erik Ogan", 212),
        MockUser::new(813286, "barackobama", "Barack Obama", 10000000),
        MockUser::new(20009713, "laserlemon", "Steve Richert", 400),
    ];
    let mut friends = HashMap::new();
    // sferik follows everyone else; enough ids for three pages.
    friends.insert(7505382u64, vec![14100886, 18755393, 813286, 20009713, 65493023]);
    friends.insert(14100886u64, vec![7505382]);
    Fixtures {
        users,
        suspended: vec![(99999999, "suspended_user".to_string())],
        friends,
        list_members: vec![813286, 18755393],
        messages: RwLock::new(HashMap::new()),
        next_message_id: AtomicU64::new(1825786345),
    }
}

pub fn app() -> Router {
    let db: Db = Arc::new(fixtures());
    Router::new()
        .route("/1/users/show.json", get(user_show))
        .route("/1/users/lookup.json", get(users_lookup))
        .route("/1/users/search.json", get(user_search))
        .route("/1/users/suggestions.json", get(suggestion_categories))
        .route("/1/users/suggestions/{slug}", get(suggestion_category))
        .route("/1/users/suggestions/{slug}/members.json", get(suggestion_members))
        .route("/1/users/profile_image/{screen_name}", get(profile_image))
        .route("/1/users/recommendations.json", get(recommendations))
        .route("/1/users/contributees.json", get(contributees))
        .route("/1/users/contributors.json", get(contributees))
        .route("/1/friends/ids.json", get(friend_ids))
        .route("/1/followers/ids.json", get(follower_ids))
        .route("/1/direct_messages.json", get(direct_messages))
        .route("/1/direct_messages/sent.json", get(direct_messages))
        .route("/1/direct_messages/new.json", post(direct_message_create))
        .route("/1/direct_messages/destroy/{id}", delete(direct_message_destroy))
        .route("/1/lists/members.json", get(list_members))
        .route("/1/lists/members/show.json", get(list_member_show))
        .route("/1/lists/members/create_all.json", post(list_add_members))
        .route("/1/lists/subscribers.json", get(list_members))
        .route("/1/lists/subscribers/show.json", get(list_member_show))
        .route("/phoenix_search.phoenix", get(phoenix_search))
        .route("/i/search/image_facets.json", get(facet_search))
        .route("/i/search/video_facets.json", get(facet_search))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

type ParamMap = HashMap<String, String>;

fn error_body(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn find_user<'a>(db: &'a Fixtures, params: &ParamMap) -> Option<&'a MockUser> {
    if let Some(id) = params.get("user_id").and_then(|v| v.parse::<u64>().ok()) {
        return db.users.iter().find(|u| u.id == id);
    }
    let name = params.get("screen_name")?;
    db.users.iter().find(|u| &u.screen_name == name)
}

fn is_suspended(db: &Fixtures, params: &ParamMap) -> bool {
    db.suspended.iter().any(|(id, name)| {
        params.get("user_id").map(String::as_str) == Some(id.to_string().as_str())
            || params.get("screen_name").map(String::as_str) == Some(name.as_str())
    })
}

/// Slice `all` at `cursor` (−1 or 0 both mean the start) and compute the
/// follow-up cursor: the next offset, or 0 when this was the last page.
fn cursor_slice<T: Clone>(all: &[T], cursor: i64) -> (Vec<T>, i64, i64) {
    let offset = if cursor <= 0 { 0 } else { (cursor as usize).min(all.len()) };
    let end = (offset + PAGE_SIZE).min(all.len());
    let next = if end < all.len() { end as i64 } else { 0 };
    let previous = if offset == 0 { 0 } else { offset as i64 };
    (all[offset..end].to_vec(), next, previous)
}

async fn user_show(State(db): State<Db>, Query(params): Query<ParamMap>) -> Response {
    if is_suspended(&db, &params) {
        return error_body(StatusCode::FORBIDDEN, "User has been suspended.");
    }
    match find_user(&db, &params) {
        Some(user) => Json(user.clone()).into_response(),
        None => error_body(StatusCode::NOT_FOUND, "User not found."),
    }
}

async fn users_lookup(State(db): State<Db>, Query(params): Query<ParamMap>) -> Json<Value> {
    let mut found: Vec<&MockUser> = Vec::new();
    if let Some(ids) = params.get("user_id") {
        for id in ids.split(',').filter_map(|s| s.parse::<u64>().ok()) {
            found.extend(db.users.iter().filter(|u| u.id == id));
        }
    }
    if let Some(names) = params.get("screen_name") {
        for name in names.split(',') {
            found.extend(db.users.iter().filter(|u| u.screen_name == name));
        }
    }
    Json(json!(found))
}

async fn user_search(State(db): State<Db>, Query(params): Query<ParamMap>) -> Json<Value> {
    let q = params.get("q").cloned().unwrap_or_default().to_lowercase();
    let found: Vec<&MockUser> = db
        .users
        .iter()
        .filter(|u| u.name.to_lowercase().contains(&q) || u.screen_name.to_lowercase().contains(&q))
        .collect();
    Json(json!(found))
}

async fn suggestion_categories() -> Json<Value> {
    Json(json!([
        { "name": "Art & Design", "slug": "art-design", "size": 40 },
        { "name": "Technology", "slug": "technology", "size": 40 }
    ]))
}

async fn suggestion_category(Path(slug): Path<String>) -> Json<Value> {
    // The route captures the whole segment; drop the `.json` extension.
    let slug = slug.trim_end_matches(".json");
    Json(json!({ "name": "Art & Design", "slug": slug, "size": 40 }))
}

async fn suggestion_members(State(db): State<Db>, Path(_slug): Path<String>) -> Json<Value> {
    Json(json!(db.users.iter().take(2).collect::<Vec<_>>()))
}

async fn profile_image(Path(screen_name): Path<String>, Query(params): Query<ParamMap>) -> Response {
    let size = params.get("size").cloned().unwrap_or_else(|| "normal".to_string());
    let location = format!("http://a0.example.com/profile_images/{screen_name}_{size}.png");
    (StatusCode::FOUND, [(header::LOCATION, location)], "").into_response()
}

async fn recommendations(State(db): State<Db>) -> Json<Value> {
    let recs: Vec<Value> = db
        .users
        .iter()
        .take(2)
        .map(|u| json!({ "user": u, "token": "DvLmhCuzB" }))
        .collect();
    Json(json!(recs))
}

async fn contributees(State(db): State<Db>) -> Json<Value> {
    Json(json!(db.users.iter().take(1).collect::<Vec<_>>()))
}

async fn friend_ids(State(db): State<Db>, Query(params): Query<ParamMap>) -> Response {
    ids_page(&db, &params, false)
}

async fn follower_ids(State(db): State<Db>, Query(params): Query<ParamMap>) -> Response {
    ids_page(&db, &params, true)
}

fn ids_page(db: &Fixtures, params: &ParamMap, reversed: bool) -> Response {
    let Some(user) = find_user(db, params) else {
        return error_body(StatusCode::NOT_FOUND, "User not found.");
    };
    let mut all = db.friends.get(&user.id).cloned().unwrap_or_default();
    if reversed {
        all.reverse();
    }
    let cursor: i64 = params.get("cursor").and_then(|c| c.parse().ok()).unwrap_or(-1);
    let (ids, next, previous) = cursor_slice(&all, cursor);
    Json(json!({ "ids": ids, "next_cursor": next, "previous_cursor": previous })).into_response()
}

async fn direct_messages(State(db): State<Db>) -> Json<Value> {
    let messages = db.messages.read().await;
    let mut all: Vec<&MockDirectMessage> = messages.values().collect();
    all.sort_by_key(|m| m.id);
    Json(json!(all))
}

async fn direct_message_create(State(db): State<Db>, Form(params): Form<ParamMap>) -> Response {
    let Some(text) = params.get("text") else {
        return error_body(StatusCode::BAD_REQUEST, "Missing required parameter: text");
    };
    let Some(recipient) = find_user(&db, &params) else {
        return error_body(StatusCode::NOT_FOUND, "User not found.");
    };
    let id = db.next_message_id.fetch_add(1, Ordering::SeqCst);
    let message = MockDirectMessage {
        id,
        id_str: id.to_string(),
        text: text.clone(),
        sender_screen_name: "sferik".to_string(),
        recipient_screen_name: recipient.screen_name.clone(),
    };
    db.messages.write().await.insert(id, message.clone());
    Json(message).into_response()
}

async fn direct_message_destroy(State(db): State<Db>, Path(id): Path<String>) -> Response {
    // The route captures the whole segment; drop the `.json` extension.
    let Ok(id) = id.trim_end_matches(".json").parse::<u64>() else {
        return error_body(StatusCode::BAD_REQUEST, "Invalid id.");
    };
    match db.messages.write().await.remove(&id) {
        Some(message) => Json(message).into_response(),
        None => error_body(StatusCode::NOT_FOUND, "Direct message not found."),
    }
}

fn list_exists(params: &ParamMap) -> bool {
    let owner_ok = params.get("owner_screen_name").map(String::as_str) == Some("sferik")
        || params.get("owner_id").map(String::as_str) == Some("7505382");
    let list_ok = params.get("slug").map(String::as_str) == Some("presidents")
        || params.get("list_id").map(String::as_str) == Some("12345678");
    owner_ok && list_ok
}

fn list_body(member_count: usize) -> Value {
    json!({
        "id": 12345678,
        "id_str": "12345678",
        "name": "presidents",
        "slug": "presidents",
        "member_count": member_count
    })
}

async fn list_members(State(db): State<Db>, Query(params): Query<ParamMap>) -> Response {
    if !list_exists(&params) {
        return error_body(StatusCode::NOT_FOUND, "List not found.");
    }
    let members: Vec<&MockUser> = db
        .list_members
        .iter()
        .filter_map(|id| db.users.iter().find(|u| u.id == *id))
        .collect();
    let cursor: i64 = params.get("cursor").and_then(|c| c.parse().ok()).unwrap_or(-1);
    let (users, next, previous) = cursor_slice(&members, cursor);
    Json(json!({ "users": users, "next_cursor": next, "previous_cursor": previous }))
        .into_response()
}

async fn list_member_show(State(db): State<Db>, Query(params): Query<ParamMap>) -> Response {
    if !list_exists(&params) {
        return error_body(StatusCode::NOT_FOUND, "List not found.");
    }
    if is_suspended(&db, &params) {
        return error_body(StatusCode::FORBIDDEN, "User has been suspended.");
    }
    let is_member = match find_user(&db, &params) {
        Some(user) => db.list_members.contains(&user.id),
        None => false,
    };
    if is_member {
        Json(list_body(db.list_members.len())).into_response()
    } else {
        error_body(StatusCode::NOT_FOUND, "The specified user is not a member of this list.")
    }
}

async fn list_add_members(State(db): State<Db>, Form(params): Form<ParamMap>) -> Response {
    if !list_exists(&params) {
        return error_body(StatusCode::NOT_FOUND, "List not found.");
    }
    let ids = params
        .get("user_id")
        .map(|v| v.split(',').count())
        .unwrap_or(0);
    let names = params
        .get("screen_name")
        .map(|v| v.split(',').count())
        .unwrap_or(0);
    Json(list_body(db.list_members.len() + ids + names)).into_response()
}

async fn phoenix_search(Query(params): Query<ParamMap>) -> Json<Value> {
    let q = params.get("q").cloned().unwrap_or_default();
    Json(json!({
        "statuses": [
            { "id_str": "28447023", "text": format!("{q} is looking good"), "from_user": "pengwynn" },
            { "id_str": "28447024", "text": format!("more about {q}"), "from_user": "erebor" }
        ]
    }))
}

async fn facet_search(Query(params): Query<ParamMap>) -> Json<Value> {
    let q = params.get("q").cloned().unwrap_or_default();
    Json(json!([
        { "id_str": "28447025", "text": format!("{q} with media"), "from_user": "sferik" }
    ]))
}
