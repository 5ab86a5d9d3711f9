//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives the client through
//! a ureq-backed transport over real HTTP. Both logical hosts point at the
//! same listener. Validates identifier resolution, host routing, cursor
//! traversal, error classification, and the existence-check policy
//! end-to-end.

use std::sync::Arc;

use chirp_core::{
    ApiError, Client, Config, ErrorKind, HttpMethod, HttpRequest, HttpResponse, ListRef,
    RequestOptions, Session, Transport, TransportError, UserId, UserRef,
};

/// Transport that executes requests with ureq.
///
/// Disables ureq's status-as-error behavior so 4xx/5xx come back as data
/// for the core to classify, and disables redirect following so the core
/// can read `Location` from raw responses.
struct UreqTransport;

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(0)
            .build()
            .new_agent();

        let pairs: Vec<(&str, &str)> = request
            .params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        let result = match request.method {
            HttpMethod::Get => agent.get(&request.url).query_pairs(pairs).call(),
            HttpMethod::Delete => agent.delete(&request.url).query_pairs(pairs).call(),
            HttpMethod::Post => agent.post(&request.url).send_form(pairs),
        };
        let mut response = result.map_err(|e| TransportError::new(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        let body = response.body_mut().read_to_string().unwrap_or_default();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Start the mock server on a random port and return a config pointing both
/// hosts at it.
fn start_server() -> Config {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    let base = format!("http://{addr}");
    Config::new()
        .api_host(&base)
        .search_host(&base)
        .screen_name("sferik")
}

#[test]
fn users_and_direct_messages() {
    let client = Client::new(start_server(), UreqTransport);
    let options = RequestOptions::default();

    // Explicit screen name, explicit id, and the implicit caller all land
    // on the same fixture user.
    let by_name = client.user(&UserRef::from("sferik"), &options).unwrap();
    let by_id = client.user(&UserRef::from(7505382u64), &options).unwrap();
    let me = client.user(&UserRef::Me, &options).unwrap();
    assert_eq!(by_name.screen_name(), Some("sferik"));
    assert_eq!(by_name, by_id);
    assert_eq!(by_name, me);

    // Unknown users surface as classified NotFound with the upstream
    // message.
    let err = client.user(&UserRef::from("no_such_user"), &options).unwrap_err();
    match err {
        ApiError::Http(e) => {
            assert_eq!(e.kind, ErrorKind::NotFound);
            assert_eq!(e.message, "User not found.");
        }
        other => panic!("expected classified error, got {other:?}"),
    }

    // Existence checks: present, deleted, suspended.
    assert!(client.user_exists(&UserId::from("pengwynn")).unwrap());
    assert!(!client.user_exists(&UserId::from("no_such_user")).unwrap());
    assert!(!client.user_exists(&UserId::from("suspended_user")).unwrap());

    // Batch lookup with a mixed batch.
    let users = client
        .users(
            &[UserId::from(7505382u64), UserId::from("pengwynn")],
            &options,
        )
        .unwrap();
    assert_eq!(users.len(), 2);

    // Direct message lifecycle: send, list, destroy, destroy again.
    let sent = client
        .direct_message_create(&UserRef::from("pengwynn"), "testing 123")
        .unwrap();
    assert_eq!(sent.text(), Some("testing 123"));
    assert_eq!(sent.recipient_screen_name(), Some("pengwynn"));

    let inbox = client.direct_messages(&options).unwrap();
    assert_eq!(inbox.len(), 1);
    let outbox = client.direct_messages_sent(&options).unwrap();
    assert_eq!(outbox.len(), 1);

    let id: u64 = sent.id().unwrap().parse().unwrap();
    let destroyed = client.direct_message_destroy(id).unwrap();
    assert_eq!(destroyed.text(), Some("testing 123"));

    let err = client.direct_message_destroy(id).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::NotFound));

    // Raw response shape: the profile image URL comes from the redirect.
    let url = client.profile_image("sferik", Some("mini")).unwrap();
    assert!(url.ends_with("sferik_mini.png"), "unexpected url {url}");

    // People search and the suggestion/recommendation family.
    let found = client.user_search("erik", &options).unwrap();
    assert!(found.iter().any(|u| u.screen_name() == Some("sferik")));

    let categories = client.suggestion_categories().unwrap();
    assert!(!categories.as_array().unwrap().is_empty());
    let category = client.suggestions("art-design").unwrap();
    assert_eq!(category["slug"], "art-design");
    let suggested = client.suggest_users("art-design").unwrap();
    assert_eq!(suggested.len(), 2);

    let recommended = client.recommendations(&options).unwrap();
    assert_eq!(recommended.len(), 2);
    assert!(recommended[0].screen_name().is_some());

    let contributees = client.contributees(&UserRef::Me, &options).unwrap();
    assert_eq!(contributees.len(), 1);
}

#[test]
fn pagination_lists_and_search() {
    let config = start_server();
    let client = Client::new(config.clone(), UreqTransport);

    // Full cursor traversal: three pages, order preserved.
    let pager = client.friend_ids(&UserRef::Me).unwrap();
    assert_eq!(pager.next_cursor(), mock_server::PAGE_SIZE as i64);
    let ids: Vec<u64> = pager
        .into_items()
        .map(|item| item.unwrap().as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![14100886, 18755393, 813286, 20009713, 65493023]);

    // Manual advancement ends in the exhausted state and stays there.
    let mut pager = client.friend_ids(&UserRef::from("sferik")).unwrap();
    while !pager.is_exhausted() {
        pager.advance().unwrap();
    }
    assert!(pager.advance().unwrap().is_empty());

    // Followers page the same way, in reverse fixture order.
    let followers: Vec<u64> = client
        .follower_ids(&UserRef::from("pengwynn"))
        .unwrap()
        .into_items()
        .map(|item| item.unwrap().as_u64().unwrap())
        .collect();
    assert_eq!(followers, vec![7505382]);

    // List membership existence checks, including the 403 fixture.
    let owner = UserRef::from("sferik");
    let list = ListRef::from("presidents");
    assert!(client
        .is_list_member(&owner, &list, &UserId::from(813286u64))
        .unwrap());
    assert!(!client
        .is_list_member(&owner, &list, &UserId::from("pengwynn"))
        .unwrap());
    assert!(!client
        .is_list_member(&owner, &list, &UserId::from("suspended_user"))
        .unwrap());

    // Cursored member listing and batch add.
    let members: Vec<_> = client
        .list_members(&owner, &list)
        .unwrap()
        .into_items()
        .map(Result::unwrap)
        .collect();
    assert_eq!(members.len(), 2);

    let subscribers: Vec<_> = client
        .list_subscribers(&owner, &list)
        .unwrap()
        .into_items()
        .map(Result::unwrap)
        .collect();
    assert_eq!(subscribers.len(), 2);
    assert!(client
        .is_list_subscriber(&owner, &list, &UserId::from(18755393u64))
        .unwrap());

    let updated = client
        .add_list_members(
            &owner,
            &list,
            &[UserId::from(20009713u64), UserId::from("pengwynn")],
        )
        .unwrap();
    assert_eq!(updated.member_count(), Some(4));

    // Search family routes to the search host and unwraps its envelopes.
    let statuses = client.search("twitter", &RequestOptions::default()).unwrap();
    assert_eq!(statuses.len(), 2);
    assert!(statuses[0].text().unwrap().contains("twitter"));

    let images = client.images("sunset", &RequestOptions::default()).unwrap();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].from_user(), Some("sferik"));

    // The facade forwards to the same endpoints through its lazy client.
    let session = Session::new(config, Arc::new(UreqTransport));
    let me = session
        .user(&UserRef::Me, &RequestOptions::default())
        .unwrap();
    assert_eq!(me.screen_name(), Some("sferik"));
}
