//! HTTP-level tests for `HttpRedditClient` against a `wiremock` server.

use futures::{StreamExt as _, TryStreamExt as _};
use redsift_core::{FetchError, remote::RedditClient};
use serde_json::{Value, json};
use wiremock::{
  Mock, MockServer, ResponseTemplate,
  matchers::{body_string_contains, header, method, path, query_param, query_param_is_missing},
};

use crate::{HttpRedditClient, RedditConfig};

async fn setup() -> (MockServer, HttpRedditClient) {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/api/v1/access_token"))
    .and(body_string_contains("grant_type=password"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "access_token": "tok", "token_type": "bearer", "expires_in": 3600
    })))
    .mount(&server)
    .await;

  let client = HttpRedditClient::new(RedditConfig {
    client_id:     "id".into(),
    client_secret: "secret".into(),
    username:      "harvester".into(),
    password:      "hunter2".into(),
    user_agent:    "test:redsift:0.1 (by /u/harvester)".into(),
    api_base:      server.uri(),
    token_url:     format!("{}/api/v1/access_token", server.uri()),
  })
  .unwrap();

  (server, client)
}

fn listing(kind: &str, children: Vec<Value>, after: Option<&str>) -> Value {
  let children: Vec<Value> = children
    .into_iter()
    .map(|data| json!({ "kind": kind, "data": data }))
    .collect();
  json!({ "kind": "Listing", "data": { "after": after, "children": children } })
}

fn ids(ids: &[&str]) -> Vec<Value> { ids.iter().map(|id| json!({ "id": id })).collect() }

// ─── Single items ────────────────────────────────────────────────────────────

#[tokio::test]
async fn fetch_post_normalises_submission() {
  let (server, client) = setup().await;
  Mock::given(method("GET"))
    .and(path("/api/info"))
    .and(query_param("id", "t3_abc"))
    .and(header("authorization", "Bearer tok"))
    .respond_with(ResponseTemplate::new(200).set_body_json(listing(
      "t3",
      vec![json!({
        "id": "abc", "subreddit": "rust", "author": "alice",
        "title": "Hello", "selftext": "World", "created_utc": 1700000000.0,
        "is_original_content": true, "is_video": false,
        "ups": 42, "downs": 0, "subreddit_subscribers": 300000
      })],
      None,
    )))
    .mount(&server)
    .await;

  let post = client.fetch_post("abc").await.unwrap();
  assert_eq!(post.post_id, "abc");
  assert_eq!(post.post_author.as_deref(), Some("alice"));
  assert_eq!(post.post_body, "World");
  assert!(post.is_post_oc);
  assert_eq!(post.post_upvote_count, 42);
  assert_eq!(post.subreddit_members, 300_000);
}

#[tokio::test]
async fn empty_info_listing_is_not_found() {
  let (server, client) = setup().await;
  Mock::given(method("GET"))
    .and(path("/api/info"))
    .respond_with(ResponseTemplate::new(200).set_body_json(listing("t1", vec![], None)))
    .mount(&server)
    .await;

  let err = client.fetch_comment("gone").await.unwrap_err();
  assert!(matches!(err, FetchError::NotFound(_)));
}

#[tokio::test]
async fn status_codes_map_onto_fetch_errors() {
  let (server, client) = setup().await;
  Mock::given(method("GET"))
    .and(path("/user/ghost/about"))
    .respond_with(ResponseTemplate::new(404))
    .mount(&server)
    .await;
  Mock::given(method("GET"))
    .and(path("/user/hidden/about"))
    .respond_with(ResponseTemplate::new(403))
    .mount(&server)
    .await;
  Mock::given(method("GET"))
    .and(path("/user/flaky/about"))
    .respond_with(ResponseTemplate::new(503))
    .mount(&server)
    .await;
  Mock::given(method("GET"))
    .and(path("/user/garbled/about"))
    .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
    .mount(&server)
    .await;

  assert!(matches!(client.fetch_redditor("ghost").await, Err(FetchError::NotFound(_))));
  assert!(matches!(client.fetch_redditor("hidden").await, Err(FetchError::Forbidden(_))));
  assert!(matches!(client.fetch_redditor("flaky").await, Err(FetchError::Unreachable(_))));
  assert!(matches!(
    client.fetch_redditor("garbled").await,
    Err(FetchError::MalformedResponse(_))
  ));
}

#[tokio::test]
async fn token_is_fetched_once_and_reused() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/api/v1/access_token"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "access_token": "tok", "expires_in": 3600
    })))
    .expect(1)
    .mount(&server)
    .await;
  Mock::given(method("GET"))
    .and(path("/user/alice/about"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "kind": "t2",
      "data": { "id": "k1", "name": "alice", "created_utc": 1600000000.0 }
    })))
    .expect(2)
    .mount(&server)
    .await;

  let client = HttpRedditClient::new(RedditConfig {
    client_id:     "id".into(),
    client_secret: "secret".into(),
    username:      "harvester".into(),
    password:      "hunter2".into(),
    user_agent:    "test".into(),
    api_base:      server.uri(),
    token_url:     format!("{}/api/v1/access_token", server.uri()),
  })
  .unwrap();

  let first = client.fetch_redditor("alice").await.unwrap();
  let second = client.fetch_redditor("alice").await.unwrap();
  assert_eq!(first, second);
  assert_eq!(first.author_created_utc, 1_600_000_000);
}

// ─── Listings ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn hot_listing_follows_after_cursor() {
  let (server, client) = setup().await;
  Mock::given(method("GET"))
    .and(path("/r/rust/hot"))
    .and(query_param_is_missing("after"))
    .respond_with(
      ResponseTemplate::new(200).set_body_json(listing("t3", ids(&["a", "b"]), Some("t3_b"))),
    )
    .mount(&server)
    .await;
  Mock::given(method("GET"))
    .and(path("/r/rust/hot"))
    .and(query_param("after", "t3_b"))
    .respond_with(ResponseTemplate::new(200).set_body_json(listing("t3", ids(&["c"]), None)))
    .mount(&server)
    .await;

  let all: Vec<String> = client.subreddit_hot("rust").try_collect().await.unwrap();
  assert_eq!(all, ["a", "b", "c"]);
}

#[tokio::test]
async fn listing_pages_are_fetched_on_demand() {
  let (server, client) = setup().await;
  Mock::given(method("GET"))
    .and(path("/user/alice/comments"))
    .and(query_param("sort", "hot"))
    .and(query_param_is_missing("after"))
    .respond_with(
      ResponseTemplate::new(200).set_body_json(listing("t1", ids(&["c1", "c2"]), Some("t1_c2"))),
    )
    .expect(1)
    .mount(&server)
    .await;
  Mock::given(method("GET"))
    .and(path("/user/alice/comments"))
    .and(query_param("after", "t1_c2"))
    .respond_with(ResponseTemplate::new(200).set_body_json(listing("t1", ids(&["c3"]), None)))
    .expect(0)
    .mount(&server)
    .await;

  let first_two: Vec<String> = client
    .redditor_comments("alice")
    .take(2)
    .map(|r| r.unwrap())
    .collect()
    .await;
  assert_eq!(first_two, ["c1", "c2"]);
}

#[tokio::test]
async fn forbidden_listing_surfaces_as_first_item() {
  let (server, client) = setup().await;
  Mock::given(method("GET"))
    .and(path("/user/private/comments"))
    .respond_with(ResponseTemplate::new(403))
    .mount(&server)
    .await;

  let mut stream = client.redditor_comments("private");
  let first = stream.next().await.unwrap();
  assert!(matches!(first, Err(FetchError::Forbidden(_))));
  assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn post_comments_flattens_reply_tree() {
  let (server, client) = setup().await;
  let comment = |id: &str, replies: Value| {
    json!({ "kind": "t1", "data": {
      "id": id, "author": "bob", "edited": false, "created_utc": 1700000000.0,
      "body": "hi", "link_id": "t3_abc", "subreddit": "rust", "replies": replies
    }})
  };
  let body = json!([
    listing("t3", ids(&["abc"]), None),
    { "kind": "Listing", "data": { "after": null, "children": [
      comment("c1", json!({ "kind": "Listing", "data": { "children": [comment("c2", json!(""))] } })),
      comment("c3", json!("")),
    ]}}
  ]);
  Mock::given(method("GET"))
    .and(path("/comments/abc"))
    .respond_with(ResponseTemplate::new(200).set_body_json(body))
    .mount(&server)
    .await;

  let comments = client.post_comments("abc").await.unwrap();
  let ids: Vec<_> = comments.iter().map(|c| c.comment_id.as_str()).collect();
  assert_eq!(ids, ["c1", "c2", "c3"]);
  assert!(comments.iter().all(|c| c.post_id == "abc"));
}

// ─── Writes ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn subscribe_posts_form() {
  let (server, client) = setup().await;
  Mock::given(method("POST"))
    .and(path("/api/subscribe"))
    .and(body_string_contains("action=sub"))
    .and(body_string_contains("sr_name=rust"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
    .expect(1)
    .mount(&server)
    .await;

  client.subscribe("rust").await.unwrap();
}
