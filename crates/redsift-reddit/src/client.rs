//! [`HttpRedditClient`]: the OAuth HTTP implementation of [`RedditClient`].

use std::time::{Duration, Instant};

use futures::{StreamExt as _, TryStreamExt as _, stream};
use redsift_core::{
  FetchError,
  item::{Author, Comment, Post},
  remote::{IdStream, RedditClient},
};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use tokio::sync::Mutex;

use crate::{
  Error,
  model::{IdOnly, Listing, RawComment, RawPost, RawRedditor, Thing, flatten_comment_tree, malformed},
};

/// Page size for listings; Reddit caps it at 100.
const PAGE_LIMIT: &str = "100";

/// Refresh the token this long before Reddit says it expires.
const TOKEN_SLACK: Duration = Duration::from_secs(60);

// ─── Configuration ───────────────────────────────────────────────────────────

/// Credentials for a Reddit "script" application.
#[derive(Debug, Clone)]
pub struct RedditConfig {
  pub client_id:     String,
  pub client_secret: String,
  pub username:      String,
  pub password:      String,
  /// Reddit rejects generic user agents; use `<platform>:<app>:<version> (by /u/<name>)`.
  pub user_agent:    String,
  /// Base of the OAuth API, normally `https://oauth.reddit.com`.
  pub api_base:      String,
  /// Token endpoint, normally `https://www.reddit.com/api/v1/access_token`.
  pub token_url:     String,
}

// ─── Client ──────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct Token {
  access_token: String,
  expires_at:   Instant,
}

#[derive(Deserialize)]
struct TokenResponse {
  access_token: String,
  expires_in:   u64,
}

/// Async client for the Reddit OAuth API.
///
/// Holds one bearer token and refreshes it transparently when it is about to
/// expire.
pub struct HttpRedditClient {
  client: Client,
  config: RedditConfig,
  token:  Mutex<Option<Token>>,
}

impl HttpRedditClient {
  pub fn new(config: RedditConfig) -> Result<Self, Error> {
    let client = Client::builder()
      .user_agent(config.user_agent.clone())
      .timeout(Duration::from_secs(30))
      .build()?;
    Ok(Self { client, config, token: Mutex::new(None) })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.api_base.trim_end_matches('/'), path)
  }

  /// Return a valid bearer token, fetching a new one if needed.
  async fn bearer(&self) -> Result<String, FetchError> {
    let mut guard = self.token.lock().await;
    if let Some(token) = guard.as_ref()
      && token.expires_at > Instant::now()
    {
      return Ok(token.access_token.clone());
    }

    tracing::debug!("requesting Reddit access token");
    let resp = self
      .client
      .post(&self.config.token_url)
      .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
      .form(&[
        ("grant_type", "password"),
        ("username", self.config.username.as_str()),
        ("password", self.config.password.as_str()),
      ])
      .send()
      .await
      .map_err(transport)?;

    let resp = check_status(resp)?;
    let body: TokenResponse = resp
      .json()
      .await
      .map_err(|e| malformed(&format!("token response: {e}")))?;

    let lifetime = Duration::from_secs(body.expires_in).saturating_sub(TOKEN_SLACK);
    *guard = Some(Token {
      access_token: body.access_token.clone(),
      expires_at:   Instant::now() + lifetime,
    });
    Ok(body.access_token)
  }

  async fn send(&self, req: RequestBuilder) -> Result<reqwest::Response, FetchError> {
    let token = self.bearer().await?;
    let resp = req.bearer_auth(token).send().await.map_err(transport)?;
    check_status(resp)
  }

  async fn get_json<T: DeserializeOwned>(
    &self,
    path: &str,
    query: &[(&str, &str)],
  ) -> Result<T, FetchError> {
    let req = self
      .client
      .get(self.url(path))
      .query(&[("raw_json", "1")])
      .query(query);
    let resp = self.send(req).await?;
    resp
      .json()
      .await
      .map_err(|e| malformed(&format!("GET {path}: {e}")))
  }

  /// Look a single thing up by fullname through `/api/info`.
  async fn info<T: DeserializeOwned>(&self, fullname: &str) -> Result<T, FetchError> {
    let listing: Listing<T> = self.get_json("/api/info", &[("id", fullname)]).await?;
    let expected_kind = fullname.split('_').next().unwrap_or_default();
    listing
      .data
      .children
      .into_iter()
      .find(|thing: &Thing<T>| thing.kind == expected_kind)
      .map(|thing| thing.data)
      .ok_or_else(|| FetchError::NotFound(format!("{fullname} does not exist")))
  }

  /// Page lazily through a listing at `path`, yielding child ids.
  ///
  /// A page is requested only once the ids of the previous page have been
  /// consumed; the stream ends when Reddit stops returning an `after` cursor.
  fn listing<'a>(
    &'a self,
    path: String,
    extra: &'static [(&'static str, &'static str)],
  ) -> IdStream<'a> {
    // `Some(cursor)` = fetch a page after `cursor`; `None` = exhausted.
    let pages = stream::try_unfold(Some(None::<String>), move |state| {
      let path = path.clone();
      async move {
        let Some(after) = state else { return Ok::<_, FetchError>(None) };

        let mut query: Vec<(&str, &str)> = vec![("limit", PAGE_LIMIT)];
        query.extend_from_slice(extra);
        if let Some(cursor) = after.as_deref() {
          query.push(("after", cursor));
        }

        let page: Listing<IdOnly> = self.get_json(&path, &query).await?;
        let ids: Vec<String> = page.data.children.into_iter().map(|t| t.data.id).collect();
        let next = if ids.is_empty() { None } else { page.data.after.map(Some) };
        Ok(Some((ids, next)))
      }
    });

    pages
      .map_ok(|ids| stream::iter(ids.into_iter().map(Ok::<_, FetchError>)))
      .try_flatten()
      .boxed()
  }
}

// ─── RedditClient impl ───────────────────────────────────────────────────────

impl RedditClient for HttpRedditClient {
  async fn fetch_post(&self, post_id: &str) -> Result<Post, FetchError> {
    let raw: RawPost = self.info(&format!("t3_{post_id}")).await?;
    Ok(raw.into())
  }

  async fn fetch_comment(&self, comment_id: &str) -> Result<Comment, FetchError> {
    let raw: RawComment = self.info(&format!("t1_{comment_id}")).await?;
    Ok(raw.into())
  }

  async fn post_comments(&self, post_id: &str) -> Result<Vec<Comment>, FetchError> {
    // Response is `[submission listing, comment listing]`.
    let body: serde_json::Value = self
      .get_json(&format!("/comments/{post_id}"), &[("limit", "500")])
      .await?;
    let listing = body
      .get(1)
      .ok_or_else(|| malformed("comment response without comment listing"))?;

    let mut comments = Vec::new();
    flatten_comment_tree(listing, &mut comments)?;
    Ok(comments)
  }

  fn subreddit_hot<'a>(&'a self, subreddit: &'a str) -> IdStream<'a> {
    self.listing(format!("/r/{subreddit}/hot"), &[])
  }

  async fn fetch_redditor(&self, name: &str) -> Result<Author, FetchError> {
    let thing: Thing<RawRedditor> = self.get_json(&format!("/user/{name}/about"), &[]).await?;
    thing.data.try_into()
  }

  fn redditor_comments<'a>(&'a self, name: &'a str) -> IdStream<'a> {
    self.listing(format!("/user/{name}/comments"), &[("sort", "hot")])
  }

  async fn subscribe(&self, subreddit: &str) -> Result<(), FetchError> {
    let req = self
      .client
      .post(self.url("/api/subscribe"))
      .form(&[("action", "sub"), ("sr_name", subreddit)]);
    self.send(req).await?;
    Ok(())
  }
}

// ─── Error mapping ───────────────────────────────────────────────────────────

fn transport(e: reqwest::Error) -> FetchError { FetchError::Unreachable(e.to_string()) }

fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, FetchError> {
  let status = resp.status();
  let path = resp.url().path().to_owned();
  let msg = || format!("received {} HTTP response from {path}", status.as_u16());
  match status {
    s if s.is_success() => Ok(resp),
    StatusCode::NOT_FOUND => Err(FetchError::NotFound(msg())),
    StatusCode::FORBIDDEN => Err(FetchError::Forbidden(msg())),
    _ => Err(FetchError::Unreachable(msg())),
  }
}
