//! HTTP trigger layer for the redsift harvester.
//!
//! Exposes an axum [`Router`] with a token login and one authenticated `GET`
//! route per collection or analysis job. Each trigger hands its [`Job`] to a
//! background task and answers `202 Accepted` straight away.

pub mod auth;
pub mod error;
pub mod jobs;
pub mod settings;

pub use error::ApiError;
pub use jobs::{Job, JobRunner};
pub use settings::ServerConfig;

use std::sync::Arc;

use axum::{
  Json, Router,
  extract::{Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use auth::{AuthConfig, Authenticated};

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<P> {
  pub runner: Arc<P>,
  pub auth:   Arc<AuthConfig>,
}

impl<P> Clone for AppState<P> {
  fn clone(&self) -> Self {
    Self { runner: Arc::clone(&self.runner), auth: Arc::clone(&self.auth) }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the trigger API.
pub fn router<P: JobRunner>(state: AppState<P>) -> Router {
  Router::new()
    .route("/login",                post(login::<P>))
    .route("/get_sub_post",         get(get_sub_post::<P>))
    .route("/get_sub_posts",        get(get_sub_posts::<P>))
    .route("/get_author_comments",  get(get_author_comments::<P>))
    .route("/get_authors_comments", get(get_authors_comments::<P>))
    .route("/join_new_subs",        get(join_new_subs::<P>))
    .route("/analyze_post",         get(analyze_post::<P>))
    .route("/analyze_posts",        get(analyze_posts::<P>))
    .route("/analyze_comment",      get(analyze_comment::<P>))
    .route("/analyze_comments",     get(analyze_comments::<P>))
    .route("/get_and_analyze_post", get(get_and_analyze_post::<P>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Dispatch helpers ────────────────────────────────────────────────────────

/// Run `job` on a background task and acknowledge it.
fn dispatch<P: JobRunner>(state: &AppState<P>, job: Job) -> Response {
  let route = job.route();
  let runner = Arc::clone(&state.runner);
  info!(%job, "job accepted");
  tokio::spawn(async move {
    let name = job.route();
    match runner.run(job).await {
      Ok(()) => info!(job = name, "job finished"),
      Err(e) => error!(job = name, error = %e, "job failed"),
    }
  });
  (
    StatusCode::ACCEPTED,
    Json(json!({ "message": format!("{route} endpoint") })),
  )
    .into_response()
}

fn required(value: Option<String>, name: &str) -> Result<String, ApiError> {
  value
    .filter(|v| !v.trim().is_empty())
    .ok_or_else(|| ApiError::BadRequest(format!("missing query parameter `{name}`")))
}

// ── Query strings ──

#[derive(Deserialize)]
struct PostIdQuery {
  post_id: Option<String>,
}

#[derive(Deserialize)]
struct SubQuery {
  sub: Option<String>,
}

#[derive(Deserialize)]
struct AuthorQuery {
  author: Option<String>,
}

#[derive(Deserialize)]
struct CommentIdQuery {
  comment_id: Option<String>,
}

#[derive(Deserialize)]
struct LoginRequest {
  api_key: String,
}

// ─── Route handlers ──────────────────────────────────────────────────────────

async fn login<P: JobRunner>(
  State(state): State<AppState<P>>,
  Json(body): Json<LoginRequest>,
) -> Result<Response, ApiError> {
  state.auth.verify_api_key(&body.api_key)?;
  let access_token = state.auth.issue_token()?;
  Ok(Json(json!({ "access_token": access_token })).into_response())
}

async fn get_sub_post<P: JobRunner>(
  _: Authenticated,
  State(state): State<AppState<P>>,
  Query(q): Query<PostIdQuery>,
) -> Result<Response, ApiError> {
  let post_id = required(q.post_id, "post_id")?;
  Ok(dispatch(&state, Job::CollectPost { post_id }))
}

async fn get_sub_posts<P: JobRunner>(
  _: Authenticated,
  State(state): State<AppState<P>>,
  Query(q): Query<SubQuery>,
) -> Result<Response, ApiError> {
  let subreddit = required(q.sub, "sub")?;
  Ok(dispatch(&state, Job::CollectSubreddit { subreddit }))
}

async fn get_author_comments<P: JobRunner>(
  _: Authenticated,
  State(state): State<AppState<P>>,
  Query(q): Query<AuthorQuery>,
) -> Result<Response, ApiError> {
  let author = required(q.author, "author")?;
  Ok(dispatch(&state, Job::CollectAuthor { author }))
}

async fn get_authors_comments<P: JobRunner>(
  _: Authenticated,
  State(state): State<AppState<P>>,
) -> Response {
  dispatch(&state, Job::CollectKnownAuthors)
}

async fn join_new_subs<P: JobRunner>(_: Authenticated, State(state): State<AppState<P>>) -> Response {
  dispatch(&state, Job::JoinNewSubreddits)
}

async fn analyze_post<P: JobRunner>(
  _: Authenticated,
  State(state): State<AppState<P>>,
  Query(q): Query<PostIdQuery>,
) -> Result<Response, ApiError> {
  let post_id = required(q.post_id, "post_id")?;
  Ok(dispatch(&state, Job::AnalyzePost { post_id }))
}

async fn analyze_posts<P: JobRunner>(_: Authenticated, State(state): State<AppState<P>>) -> Response {
  dispatch(&state, Job::AnalyzePosts)
}

async fn analyze_comment<P: JobRunner>(
  _: Authenticated,
  State(state): State<AppState<P>>,
  Query(q): Query<CommentIdQuery>,
) -> Result<Response, ApiError> {
  let comment_id = required(q.comment_id, "comment_id")?;
  Ok(dispatch(&state, Job::AnalyzeComment { comment_id }))
}

async fn analyze_comments<P: JobRunner>(
  _: Authenticated,
  State(state): State<AppState<P>>,
) -> Response {
  dispatch(&state, Job::AnalyzeComments)
}

async fn get_and_analyze_post<P: JobRunner>(
  _: Authenticated,
  State(state): State<AppState<P>>,
  Query(q): Query<PostIdQuery>,
) -> Result<Response, ApiError> {
  let post_id = required(q.post_id, "post_id")?;
  Ok(dispatch(&state, Job::GetAndAnalyzePost { post_id }))
}
