//! The `RedditClient` trait: the boundary to the remote content platform.

use std::future::Future;

use futures::stream::BoxStream;

use crate::{
  FetchError,
  item::{Author, Comment, Post},
};

/// A lazy, finite-in-practice listing of remote ids.
///
/// Listings are paged upstream and can be very large; consumers pull ids as
/// they need them instead of materialising the whole listing.
pub type IdStream<'a> = BoxStream<'a, Result<String, FetchError>>;

/// Fetch primitives against the remote platform.
///
/// Every method reports failure through the closed [`FetchError`] set so the
/// caller can tell expected absences apart from an unreachable remote.
pub trait RedditClient: Send + Sync {
  /// Fetch a submission by id (without the `t3_` prefix).
  fn fetch_post<'a>(
    &'a self,
    post_id: &'a str,
  ) -> impl Future<Output = Result<Post, FetchError>> + Send + 'a;

  /// Fetch a comment by id (without the `t1_` prefix).
  fn fetch_comment<'a>(
    &'a self,
    comment_id: &'a str,
  ) -> impl Future<Output = Result<Comment, FetchError>> + Send + 'a;

  /// Every comment beneath a submission, flattened.
  fn post_comments<'a>(
    &'a self,
    post_id: &'a str,
  ) -> impl Future<Output = Result<Vec<Comment>, FetchError>> + Send + 'a;

  /// The subreddit's hot listing, unbounded.
  fn subreddit_hot<'a>(&'a self, subreddit: &'a str) -> IdStream<'a>;

  fn fetch_redditor<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Author, FetchError>> + Send + 'a;

  /// The redditor's comments sorted hot, unbounded.
  fn redditor_comments<'a>(&'a self, name: &'a str) -> IdStream<'a>;

  fn subscribe<'a>(
    &'a self,
    subreddit: &'a str,
  ) -> impl Future<Output = Result<(), FetchError>> + Send + 'a;
}
