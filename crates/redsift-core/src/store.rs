//! The `HarvestStore` trait and supporting types.
//!
//! Implemented by storage backends (e.g. `redsift-store-sqlite`). The pipeline
//! depends on this abstraction, never on a concrete backend.

use std::{collections::HashSet, future::Future};

use crate::{
  item::{Author, Comment, Post},
  record::{AnalysisRecord, Category, ErrorRecord, Subscription},
};

/// A column of remote ids the dedup check can run against.
///
/// Table and column names in dedup queries come only from this set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdColumn {
  /// `post.post_id`
  PostId,
  /// `comment.comment_id`
  CommentId,
  /// `author.author_name`
  AuthorName,
}

impl IdColumn {
  pub fn table(self) -> &'static str {
    match self {
      Self::PostId => "post",
      Self::CommentId => "comment",
      Self::AuthorName => "author",
    }
  }

  pub fn column(self) -> &'static str {
    match self {
      Self::PostId => "post_id",
      Self::CommentId => "comment_id",
      Self::AuthorName => "author_name",
    }
  }
}

/// Abstraction over the harvest store.
///
/// Every write is a single append-only row keyed by a natural id. Inserting a
/// row whose key already exists is not an error; the insert methods return
/// `false` instead and leave the stored row untouched.
pub trait HarvestStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Append-only writes ────────────────────────────────────────────────

  fn insert_post<'a>(
    &'a self,
    post: &'a Post,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  fn insert_comment<'a>(
    &'a self,
    comment: &'a Comment,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  fn insert_author<'a>(
    &'a self,
    author: &'a Author,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  fn insert_subscription<'a>(
    &'a self,
    subscription: &'a Subscription,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Append to the error ledger. Always writes a row.
  fn insert_error<'a>(
    &'a self,
    record: &'a ErrorRecord,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Returns `false` if an analysis with the same `shasum_512` is already
  /// stored.
  fn insert_analysis<'a>(
    &'a self,
    record: &'a AnalysisRecord,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  // ── Dedup primitive ───────────────────────────────────────────────────

  /// Return the subset of `candidates` already present in `column`.
  fn existing_ids<'a>(
    &'a self,
    column: IdColumn,
    candidates: &'a [String],
  ) -> impl Future<Output = Result<HashSet<String>, Self::Error>> + Send + 'a;

  // ── Reads ─────────────────────────────────────────────────────────────

  fn get_post<'a>(
    &'a self,
    post_id: &'a str,
  ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send + 'a;

  fn get_comment<'a>(
    &'a self,
    comment_id: &'a str,
  ) -> impl Future<Output = Result<Option<Comment>, Self::Error>> + Send + 'a;

  /// Every stored author name, in insertion order.
  fn author_names(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  /// Ids of stored posts with no analysis document of category `post`.
  fn unanalyzed_post_ids(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  /// Ids of stored comments with no analysis document of category `comment`.
  fn unanalyzed_comment_ids(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  /// Distinct subreddits seen in stored posts with no subscription row.
  fn unsubscribed_subreddits(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  /// Analyses stored for one item, oldest first.
  fn list_analyses<'a>(
    &'a self,
    category: Category,
    reference_id: &'a str,
  ) -> impl Future<Output = Result<Vec<AnalysisRecord>, Self::Error>> + Send + 'a;

  /// The full error ledger, oldest first.
  fn list_errors(
    &self,
  ) -> impl Future<Output = Result<Vec<ErrorRecord>, Self::Error>> + Send + '_;
}
