//! Collection: walking Reddit and storing what the store does not yet hold.
//!
//! Expected fetch failures (not found, forbidden, malformed) are written to
//! the error ledger at the narrowest scope that can carry on without them.
//! An unreachable remote or a store failure ends the run; rows written before
//! that point stay.

use chrono::Utc;
use redsift_core::{
  FetchError,
  inference::InferenceBackend,
  item::{Comment, Post, SENTINEL_ACCOUNT, USER_SUBREDDIT_PREFIX, is_sentinel},
  record::{COMMENT_ID_NOT_AVAILABLE, ErrorKind, Subscription},
  remote::RedditClient,
  store::{HarvestStore, IdColumn},
};
use tracing::{debug, info, warn};

use crate::{
  Error, Pipeline, Result, dedup::resolve_new_ids, error::store_err, lang::LanguageDetector,
  ledger,
};

impl<S, R, B, D> Pipeline<S, R, B, D>
where
  S: HarvestStore,
  R: RedditClient,
  B: InferenceBackend,
  D: LanguageDetector,
{
  // ── Triggers ──────────────────────────────────────────────────────────────

  /// Fetch and store one post, its author, and every comment beneath it
  /// together with their authors.
  ///
  /// Comments are stored without a dedup pass; rows already present are
  /// left untouched by the store.
  pub async fn collect_post(&self, post_id: &str) -> Result<()> {
    info!(post_id, "collecting post");
    let post = self.reddit.fetch_post(post_id).await?;
    self.store_post(&post).await?;

    let comments = self.reddit.post_comments(post_id).await?;
    info!(post_id, comments = comments.len(), "collecting comments");
    for comment in &comments {
      self.store_comment(comment).await?;
    }
    Ok(())
  }

  /// Collect every hot post of `subreddit` not already stored. Returns the
  /// number of new post ids found.
  pub async fn collect_subreddit_posts(&self, subreddit: &str) -> Result<usize> {
    info!(subreddit, "collecting subreddit posts");
    let listing = self.reddit.subreddit_hot(subreddit);
    let new_ids = match resolve_new_ids(
      &self.store,
      IdColumn::PostId,
      listing,
      self.settings.dedup_chunk,
    )
    .await
    {
      Ok(ids) => ids,
      Err(Error::Fetch(e)) if e.is_expected() => {
        ledger::record(&self.store, ErrorKind::GetSubPosts, subreddit, &e).await?;
        return Ok(0);
      }
      Err(e) => return Err(e),
    };

    info!(subreddit, new = new_ids.len(), "new posts");
    let mut pacer = self.pacer();
    for post_id in &new_ids {
      match self.collect_post(post_id).await {
        Ok(()) => {}
        Err(Error::Fetch(e)) if e.is_expected() => {
          ledger::record(&self.store, ErrorKind::GetSubPosts, post_id, &e).await?;
        }
        Err(e) => return Err(e),
      }
      pacer.pace().await;
    }
    Ok(new_ids.len())
  }

  /// Store the redditor `name` unless it is the sentinel account or already
  /// stored.
  pub async fn collect_author(&self, name: &str) -> Result<()> {
    if is_sentinel(Some(name)) {
      return Ok(());
    }
    let known = self
      .store
      .existing_ids(IdColumn::AuthorName, &[name.to_owned()])
      .await
      .map_err(store_err)?;
    if !known.is_empty() {
      debug!(author = name, "author already stored");
      return Ok(());
    }

    info!(author = name, "processing author");
    match self.reddit.fetch_redditor(name).await {
      Ok(author) if author.author_name == SENTINEL_ACCOUNT => Ok(()),
      Ok(author) => {
        self.store.insert_author(&author).await.map_err(store_err)?;
        Ok(())
      }
      Err(e) if e.is_expected() => ledger::record(&self.store, ErrorKind::Author, name, &e).await,
      Err(e) => Err(e.into()),
    }
  }

  /// Collect every hot comment of `name` not already stored, along with the
  /// post each one was made on. Returns the number of new comment ids found.
  pub async fn collect_author_comments(&self, name: &str) -> Result<usize> {
    info!(author = name, "collecting author comments");
    let listing = self.reddit.redditor_comments(name);
    let new_ids = match resolve_new_ids(
      &self.store,
      IdColumn::CommentId,
      listing,
      self.settings.dedup_chunk,
    )
    .await
    {
      Ok(ids) => ids,
      Err(Error::Fetch(e @ FetchError::NotFound(_))) => {
        ledger::record(&self.store, ErrorKind::RedditorDeleted, name, &e).await?;
        return Ok(0);
      }
      // Suspended or blocked: the listing is refused as a whole.
      Err(Error::Fetch(e)) if e.is_expected() => {
        ledger::record(&self.store, ErrorKind::Comment, COMMENT_ID_NOT_AVAILABLE, &e).await?;
        return Ok(0);
      }
      Err(e) => return Err(e),
    };

    if new_ids.is_empty() {
      info!(author = name, "no new comments");
      return Ok(0);
    }

    info!(author = name, new = new_ids.len(), "new comments");
    let mut pacer = self.pacer();
    for comment_id in &new_ids {
      match self.collect_author_comment(comment_id).await {
        Ok(()) => {}
        Err(Error::Fetch(e)) if e.is_expected() => {
          ledger::record(&self.store, ErrorKind::Comment, comment_id, &e).await?;
        }
        Err(e) => return Err(e),
      }
      pacer.pace().await;
    }
    Ok(new_ids.len())
  }

  /// Run [`collect_author_comments`](Self::collect_author_comments) for every
  /// stored author, pacing between authors.
  pub async fn collect_all_known_authors(&self) -> Result<()> {
    let names = self.store.author_names().await.map_err(store_err)?;
    if names.is_empty() {
      warn!("no authors stored");
      return Ok(());
    }

    let mut pacer = self.pacer();
    for name in &names {
      self.collect_author_comments(name).await?;
      pacer.pace().await;
    }
    Ok(())
  }

  /// Subscribe to every subreddit seen in stored posts that has no
  /// subscription yet. User-profile subreddits are skipped. Returns the
  /// number joined.
  pub async fn join_new_subreddits(&self) -> Result<usize> {
    let candidates = self.store.unsubscribed_subreddits().await.map_err(store_err)?;
    let subscribed_at = Utc::now().timestamp().to_string();

    let mut joined = 0;
    for subreddit in candidates
      .iter()
      .filter(|s| !s.starts_with(USER_SUBREDDIT_PREFIX))
    {
      info!(subreddit = %subreddit, "joining subreddit");
      match self.reddit.subscribe(subreddit).await {
        Ok(()) => {
          let row = Subscription {
            subreddit:          subreddit.clone(),
            datetimesubscribed: subscribed_at.clone(),
          };
          self.store.insert_subscription(&row).await.map_err(store_err)?;
          joined += 1;
        }
        Err(e) if e.is_expected() => {
          ledger::record(&self.store, ErrorKind::Subreddit, subreddit, &e).await?;
        }
        Err(e) => return Err(e.into()),
      }
    }

    if joined == 0 {
      info!("no new subreddits joined");
    }
    Ok(joined)
  }

  // ── Helpers ───────────────────────────────────────────────────────────────

  /// One comment from an author's listing. Tombstoned comments are stored
  /// alone; live ones also pull in the post they belong to. Comments by the
  /// sentinel account are dropped.
  async fn collect_author_comment(&self, comment_id: &str) -> Result<()> {
    let comment = self.reddit.fetch_comment(comment_id).await?;

    if comment.is_tombstone() {
      return self.store_comment(&comment).await;
    }
    if is_sentinel(comment.comment_author.as_deref()) {
      debug!(comment_id, "skipping sentinel comment");
      return Ok(());
    }

    self.store_comment(&comment).await?;
    let post = self.reddit.fetch_post(&comment.post_id).await?;
    self.store_post(&post).await
  }

  async fn store_post(&self, post: &Post) -> Result<()> {
    if let Some(author) = &post.post_author {
      self.collect_author(author).await?;
    }
    self.store.insert_post(post).await.map_err(store_err)?;
    Ok(())
  }

  async fn store_comment(&self, comment: &Comment) -> Result<()> {
    if let Some(author) = &comment.comment_author {
      self.collect_author(author).await?;
    }
    self.store.insert_comment(comment).await.map_err(store_err)?;
    Ok(())
  }
}
