//! [`SqliteStore`]: the SQLite implementation of [`HarvestStore`].

use std::{collections::HashSet, path::Path};

use rusqlite::OptionalExtension as _;

use redsift_core::{
  item::{Author, Comment, Post},
  record::{AnalysisRecord, Category, ErrorRecord, Subscription},
  store::{HarvestStore, IdColumn},
};

use crate::{
  Result,
  encode::{POST_COLUMNS, RawAnalysis, RawComment, RawError, encode_dt, post_from_row},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A harvest store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a single-column `SELECT` and collect the strings.
  async fn select_strings(&self, sql: String) -> Result<Vec<String>> {
    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }
}

/// Ids of stored items of `category` with no analysis document yet.
fn unanalyzed_sql(table: &str, id_column: &str, category: Category) -> String {
  format!(
    "SELECT t.{id_column} FROM {table} t
     WHERE NOT EXISTS (
       SELECT 1 FROM analysis_documents a
       WHERE json_extract(a.analysis_document, '$.category') = '{category}'
         AND json_extract(a.analysis_document, '$.reference_id') = t.{id_column}
     )
     ORDER BY t.rowid",
    category = category.as_str(),
  )
}

// ─── HarvestStore impl ───────────────────────────────────────────────────────

impl HarvestStore for SqliteStore {
  type Error = crate::Error;

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn insert_post(&self, post: &Post) -> Result<bool> {
    let post = post.clone();

    let inserted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "INSERT INTO post (
             post_id, subreddit, post_author, post_title, post_body,
             post_created_utc, is_post_oc, is_post_video,
             post_upvote_count, post_downvote_count, subreddit_members
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
           ON CONFLICT (post_id) DO NOTHING",
          rusqlite::params![
            post.post_id,
            post.subreddit,
            post.post_author,
            post.post_title,
            post.post_body,
            post.post_created_utc,
            post.is_post_oc,
            post.is_post_video,
            post.post_upvote_count,
            post.post_downvote_count,
            post.subreddit_members,
          ],
        )?;
        Ok(n > 0)
      })
      .await?;

    Ok(inserted)
  }

  async fn insert_comment(&self, comment: &Comment) -> Result<bool> {
    let comment = comment.clone();
    let edited = comment.is_comment_edited.to_column();

    let inserted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "INSERT INTO comment (
             comment_id, comment_author, is_comment_submitter,
             is_comment_edited, comment_created_utc, comment_body,
             post_id, subreddit
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
           ON CONFLICT (comment_id) DO NOTHING",
          rusqlite::params![
            comment.comment_id,
            comment.comment_author,
            comment.is_comment_submitter,
            edited,
            comment.comment_created_utc,
            comment.comment_body,
            comment.post_id,
            comment.subreddit,
          ],
        )?;
        Ok(n > 0)
      })
      .await?;

    Ok(inserted)
  }

  async fn insert_author(&self, author: &Author) -> Result<bool> {
    let author = author.clone();

    let inserted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "INSERT INTO author (author_id, author_name, author_created_utc)
           VALUES (?1, ?2, ?3)
           ON CONFLICT (author_name) DO NOTHING",
          rusqlite::params![
            author.author_id,
            author.author_name,
            author.author_created_utc,
          ],
        )?;
        Ok(n > 0)
      })
      .await?;

    Ok(inserted)
  }

  async fn insert_subscription(&self, subscription: &Subscription) -> Result<bool> {
    let sub = subscription.clone();

    let inserted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "INSERT INTO subscription (subreddit, datetimesubscribed)
           VALUES (?1, ?2)
           ON CONFLICT (subreddit) DO NOTHING",
          rusqlite::params![sub.subreddit, sub.datetimesubscribed],
        )?;
        Ok(n > 0)
      })
      .await?;

    Ok(inserted)
  }

  async fn insert_error(&self, record: &ErrorRecord) -> Result<()> {
    let item_id   = record.item_id.clone();
    let item_type = record.item_type.as_str();
    let error     = record.error.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO errors (item_id, item_type, error) VALUES (?1, ?2, ?3)",
          rusqlite::params![item_id, item_type, error],
        )?;
        Ok(())
      })
      .await?;

    Ok(())
  }

  async fn insert_analysis(&self, record: &AnalysisRecord) -> Result<bool> {
    let timestamp = encode_dt(record.timestamp);
    let shasum    = record.shasum_512.clone();
    let document  = serde_json::to_string(&record.analysis_document)?;

    let inserted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "INSERT INTO analysis_documents (timestamp, shasum_512, analysis_document)
           VALUES (?1, ?2, ?3)
           ON CONFLICT DO NOTHING",
          rusqlite::params![timestamp, shasum, document],
        )?;
        Ok(n > 0)
      })
      .await?;

    Ok(inserted)
  }

  // ── Dedup primitive ───────────────────────────────────────────────────────

  async fn existing_ids(
    &self,
    column:     IdColumn,
    candidates: &[String],
  ) -> Result<HashSet<String>> {
    if candidates.is_empty() {
      return Ok(HashSet::new());
    }

    let ids = candidates.to_vec();
    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!(
      "SELECT {col} FROM {table} WHERE {col} IN ({placeholders})",
      col = column.column(),
      table = column.table(),
    );

    let found = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(ids.iter()), |row| row.get(0))?
          .collect::<rusqlite::Result<HashSet<String>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(found)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get_post(&self, post_id: &str) -> Result<Option<Post>> {
    let id = post_id.to_owned();

    let post = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {POST_COLUMNS} FROM post WHERE post_id = ?1"),
            rusqlite::params![id],
            post_from_row,
          )
          .optional()?)
      })
      .await?;

    Ok(post)
  }

  async fn get_comment(&self, comment_id: &str) -> Result<Option<Comment>> {
    let id = comment_id.to_owned();

    let raw: Option<RawComment> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {} FROM comment WHERE comment_id = ?1",
              RawComment::COLUMNS
            ),
            rusqlite::params![id],
            RawComment::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawComment::into_comment).transpose()
  }

  async fn author_names(&self) -> Result<Vec<String>> {
    self
      .select_strings("SELECT author_name FROM author ORDER BY rowid".to_owned())
      .await
  }

  async fn unanalyzed_post_ids(&self) -> Result<Vec<String>> {
    self
      .select_strings(unanalyzed_sql("post", "post_id", Category::Post))
      .await
  }

  async fn unanalyzed_comment_ids(&self) -> Result<Vec<String>> {
    self
      .select_strings(unanalyzed_sql("comment", "comment_id", Category::Comment))
      .await
  }

  async fn unsubscribed_subreddits(&self) -> Result<Vec<String>> {
    self
      .select_strings(
        "SELECT DISTINCT subreddit FROM post
         WHERE subreddit NOT IN (SELECT subreddit FROM subscription)
         ORDER BY subreddit"
          .to_owned(),
      )
      .await
  }

  async fn list_analyses(
    &self,
    category:     Category,
    reference_id: &str,
  ) -> Result<Vec<AnalysisRecord>> {
    let category = category.as_str();
    let reference_id = reference_id.to_owned();

    let raws: Vec<RawAnalysis> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT timestamp, shasum_512, analysis_document
           FROM analysis_documents
           WHERE json_extract(analysis_document, '$.category') = ?1
             AND json_extract(analysis_document, '$.reference_id') = ?2
           ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![category, reference_id], |row| {
            Ok(RawAnalysis {
              timestamp:         row.get(0)?,
              shasum_512:        row.get(1)?,
              analysis_document: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAnalysis::into_record).collect()
  }

  async fn list_errors(&self) -> Result<Vec<ErrorRecord>> {
    let raws: Vec<RawError> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT item_id, item_type, error FROM errors ORDER BY rowid")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawError {
              item_id:   row.get(0)?,
              item_type: row.get(1)?,
              error:     row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawError::into_record).collect()
  }
}
