//! Encoding and decoding helpers between domain types and the plain values
//! stored in SQLite columns.
//!
//! Analysis timestamps are RFC 3339 strings; analysis documents are compact
//! JSON. Remote-item timestamps stay as unix seconds, as Reddit reports them.

use chrono::{DateTime, Utc};
use redsift_core::{
  item::{Comment, Edited, Post},
  record::{AnalysisDocument, AnalysisRecord, ErrorKind, ErrorRecord},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row mappers ─────────────────────────────────────────────────────────────

/// Column list shared by every `post` SELECT; order matches [`post_from_row`].
pub const POST_COLUMNS: &str = "post_id, subreddit, post_author, post_title, \
  post_body, post_created_utc, is_post_oc, is_post_video, post_upvote_count, \
  post_downvote_count, subreddit_members";

pub fn post_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Post> {
  Ok(Post {
    post_id:             row.get(0)?,
    subreddit:           row.get(1)?,
    post_author:         row.get(2)?,
    post_title:          row.get(3)?,
    post_body:           row.get(4)?,
    post_created_utc:    row.get(5)?,
    is_post_oc:          row.get(6)?,
    is_post_video:       row.get(7)?,
    post_upvote_count:   row.get(8)?,
    post_downvote_count: row.get(9)?,
    subreddit_members:   row.get(10)?,
  })
}

// ─── Raw row types ───────────────────────────────────────────────────────────

/// Raw values read directly from a `comment` row.
pub struct RawComment {
  pub comment_id:           String,
  pub comment_author:       Option<String>,
  pub is_comment_submitter: Option<bool>,
  pub is_comment_edited:    String,
  pub comment_created_utc:  i64,
  pub comment_body:         String,
  pub post_id:              String,
  pub subreddit:            String,
}

impl RawComment {
  pub const COLUMNS: &'static str = "comment_id, comment_author, \
    is_comment_submitter, is_comment_edited, comment_created_utc, \
    comment_body, post_id, subreddit";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      comment_id:           row.get(0)?,
      comment_author:       row.get(1)?,
      is_comment_submitter: row.get(2)?,
      is_comment_edited:    row.get(3)?,
      comment_created_utc:  row.get(4)?,
      comment_body:         row.get(5)?,
      post_id:              row.get(6)?,
      subreddit:            row.get(7)?,
    })
  }

  pub fn into_comment(self) -> Result<Comment> {
    let edited = Edited::from_column(&self.is_comment_edited).ok_or(
      Error::Decode {
        column: "is_comment_edited",
        value:  self.is_comment_edited.clone(),
      },
    )?;

    Ok(Comment {
      comment_id:           self.comment_id,
      comment_author:       self.comment_author,
      is_comment_submitter: self.is_comment_submitter,
      is_comment_edited:    edited,
      comment_created_utc:  self.comment_created_utc,
      comment_body:         self.comment_body,
      post_id:              self.post_id,
      subreddit:            self.subreddit,
    })
  }
}

/// Raw strings read directly from an `analysis_documents` row.
pub struct RawAnalysis {
  pub timestamp:         String,
  pub shasum_512:        String,
  pub analysis_document: String,
}

impl RawAnalysis {
  pub fn into_record(self) -> Result<AnalysisRecord> {
    let document: AnalysisDocument =
      serde_json::from_str(&self.analysis_document)?;
    Ok(AnalysisRecord {
      timestamp:         decode_dt(&self.timestamp)?,
      shasum_512:        self.shasum_512,
      analysis_document: document,
    })
  }
}

/// Raw strings read directly from an `errors` row.
pub struct RawError {
  pub item_id:   String,
  pub item_type: String,
  pub error:     String,
}

impl RawError {
  pub fn into_record(self) -> Result<ErrorRecord> {
    let kind = ErrorKind::from_tag(&self.item_type).ok_or(Error::Decode {
      column: "item_type",
      value:  self.item_type.clone(),
    })?;
    Ok(ErrorRecord { item_id: self.item_id, item_type: kind, error: self.error })
  }
}
