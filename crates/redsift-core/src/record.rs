//! Derived records: analyses, error ledger entries and subscriptions.
//!
//! The literal tag values below are part of the persisted contract; rows
//! written by earlier versions of the harvester use exactly these strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current analysis document layout. The key was introduced in v2.
pub const SCHEMA_VERSION: &str = "3";

/// Platform tag for everything this harvester produces.
pub const SOURCE_REDDIT: &str = "reddit";

// ─── Analysis ────────────────────────────────────────────────────────────────

/// What kind of item an analysis refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
  Post,
  Comment,
}

impl Category {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Post => "post",
      Self::Comment => "comment",
    }
  }
}

/// The JSON document stored in `analysis_documents.analysis_document`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisDocument {
  pub schema_version: String,
  pub source:         String,
  pub category:       Category,
  pub reference_id:   String,
  /// Model identifier of the backend that produced the analysis.
  pub llm:            String,
  /// Sanitized backend output, or its ciphertext when encryption is on.
  pub analysis:       String,
}

/// One stored analysis: the document plus its content hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRecord {
  pub timestamp:         DateTime<Utc>,
  /// Hex SHA-512 of the plaintext analysis, computed before any encryption.
  /// Doubles as the dedup key.
  pub shasum_512:        String,
  pub analysis_document: AnalysisDocument,
}

// ─── Error ledger ────────────────────────────────────────────────────────────

/// The `item_type` tag of an [`ErrorRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
  #[serde(rename = "AUTHOR")]
  Author,
  #[serde(rename = "COMMENT")]
  Comment,
  #[serde(rename = "SUBREDDIT")]
  Subreddit,
  #[serde(rename = "REDDITOR DELETED")]
  RedditorDeleted,
  #[serde(rename = "GET SUB POSTS")]
  GetSubPosts,
}

impl ErrorKind {
  /// The tag stored in the `item_type` column.
  /// Must match the serde renames above.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Author => "AUTHOR",
      Self::Comment => "COMMENT",
      Self::Subreddit => "SUBREDDIT",
      Self::RedditorDeleted => "REDDITOR DELETED",
      Self::GetSubPosts => "GET SUB POSTS",
    }
  }

  pub fn from_tag(tag: &str) -> Option<Self> {
    match tag {
      "AUTHOR" => Some(Self::Author),
      "COMMENT" => Some(Self::Comment),
      "SUBREDDIT" => Some(Self::Subreddit),
      "REDDITOR DELETED" => Some(Self::RedditorDeleted),
      "GET SUB POSTS" => Some(Self::GetSubPosts),
      _ => None,
    }
  }
}

/// Item id used when a forbidden listing leaves no comment id to report.
pub const COMMENT_ID_NOT_AVAILABLE: &str = "COMMENT_ID_NOT_AVAILABLE";

/// An expected failure kept for offline triage. Never deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
  pub item_id:   String,
  pub item_type: ErrorKind,
  pub error:     String,
}

// ─── Subscriptions ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
  pub subreddit:          String,
  /// Unix seconds, stored as text.
  pub datetimesubscribed: String,
}
