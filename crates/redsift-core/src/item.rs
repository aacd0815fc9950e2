//! Remote items: the flat records harvested from Reddit.
//!
//! Items are written once and never updated. If the content changes upstream
//! after capture, the stored copy stays as it was when collected.

use serde::{Deserialize, Serialize};

/// The platform's automated-moderation account. Never stored as an author and
/// never analyzed.
pub const SENTINEL_ACCOUNT: &str = "AutoModerator";

/// Body values Reddit substitutes once content is removed or deleted.
pub const TOMBSTONES: [&str; 2] = ["[removed]", "[deleted]"];

/// Prefix of user-profile pseudo-subreddits (`u_<name>`), which cannot be
/// subscribed to.
pub const USER_SUBREDDIT_PREFIX: &str = "u_";

pub fn is_tombstone(body: &str) -> bool { TOMBSTONES.contains(&body) }

pub fn is_sentinel(author: Option<&str>) -> bool {
  author == Some(SENTINEL_ACCOUNT)
}

// ─── Post ────────────────────────────────────────────────────────────────────

/// A submission. Field names match the `post` table columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
  pub post_id:             String,
  pub subreddit:           String,
  /// `None` when the account has since been deleted.
  pub post_author:         Option<String>,
  pub post_title:          String,
  pub post_body:           String,
  /// Unix seconds.
  pub post_created_utc:    i64,
  pub is_post_oc:          bool,
  pub is_post_video:       bool,
  pub post_upvote_count:   i64,
  pub post_downvote_count: i64,
  pub subreddit_members:   i64,
}

impl Post {
  /// The text handed to the analysis backends: title immediately followed by
  /// body.
  pub fn analysis_text(&self) -> String {
    format!("{}{}", self.post_title, self.post_body)
  }
}

// ─── Comment ─────────────────────────────────────────────────────────────────

/// Whether (and when) a comment was edited.
///
/// Reddit reports `false` for unedited comments and the edit time otherwise;
/// the stored column keeps that shape as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Edited {
  #[default]
  Never,
  /// Unix seconds of the last edit.
  At(i64),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEdited {
  Flag(bool),
  Timestamp(f64),
}

impl Serialize for Edited {
  fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
    match self {
      Self::Never => s.serialize_bool(false),
      Self::At(ts) => s.serialize_i64(*ts),
    }
  }
}

impl<'de> Deserialize<'de> for Edited {
  fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
    // Reddit sends the edit time as a float.
    Ok(match RawEdited::deserialize(d)? {
      RawEdited::Flag(_) => Self::Never,
      RawEdited::Timestamp(ts) => Self::At(ts as i64),
    })
  }
}

impl Edited {
  /// Column encoding: `"false"` or the unix timestamp as a decimal string.
  pub fn to_column(self) -> String {
    match self {
      Self::Never => "false".to_owned(),
      Self::At(ts) => ts.to_string(),
    }
  }

  pub fn from_column(s: &str) -> Option<Self> {
    match s {
      "false" | "0" => Some(Self::Never),
      other => other.parse().ok().map(Self::At),
    }
  }
}

/// A comment. Field names match the `comment` table columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
  pub comment_id:           String,
  pub comment_author:       Option<String>,
  /// Not every listing reports this; `None` when absent.
  pub is_comment_submitter: Option<bool>,
  pub is_comment_edited:    Edited,
  pub comment_created_utc:  i64,
  pub comment_body:         String,
  /// The submission this comment belongs to.
  pub post_id:              String,
  pub subreddit:            String,
}

impl Comment {
  pub fn is_tombstone(&self) -> bool { is_tombstone(&self.comment_body) }
}

// ─── Author ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
  pub author_id:          String,
  pub author_name:        String,
  pub author_created_utc: i64,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tombstones_are_exact_matches() {
    assert!(is_tombstone("[removed]"));
    assert!(is_tombstone("[deleted]"));
    assert!(!is_tombstone("[removed] but not really"));
    assert!(!is_tombstone(""));
  }

  #[test]
  fn sentinel_only_matches_the_system_account() {
    assert!(is_sentinel(Some("AutoModerator")));
    assert!(!is_sentinel(Some("automoderator")));
    assert!(!is_sentinel(None));
  }

  #[test]
  fn edited_column_encoding() {
    assert_eq!(Edited::Never.to_column(), "false");
    assert_eq!(Edited::At(1_700_000_000).to_column(), "1700000000");
    assert_eq!(Edited::from_column("false"), Some(Edited::Never));
    assert_eq!(Edited::from_column("1700000000"), Some(Edited::At(1_700_000_000)));
    assert_eq!(Edited::from_column("yesterday"), None);
  }

  #[test]
  fn edited_json_matches_reddit_shape() {
    let never: Edited = serde_json::from_str("false").unwrap();
    assert_eq!(never, Edited::Never);
    let at: Edited = serde_json::from_str("1700000000.0").unwrap();
    assert_eq!(at, Edited::At(1_700_000_000));
    assert_eq!(serde_json::to_string(&Edited::Never).unwrap(), "false");
  }
}
