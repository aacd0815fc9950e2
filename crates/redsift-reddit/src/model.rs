//! Reddit JSON shapes and their normalisation into flat records.
//!
//! Only the fields the harvester stores are modelled. Anything Reddit omits
//! that the record requires surfaces as [`FetchError::MalformedResponse`].

use redsift_core::{
  FetchError,
  item::{Author, Comment, Edited, Post},
};
use serde::Deserialize;
use serde_json::Value;

/// Author value Reddit reports once an account is gone.
const DELETED_AUTHOR: &str = "[deleted]";

// ─── Listing envelope ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct Listing<T> {
  pub data: ListingData<T>,
}

#[derive(Debug, Deserialize)]
pub struct ListingData<T> {
  pub after:    Option<String>,
  pub children: Vec<Thing<T>>,
}

#[derive(Debug, Deserialize)]
pub struct Thing<T> {
  pub kind: String,
  pub data: T,
}

/// Just enough of a listing child to page through ids.
#[derive(Debug, Deserialize)]
pub struct IdOnly {
  pub id: String,
}

// ─── Submissions ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RawPost {
  id:                    String,
  subreddit:             String,
  author:                Option<String>,
  title:                 String,
  #[serde(default)]
  selftext:              String,
  created_utc:           f64,
  #[serde(default)]
  is_original_content:   bool,
  #[serde(default)]
  is_video:              bool,
  #[serde(default)]
  ups:                   i64,
  #[serde(default)]
  downs:                 i64,
  #[serde(default)]
  subreddit_subscribers: i64,
}

impl From<RawPost> for Post {
  fn from(raw: RawPost) -> Self {
    Post {
      post_id:             raw.id,
      subreddit:           raw.subreddit,
      post_author:         live_author(raw.author),
      post_title:          raw.title,
      post_body:           raw.selftext,
      post_created_utc:    raw.created_utc as i64,
      is_post_oc:          raw.is_original_content,
      is_post_video:       raw.is_video,
      post_upvote_count:   raw.ups,
      post_downvote_count: raw.downs,
      subreddit_members:   raw.subreddit_subscribers,
    }
  }
}

// ─── Comments ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RawComment {
  id:           String,
  author:       Option<String>,
  is_submitter: Option<bool>,
  #[serde(default)]
  edited:       Edited,
  created_utc:  f64,
  body:         String,
  /// Fullname of the submission, `t3_<id>`.
  link_id:      String,
  subreddit:    String,
}

impl From<RawComment> for Comment {
  fn from(raw: RawComment) -> Self {
    let post_id = raw
      .link_id
      .strip_prefix("t3_")
      .map(str::to_owned)
      .unwrap_or(raw.link_id);

    Comment {
      comment_id:           raw.id,
      comment_author:       live_author(raw.author),
      is_comment_submitter: raw.is_submitter,
      is_comment_edited:    raw.edited,
      comment_created_utc:  raw.created_utc as i64,
      comment_body:         raw.body,
      post_id,
      subreddit:            raw.subreddit,
    }
  }
}

/// Walk a `/comments/<id>` comment listing depth-first, collecting every
/// `t1` thing and its replies. `more` stubs are skipped.
pub fn flatten_comment_tree(listing: &Value, out: &mut Vec<Comment>) -> Result<(), FetchError> {
  let children = listing
    .pointer("/data/children")
    .and_then(Value::as_array)
    .ok_or_else(|| malformed("comment listing without children"))?;

  for child in children {
    if child.get("kind").and_then(Value::as_str) != Some("t1") {
      continue;
    }
    let data = child
      .get("data")
      .ok_or_else(|| malformed("comment without data"))?;
    let raw: RawComment = serde_json::from_value(data.clone())
      .map_err(|e| malformed(&format!("comment: {e}")))?;
    out.push(raw.into());

    // `replies` is an empty string when there are none.
    if let Some(replies) = data.get("replies").filter(|r| r.is_object()) {
      flatten_comment_tree(replies, out)?;
    }
  }
  Ok(())
}

// ─── Redditors ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RawRedditor {
  // Suspended accounts come back with only `name` and `is_suspended`.
  id:          Option<String>,
  name:        String,
  created_utc: Option<f64>,
}

impl TryFrom<RawRedditor> for Author {
  type Error = FetchError;

  fn try_from(raw: RawRedditor) -> Result<Self, Self::Error> {
    match (raw.id, raw.created_utc) {
      (Some(id), Some(created)) => Ok(Author {
        author_id:          id,
        author_name:        raw.name,
        author_created_utc: created as i64,
      }),
      _ => Err(malformed(&format!("redditor {} has no id", raw.name))),
    }
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn live_author(author: Option<String>) -> Option<String> {
  author.filter(|a| a != DELETED_AUTHOR)
}

pub fn malformed(msg: &str) -> FetchError { FetchError::MalformedResponse(msg.to_owned()) }

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn deleted_author_becomes_none() {
    let raw: RawPost = serde_json::from_value(json!({
      "id": "abc", "subreddit": "rust", "author": "[deleted]",
      "title": "t", "selftext": "", "created_utc": 1700000000.0
    }))
    .unwrap();
    let post = Post::from(raw);
    assert_eq!(post.post_author, None);
    assert_eq!(post.post_created_utc, 1_700_000_000);
  }

  #[test]
  fn comment_post_id_strips_fullname_prefix() {
    let raw: RawComment = serde_json::from_value(json!({
      "id": "c1", "author": "bob", "is_submitter": true, "edited": false,
      "created_utc": 1700000000.0, "body": "hi", "link_id": "t3_abc",
      "subreddit": "rust"
    }))
    .unwrap();
    let comment = Comment::from(raw);
    assert_eq!(comment.post_id, "abc");
    assert_eq!(comment.is_comment_edited, Edited::Never);
  }

  #[test]
  fn nested_replies_are_flattened_and_more_skipped() {
    let c = |id: &str, replies: Value| {
      json!({ "kind": "t1", "data": {
        "id": id, "author": "bob", "edited": 1700000100.0,
        "created_utc": 1700000000.0, "body": "x", "link_id": "t3_p",
        "subreddit": "rust", "replies": replies
      }})
    };
    let listing = json!({ "data": { "children": [
      c("a", json!({ "data": { "children": [ c("b", json!("")) ] } })),
      { "kind": "more", "data": { "children": ["z"] } },
      c("c", json!("")),
    ]}});

    let mut out = Vec::new();
    flatten_comment_tree(&listing, &mut out).unwrap();
    let ids: Vec<_> = out.iter().map(|c| c.comment_id.as_str()).collect();
    assert_eq!(ids, ["a", "b", "c"]);
    assert_eq!(out[0].is_comment_edited, Edited::At(1_700_000_100));
  }

  #[test]
  fn suspended_redditor_is_malformed() {
    let raw: RawRedditor =
      serde_json::from_value(json!({ "name": "gone", "is_suspended": true })).unwrap();
    assert!(matches!(Author::try_from(raw), Err(FetchError::MalformedResponse(_))));
  }
}
