//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{TimeZone, Utc};
use redsift_core::{
  item::{Author, Comment, Edited, Post},
  record::{
    AnalysisDocument, AnalysisRecord, Category, ErrorKind, ErrorRecord,
    SCHEMA_VERSION, SOURCE_REDDIT, Subscription,
  },
  store::{HarvestStore, IdColumn},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn post(id: &str, subreddit: &str) -> Post {
  Post {
    post_id:             id.into(),
    subreddit:           subreddit.into(),
    post_author:         Some("alice".into()),
    post_title:          "A title".into(),
    post_body:           "A body".into(),
    post_created_utc:    1_700_000_000,
    is_post_oc:          false,
    is_post_video:       false,
    post_upvote_count:   12,
    post_downvote_count: 0,
    subreddit_members:   4_000,
  }
}

fn comment(id: &str, post_id: &str) -> Comment {
  Comment {
    comment_id:           id.into(),
    comment_author:       Some("bob".into()),
    is_comment_submitter: Some(false),
    is_comment_edited:    Edited::At(1_700_000_100),
    comment_created_utc:  1_700_000_050,
    comment_body:         "Nice post".into(),
    post_id:              post_id.into(),
    subreddit:            "rust".into(),
  }
}

fn analysis(category: Category, reference_id: &str, llm: &str, hash: &str) -> AnalysisRecord {
  AnalysisRecord {
    timestamp:         Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
    shasum_512:        hash.into(),
    analysis_document: AnalysisDocument {
      schema_version: SCHEMA_VERSION.into(),
      source:         SOURCE_REDDIT.into(),
      category,
      reference_id:   reference_id.into(),
      llm:            llm.into(),
      analysis:       format!("analysis by {llm}"),
    },
  }
}

// ─── Remote items ────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_get_post() {
  let s = store().await;
  let p = post("abc123", "rust");

  assert!(s.insert_post(&p).await.unwrap());
  let fetched = s.get_post("abc123").await.unwrap();
  assert_eq!(fetched, Some(p));
}

#[tokio::test]
async fn get_post_missing_returns_none() {
  let s = store().await;
  assert!(s.get_post("nope").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_post_is_ignored_and_original_kept() {
  let s = store().await;
  let original = post("abc123", "rust");
  let mut changed = original.clone();
  changed.post_title = "Edited upstream".into();

  assert!(s.insert_post(&original).await.unwrap());
  assert!(!s.insert_post(&changed).await.unwrap());

  let fetched = s.get_post("abc123").await.unwrap().unwrap();
  assert_eq!(fetched.post_title, "A title");
}

#[tokio::test]
async fn comment_roundtrip_keeps_edit_timestamp() {
  let s = store().await;
  let c = comment("c1", "abc123");

  assert!(s.insert_comment(&c).await.unwrap());
  assert!(!s.insert_comment(&c).await.unwrap());

  let fetched = s.get_comment("c1").await.unwrap().unwrap();
  assert_eq!(fetched.is_comment_edited, Edited::At(1_700_000_100));
  assert_eq!(fetched, c);
}

#[tokio::test]
async fn unedited_comment_without_submitter_flag() {
  let s = store().await;
  let mut c = comment("c2", "abc123");
  c.is_comment_edited = Edited::Never;
  c.is_comment_submitter = None;
  c.comment_author = None;

  s.insert_comment(&c).await.unwrap();
  let fetched = s.get_comment("c2").await.unwrap().unwrap();
  assert_eq!(fetched.is_comment_edited, Edited::Never);
  assert_eq!(fetched.is_comment_submitter, None);
  assert_eq!(fetched.comment_author, None);
}

#[tokio::test]
async fn authors_keyed_on_name() {
  let s = store().await;
  let a = Author {
    author_id:          "t2_1".into(),
    author_name:        "alice".into(),
    author_created_utc: 1_600_000_000,
  };
  let b = Author { author_name: "bob".into(), author_id: "t2_2".into(), ..a.clone() };

  assert!(s.insert_author(&a).await.unwrap());
  assert!(!s.insert_author(&a).await.unwrap());
  assert!(s.insert_author(&b).await.unwrap());

  assert_eq!(s.author_names().await.unwrap(), vec!["alice", "bob"]);
}

// ─── Dedup primitive ─────────────────────────────────────────────────────────

#[tokio::test]
async fn existing_ids_returns_only_stored_candidates() {
  let s = store().await;
  s.insert_post(&post("p1", "rust")).await.unwrap();
  s.insert_post(&post("p3", "rust")).await.unwrap();

  let candidates: Vec<String> = ["p1", "p2", "p3", "p4"].map(String::from).into();
  let found = s.existing_ids(IdColumn::PostId, &candidates).await.unwrap();

  assert_eq!(found.len(), 2);
  assert!(found.contains("p1"));
  assert!(found.contains("p3"));
}

#[tokio::test]
async fn existing_ids_empty_candidates() {
  let s = store().await;
  let found = s.existing_ids(IdColumn::CommentId, &[]).await.unwrap();
  assert!(found.is_empty());
}

#[tokio::test]
async fn existing_ids_checks_the_requested_column_only() {
  let s = store().await;
  s.insert_post(&post("shared", "rust")).await.unwrap();

  let candidates = vec!["shared".to_string()];
  let as_comment = s.existing_ids(IdColumn::CommentId, &candidates).await.unwrap();
  assert!(as_comment.is_empty());
}

// ─── Analyses ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn repeated_analysis_is_deduplicated() {
  let s = store().await;
  let first = analysis(Category::Post, "p1", "llama3", "aa");

  assert!(s.insert_analysis(&first).await.unwrap());
  assert!(!s.insert_analysis(&first).await.unwrap());

  let stored = s.list_analyses(Category::Post, "p1").await.unwrap();
  assert_eq!(stored, vec![first]);
}

#[tokio::test]
async fn same_hash_for_other_model_or_item_is_kept() {
  let s = store().await;
  let first = analysis(Category::Post, "p1", "llama3", "aa");
  let other_model = analysis(Category::Post, "p1", "mistral", "aa");
  let other_item = analysis(Category::Post, "p2", "llama3", "aa");
  let other_category = analysis(Category::Comment, "p1", "llama3", "aa");

  for record in [&first, &other_model, &other_item, &other_category] {
    assert!(s.insert_analysis(record).await.unwrap());
  }

  assert_eq!(
    s.list_analyses(Category::Post, "p1").await.unwrap(),
    vec![first, other_model]
  );
  assert_eq!(s.list_analyses(Category::Post, "p2").await.unwrap(), vec![other_item]);
  assert_eq!(
    s.list_analyses(Category::Comment, "p1").await.unwrap(),
    vec![other_category]
  );
}

#[tokio::test]
async fn unanalyzed_ids_skip_items_with_documents() {
  let s = store().await;
  s.insert_post(&post("p1", "rust")).await.unwrap();
  s.insert_post(&post("p2", "rust")).await.unwrap();
  s.insert_comment(&comment("c1", "p1")).await.unwrap();
  s.insert_comment(&comment("p2", "p1")).await.unwrap();

  s.insert_analysis(&analysis(Category::Post, "p1", "llama3", "h1"))
    .await
    .unwrap();
  // A comment analysis must not mark the post with the same id as analyzed.
  s.insert_analysis(&analysis(Category::Comment, "p2", "llama3", "h2"))
    .await
    .unwrap();

  assert_eq!(s.unanalyzed_post_ids().await.unwrap(), vec!["p2"]);
  assert_eq!(s.unanalyzed_comment_ids().await.unwrap(), vec!["c1"]);
}

// ─── Subscriptions ───────────────────────────────────────────────────────────

#[tokio::test]
async fn unsubscribed_subreddits_are_distinct_and_exclude_joined() {
  let s = store().await;
  s.insert_post(&post("p1", "golang")).await.unwrap();
  s.insert_post(&post("p2", "rust")).await.unwrap();
  s.insert_post(&post("p3", "rust")).await.unwrap();
  s.insert_post(&post("p4", "u_deleted1")).await.unwrap();
  s.insert_subscription(&Subscription {
    subreddit:          "golang".into(),
    datetimesubscribed: "1700000000".into(),
  })
  .await
  .unwrap();

  let subs = s.unsubscribed_subreddits().await.unwrap();
  assert_eq!(subs, vec!["rust", "u_deleted1"]);
}

// ─── Error ledger ────────────────────────────────────────────────────────────

#[tokio::test]
async fn error_ledger_is_append_only_and_keeps_duplicates() {
  let s = store().await;
  let record = ErrorRecord {
    item_id:   "spez".into(),
    item_type: ErrorKind::RedditorDeleted,
    error:     "received 404 HTTP response".into(),
  };

  s.insert_error(&record).await.unwrap();
  s.insert_error(&record).await.unwrap();

  let ledger = s.list_errors().await.unwrap();
  assert_eq!(ledger, vec![record.clone(), record]);
}
