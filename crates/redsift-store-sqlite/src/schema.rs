//! SQL schema for the redsift SQLite store.
//!
//! Column names are the persisted contract shared with existing corpora; do
//! not rename them.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Remote items are written once and never updated.
CREATE TABLE IF NOT EXISTS post (
    post_id             TEXT PRIMARY KEY,
    subreddit           TEXT NOT NULL,
    post_author         TEXT,
    post_title          TEXT NOT NULL,
    post_body           TEXT NOT NULL,
    post_created_utc    INTEGER NOT NULL,
    is_post_oc          INTEGER NOT NULL,
    is_post_video       INTEGER NOT NULL,
    post_upvote_count   INTEGER NOT NULL,
    post_downvote_count INTEGER NOT NULL,
    subreddit_members   INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS comment (
    comment_id           TEXT PRIMARY KEY,
    comment_author       TEXT,
    is_comment_submitter INTEGER,
    is_comment_edited    TEXT NOT NULL,   -- 'false' or unix seconds
    comment_created_utc  INTEGER NOT NULL,
    comment_body         TEXT NOT NULL,
    post_id              TEXT NOT NULL,
    subreddit            TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS author (
    author_id          TEXT NOT NULL,
    author_name        TEXT PRIMARY KEY,
    author_created_utc INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS subscription (
    subreddit          TEXT PRIMARY KEY,
    datetimesubscribed TEXT NOT NULL
);

-- Append-only triage ledger; never deduplicated.
CREATE TABLE IF NOT EXISTS errors (
    item_id   TEXT NOT NULL,
    item_type TEXT NOT NULL,  -- AUTHOR | COMMENT | SUBREDDIT | REDDITOR DELETED | GET SUB POSTS
    error     TEXT NOT NULL
);

-- The hash is over the plaintext analysis, so duplicates are detected even
-- when the stored document is encrypted.
CREATE TABLE IF NOT EXISTS analysis_documents (
    timestamp         TEXT NOT NULL,
    shasum_512        TEXT NOT NULL,
    analysis_document TEXT NOT NULL   -- JSON AnalysisDocument
);

-- One row per (answer, item, model): identical text from another model or
-- for another item is a separate record.
CREATE UNIQUE INDEX IF NOT EXISTS analysis_identity_idx ON analysis_documents(
    shasum_512,
    json_extract(analysis_document, '$.category'),
    json_extract(analysis_document, '$.reference_id'),
    json_extract(analysis_document, '$.llm')
);

CREATE INDEX IF NOT EXISTS post_subreddit_idx ON post(subreddit);
CREATE INDEX IF NOT EXISTS comment_post_idx   ON comment(post_id);
CREATE INDEX IF NOT EXISTS analysis_ref_idx
    ON analysis_documents(json_extract(analysis_document, '$.reference_id'));

PRAGMA user_version = 1;
";
