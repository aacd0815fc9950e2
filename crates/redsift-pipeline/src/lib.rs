//! The incremental collection and analysis pipeline.
//!
//! [`Pipeline`] wires a [`HarvestStore`], a [`RedditClient`], an
//! [`InferenceBackend`] and a [`LanguageDetector`] together and exposes one
//! async method per trigger. Collection walks subreddits, posts, comments and
//! authors, fetching only what the store does not already hold; analysis fans
//! stored text out to every configured model.
//!
//! [`HarvestStore`]: redsift_core::store::HarvestStore
//! [`RedditClient`]: redsift_core::remote::RedditClient
//! [`InferenceBackend`]: redsift_core::inference::InferenceBackend

// Native `async fn` in traits; the `Send` bounds are spelled out where needed.
#![allow(async_fn_in_trait)]

mod analyze;
mod collect;
mod pipeline;

pub mod cipher;
pub mod dedup;
pub mod digest;
pub mod error;
pub mod lang;
pub mod ledger;
pub mod pacer;
pub mod text;

pub use analyze::{AnalysisOutcome, BulkReport, SkipReason};
pub use cipher::AnalysisCipher;
pub use error::{Error, PartialFanOut, Result};
pub use lang::{LanguageDetector, WhatlangDetector};
pub use pipeline::{Pipeline, Settings};
