//! Error type for `redsift-reddit` construction.
//!
//! Per-request failures are reported as [`redsift_core::FetchError`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to build HTTP client: {0}")]
  ClientBuild(#[from] reqwest::Error),
}
