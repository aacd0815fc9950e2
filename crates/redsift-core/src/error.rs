//! Error types shared across the collaborator boundaries.

use thiserror::Error;

/// Failure of a single remote-content fetch.
///
/// The orchestrator matches on the variant to decide whether a failure is
/// recorded and skipped or propagated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("remote unreachable: {0}")]
  Unreachable(String),

  #[error("malformed response: {0}")]
  MalformedResponse(String),
}

impl FetchError {
  /// Not-found, forbidden and malformed responses are expected while
  /// crawling: they are recorded in the error ledger and the traversal moves
  /// on. An unreachable remote is not.
  pub fn is_expected(&self) -> bool { !matches!(self, Self::Unreachable(_)) }

  /// The human-readable message without the kind prefix; this is what lands
  /// in the `error` column of the ledger.
  pub fn message(&self) -> &str {
    match self {
      Self::NotFound(m)
      | Self::Forbidden(m)
      | Self::Unreachable(m)
      | Self::MalformedResponse(m) => m,
    }
  }
}

/// Failure of a single inference-backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InferenceError {
  /// Connection refused, reset, or timed out.
  #[error("inference backend unreachable: {0}")]
  Unreachable(String),

  /// The backend answered with a non-success status.
  #[error("inference backend error: {0}")]
  Api(String),

  #[error("malformed inference response: {0}")]
  MalformedResponse(String),
}

impl InferenceError {
  pub fn is_unreachable(&self) -> bool { matches!(self, Self::Unreachable(_)) }
}
