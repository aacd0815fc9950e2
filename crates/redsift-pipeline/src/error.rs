//! Error types for `redsift-pipeline`.

use redsift_core::{FetchError, InferenceError};
use thiserror::Error;

use crate::cipher::CipherError;

#[derive(Debug, Error)]
pub enum Error {
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error(transparent)]
  Fetch(#[from] FetchError),

  #[error(transparent)]
  FanOut(#[from] PartialFanOut),

  #[error(transparent)]
  Cipher(#[from] CipherError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) fn store_err<E>(e: E) -> Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  Error::Store(Box::new(e))
}

/// A fan-out that stopped at a failing model.
///
/// Records for the models in `succeeded` are already stored; models after
/// `failed_at` were never called.
#[derive(Debug, Error)]
#[error("analysis of {reference_id} stopped at model {failed_at}: {error}")]
pub struct PartialFanOut {
  pub reference_id: String,
  pub succeeded:    Vec<String>,
  pub failed_at:    String,
  #[source]
  pub error:        InferenceError,
}

impl PartialFanOut {
  /// The backend could not be reached at all, as opposed to rejecting the
  /// request.
  pub fn backend_unreachable(&self) -> bool { self.error.is_unreachable() }
}
