//! The `InferenceBackend` trait: the boundary to the language-model server.

use std::future::Future;

use crate::InferenceError;

/// Sampling options sent with every prompt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
  pub temperature: f32,
}

impl Sampling {
  /// Temperature 0, so a repeated prompt yields the same analysis hash.
  pub const DETERMINISTIC: Self = Self { temperature: 0.0 };
}

/// A chat-completion server hosting one or more models.
pub trait InferenceBackend: Send + Sync {
  /// Send a single-turn user `message` to `model` and return the reply text.
  /// Never streams.
  fn chat<'a>(
    &'a self,
    model: &'a str,
    message: &'a str,
    sampling: Sampling,
  ) -> impl Future<Output = Result<String, InferenceError>> + Send + 'a;
}
