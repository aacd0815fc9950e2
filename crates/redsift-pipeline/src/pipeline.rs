//! [`Pipeline`]: the context every trigger runs against.

use std::time::Duration;

use redsift_core::{inference::InferenceBackend, remote::RedditClient, store::HarvestStore};

use crate::{cipher::AnalysisCipher, lang::LanguageDetector, pacer::Pacer};

// ─── Settings ────────────────────────────────────────────────────────────────

/// Tunables for collection and analysis.
#[derive(Debug, Clone)]
pub struct Settings {
  /// Models queried in order for every analysed item.
  pub models:          Vec<String>,
  /// ISO 639-3 code; text in any other language is not analysed.
  pub target_language: String,
  /// Pause after this many remote fetches. `0` disables pacing.
  pub pace_every:      u32,
  pub pace_pause:      Duration,
  /// Candidate ids checked against the store per query.
  pub dedup_chunk:     usize,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      models:          Vec::new(),
      target_language: "eng".into(),
      pace_every:      25,
      pace_pause:      Duration::from_secs(60),
      dedup_chunk:     100,
    }
  }
}

// ─── Pipeline ────────────────────────────────────────────────────────────────

/// Collaborators and settings shared by every collection and analysis run.
///
/// Built once at startup and shared behind an `Arc`; nothing in it is
/// mutated after construction.
pub struct Pipeline<S, R, B, D> {
  pub(crate) store:    S,
  pub(crate) reddit:   R,
  pub(crate) backend:  B,
  pub(crate) detector: D,
  pub(crate) cipher:   Option<AnalysisCipher>,
  pub(crate) settings: Settings,
}

impl<S, R, B, D> Pipeline<S, R, B, D>
where
  S: HarvestStore,
  R: RedditClient,
  B: InferenceBackend,
  D: LanguageDetector,
{
  pub fn new(store: S, reddit: R, backend: B, detector: D, settings: Settings) -> Self {
    Self { store, reddit, backend, detector, cipher: None, settings }
  }

  /// Encrypt analysis text at rest with `cipher`.
  pub fn with_cipher(mut self, cipher: AnalysisCipher) -> Self {
    self.cipher = Some(cipher);
    self
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn settings(&self) -> &Settings { &self.settings }

  pub(crate) fn pacer(&self) -> Pacer {
    Pacer::new(self.settings.pace_every, self.settings.pace_pause)
  }
}
