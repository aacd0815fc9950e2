//! Server configuration, deserialised from `config.toml` and the environment.

use std::{path::PathBuf, time::Duration};

use anyhow::{Context as _, bail};
use redsift_pipeline::{AnalysisCipher, Settings};
use redsift_reddit::RedditConfig;
use serde::Deserialize;

// ─── Top level ───────────────────────────────────────────────────────────────

#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:         String,
  #[serde(default = "default_port")]
  pub port:         u16,
  pub store_path:   PathBuf,
  pub jwt_secret:   String,
  /// Subject written into issued tokens.
  #[serde(default = "default_identity")]
  pub jwt_identity: String,
  /// argon2 PHC string of the API key accepted by `POST /login`.
  pub api_key_hash: String,
  pub reddit:       RedditSection,
  #[serde(default)]
  pub ollama:       OllamaSection,
  #[serde(default)]
  pub pipeline:     PipelineSection,
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8000 }
fn default_identity() -> String { "redsift".into() }

// ─── Reddit ──────────────────────────────────────────────────────────────────

#[derive(Deserialize, Clone)]
pub struct RedditSection {
  pub client_id:     String,
  pub client_secret: String,
  pub username:      String,
  pub password:      String,
  pub user_agent:    String,
  #[serde(default = "default_api_base")]
  pub api_base:      String,
  #[serde(default = "default_token_url")]
  pub token_url:     String,
}

fn default_api_base() -> String { "https://oauth.reddit.com".into() }
fn default_token_url() -> String { "https://www.reddit.com/api/v1/access_token".into() }

impl From<RedditSection> for RedditConfig {
  fn from(s: RedditSection) -> Self {
    Self {
      client_id:     s.client_id,
      client_secret: s.client_secret,
      username:      s.username,
      password:      s.password,
      user_agent:    s.user_agent,
      api_base:      s.api_base,
      token_url:     s.token_url,
    }
  }
}

// ─── Ollama ──────────────────────────────────────────────────────────────────

#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct OllamaSection {
  pub url:          String,
  /// Queried in this order for every item.
  pub models:       Vec<String>,
  pub timeout_secs: u64,
}

impl Default for OllamaSection {
  fn default() -> Self {
    Self {
      url:          "http://localhost:11434".into(),
      models:       Vec::new(),
      timeout_secs: 300,
    }
  }
}

impl OllamaSection {
  pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs) }
}

// ─── Pipeline ────────────────────────────────────────────────────────────────

#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct PipelineSection {
  pub target_language:  String,
  pub pace_every:       u32,
  pub pace_pause_secs:  u64,
  pub dedup_chunk:      usize,
  pub encrypt_analysis: bool,
  /// Base64 of a 32-byte key; see `server gen-key`.
  pub encryption_key:   Option<String>,
}

impl Default for PipelineSection {
  fn default() -> Self {
    let defaults = Settings::default();
    Self {
      target_language:  defaults.target_language,
      pace_every:       defaults.pace_every,
      pace_pause_secs:  defaults.pace_pause.as_secs(),
      dedup_chunk:      defaults.dedup_chunk,
      encrypt_analysis: false,
      encryption_key:   None,
    }
  }
}

impl PipelineSection {
  pub fn settings(&self, models: Vec<String>) -> Settings {
    Settings {
      models,
      target_language: self.target_language.clone(),
      pace_every: self.pace_every,
      pace_pause: Duration::from_secs(self.pace_pause_secs),
      dedup_chunk: self.dedup_chunk.max(1),
    }
  }

  /// The at-rest cipher, when encryption is switched on.
  pub fn cipher(&self) -> anyhow::Result<Option<AnalysisCipher>> {
    if !self.encrypt_analysis {
      return Ok(None);
    }
    let Some(key) = &self.encryption_key else {
      bail!("encrypt_analysis is set but no encryption_key is configured");
    };
    let cipher = AnalysisCipher::from_base64_key(key).context("invalid encryption_key")?;
    Ok(Some(cipher))
  }
}
