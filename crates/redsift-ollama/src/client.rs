//! [`OllamaClient`]: the HTTP implementation of [`InferenceBackend`].

use std::time::Duration;

use redsift_core::{
  InferenceError,
  inference::{InferenceBackend, Sampling},
};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::Error;

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
  model:    &'a str,
  messages: [ChatMessage<'a>; 1],
  stream:   bool,
  options:  ChatOptions,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
  role:    &'static str,
  content: &'a str,
}

#[derive(Serialize)]
struct ChatOptions {
  temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
  message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
  content: String,
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// A client for a single Ollama server.
///
/// Models are chosen per call, so one client serves every model in the
/// fan-out.
#[derive(Clone, Debug)]
pub struct OllamaClient {
  client:   Client,
  chat_url: String,
}

impl OllamaClient {
  /// `base_url` is the server root, e.g. `http://localhost:11434`.
  ///
  /// Generation on a local model can take minutes; `timeout` bounds a single
  /// call end to end.
  pub fn new(base_url: &str, timeout: Duration) -> Result<Self, Error> {
    let client = Client::builder().timeout(timeout).build()?;
    let chat_url = format!("{}/api/chat", base_url.trim_end_matches('/'));
    Ok(Self { client, chat_url })
  }
}

impl InferenceBackend for OllamaClient {
  async fn chat(
    &self,
    model: &str,
    message: &str,
    sampling: Sampling,
  ) -> Result<String, InferenceError> {
    let body = ChatRequest {
      model,
      messages: [ChatMessage { role: "user", content: message }],
      stream: false,
      options: ChatOptions { temperature: sampling.temperature },
    };

    tracing::debug!(%model, "sending chat request");
    let response = self
      .client
      .post(&self.chat_url)
      .json(&body)
      .send()
      .await
      .map_err(|e| InferenceError::Unreachable(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
      let text = response.text().await.unwrap_or_default();
      return Err(InferenceError::Api(format!("{} from {model}: {text}", status.as_u16())));
    }

    let reply: ChatResponse = response
      .json()
      .await
      .map_err(|e| InferenceError::MalformedResponse(e.to_string()))?;

    Ok(reply.message.content)
  }
}
