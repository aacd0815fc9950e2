//! Ollama chat client for the redsift harvester.
//!
//! Implements [`redsift_core::inference::InferenceBackend`] against the
//! `/api/chat` endpoint of an Ollama server, always non-streaming.

mod client;

pub mod error;

pub use client::OllamaClient;
pub use error::Error;
