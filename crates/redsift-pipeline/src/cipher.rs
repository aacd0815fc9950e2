//! At-rest encryption of analysis text.
//!
//! ChaCha20-Poly1305 with a fresh 96-bit nonce per message. The stored form
//! is `base64(nonce || ciphertext)`, which fits the JSON document as a plain
//! string.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chacha20poly1305::{
  ChaCha20Poly1305, Nonce,
  aead::{Aead, AeadCore, KeyInit, OsRng},
};
use thiserror::Error;

const NONCE_LEN: usize = 12;

#[derive(Debug, Error)]
pub enum CipherError {
  #[error("encryption key is not valid base64: {0}")]
  KeyEncoding(#[source] base64::DecodeError),

  #[error("encryption key must be 32 bytes, got {0}")]
  KeyLength(usize),

  #[error("ciphertext is not valid base64: {0}")]
  CiphertextEncoding(#[source] base64::DecodeError),

  #[error("ciphertext is too short")]
  Truncated,

  /// Wrong key, or the ciphertext was altered.
  #[error("decryption failed")]
  Decrypt,

  #[error("encryption failed")]
  Encrypt,

  #[error("decrypted text is not UTF-8")]
  NotUtf8,
}

/// Symmetric cipher for analysis text.
#[derive(Clone)]
pub struct AnalysisCipher {
  inner: ChaCha20Poly1305,
}

impl std::fmt::Debug for AnalysisCipher {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str("AnalysisCipher(..)")
  }
}

impl AnalysisCipher {
  /// Build a cipher from a base64-encoded 32-byte key.
  pub fn from_base64_key(key: &str) -> Result<Self, CipherError> {
    let bytes = STANDARD
      .decode(key.trim())
      .map_err(CipherError::KeyEncoding)?;
    let inner = ChaCha20Poly1305::new_from_slice(&bytes)
      .map_err(|_| CipherError::KeyLength(bytes.len()))?;
    Ok(Self { inner })
  }

  /// A fresh random key, base64-encoded for the config file.
  pub fn generate_key() -> String {
    STANDARD.encode(ChaCha20Poly1305::generate_key(&mut OsRng))
  }

  pub fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
    let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
    let ciphertext = self
      .inner
      .encrypt(&nonce, plaintext.as_bytes())
      .map_err(|_| CipherError::Encrypt)?;

    let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    Ok(STANDARD.encode(out))
  }

  pub fn decrypt(&self, stored: &str) -> Result<String, CipherError> {
    let bytes = STANDARD
      .decode(stored)
      .map_err(CipherError::CiphertextEncoding)?;
    if bytes.len() < NONCE_LEN {
      return Err(CipherError::Truncated);
    }
    let (nonce, ciphertext) = bytes.split_at(NONCE_LEN);
    let plaintext = self
      .inner
      .decrypt(Nonce::from_slice(nonce), ciphertext)
      .map_err(|_| CipherError::Decrypt)?;
    String::from_utf8(plaintext).map_err(|_| CipherError::NotUtf8)
  }
}
