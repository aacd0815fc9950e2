//! Shared-secret login and bearer-token extractor.
//!
//! `POST /login` trades the API key for a short-lived HS256 token; every
//! trigger route then requires `Authorization: Bearer <token>`.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::ApiError, jobs::JobRunner};

/// Tokens are valid for two days.
pub const TOKEN_LIFETIME_SECS: i64 = 2 * 24 * 3600;

const ISSUER: &str = "redsift";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
  pub sub: String,
  pub iss: String,
  pub iat: i64,
  pub exp: i64,
  pub jti: String,
}

/// Everything needed to check a login and issue or verify a token.
#[derive(Clone)]
pub struct AuthConfig {
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub api_key_hash: String,
  /// Subject placed in issued tokens.
  pub identity:     String,
  encoding:         EncodingKey,
  decoding:         DecodingKey,
}

impl AuthConfig {
  pub fn new(api_key_hash: String, identity: String, jwt_secret: &str) -> Self {
    Self {
      api_key_hash,
      identity,
      encoding: EncodingKey::from_secret(jwt_secret.as_bytes()),
      decoding: DecodingKey::from_secret(jwt_secret.as_bytes()),
    }
  }

  /// Check `api_key` against the stored argon2 hash.
  pub fn verify_api_key(&self, api_key: &str) -> Result<(), ApiError> {
    let parsed = PasswordHash::new(&self.api_key_hash).map_err(|_| ApiError::Unauthorized)?;
    Argon2::default()
      .verify_password(api_key.as_bytes(), &parsed)
      .map_err(|_| ApiError::Unauthorized)
  }

  pub fn issue_token(&self) -> Result<String, ApiError> {
    let now = Utc::now();
    let claims = Claims {
      sub: self.identity.clone(),
      iss: ISSUER.to_owned(),
      iat: now.timestamp(),
      exp: (now + Duration::seconds(TOKEN_LIFETIME_SECS)).timestamp(),
      jti: Uuid::new_v4().to_string(),
    };
    encode(&Header::default(), &claims, &self.encoding)
      .map_err(|e| ApiError::Internal(format!("failed to sign token: {e}")))
  }

  pub fn verify_token(&self, token: &str) -> Result<Claims, ApiError> {
    let mut validation = Validation::default();
    validation.set_issuer(&[ISSUER]);
    decode::<Claims>(token, &self.decoding, &validation)
      .map(|data| data.claims)
      .map_err(|_| ApiError::Unauthorized)
  }
}

/// Verify the bearer token in `headers`.
pub fn verify_bearer(headers: &HeaderMap, config: &AuthConfig) -> Result<Claims, ApiError> {
  let token = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .ok_or(ApiError::Unauthorized)?;
  config.verify_token(token.trim())
}

/// Present in a handler's arguments means the request carried a valid token.
pub struct Authenticated;

impl<P: JobRunner> FromRequestParts<AppState<P>> for Authenticated {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<P>,
  ) -> Result<Self, Self::Rejection> {
    verify_bearer(&parts.headers, &state.auth)?;
    Ok(Authenticated)
  }
}
