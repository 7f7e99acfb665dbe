//! Token issuance/validation, password hashing, and the auth middleware.
//!
//! Tokens are HS256 JWTs whose only claim is `exp`. A valid token proves the
//! holder logged in with some account; it does not identify which one.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::AppState;
use crate::error::ApiError;

/// Header carrying the token on authenticated requests.
pub const TOKEN_HEADER: &str = "x-access-token";

/// How long an issued token stays valid.
pub const TOKEN_LIFETIME_DAYS: i64 = 30;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("missing auth token")]
    Missing,

    #[error("auth token expired")]
    Expired,

    #[error("invalid auth token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    #[error("could not sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

/// Signing and verification keys derived from the configured secret.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenKeys {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issue a token that expires [`TOKEN_LIFETIME_DAYS`] from now.
    pub fn issue(&self) -> Result<String, AuthError> {
        let exp = Utc::now() + Duration::days(TOKEN_LIFETIME_DAYS);
        self.issue_expiring_at(exp.timestamp())
    }

    /// Issue a token with an explicit expiry timestamp.
    pub fn issue_expiring_at(&self, exp: i64) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), &Claims { exp }, &self.encoding)
            .map_err(AuthError::Signing)
    }

    /// Check signature and expiry. Claims are not returned; nothing
    /// downstream uses them.
    pub fn validate(&self, token: &str) -> Result<(), AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::Missing);
        }

        match decode::<Claims>(token, &self.decoding, &self.validation) {
            Ok(_) => Ok(()),
            Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => Err(AuthError::Expired),
            Err(e) => Err(AuthError::Invalid(e)),
        }
    }
}

pub fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    Ok(bcrypt::hash(password, cost)?)
}

/// Compare a candidate password against a stored bcrypt hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    Ok(bcrypt::verify(password, hash)?)
}

/// Read the token header, if any, as trimmed text.
pub fn token_from_request(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Middleware for routes that need a valid token. The request is forwarded
/// unchanged.
pub async fn auth_required(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = token_from_request(&request).ok_or(ApiError::Unauthenticated)?;
    state.tokens.validate(token)?;

    debug!(path = %request.uri().path(), "token accepted");
    Ok(next.run(request).await)
}

/// Middleware for routes that only exist while debugging.
pub async fn debug_required(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !state.config.debug {
        return Err(ApiError::DebugOnly);
    }
    Ok(next.run(request).await)
}
