use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::domain::user::Role;

pub const ACCESS_TTL_HOURS: i64 = 24;

/// Ephemeral identity assertion carried by a verified token. The embedded
/// role reflects the role AT ISSUANCE; privileged operations re-check the
/// store's current role instead of trusting it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
    #[error("token error: {0}")]
    Sign(String),
}

/// Stateless HS256 signer/verifier. No revocation list is kept; a leaked
/// token stays valid until natural expiry.
#[derive(Clone)]
pub struct JwtManager {
    secret: String,
    ttl: Duration,
}

impl JwtManager {
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
        Self::new(secret, Duration::hours(ACCESS_TTL_HOURS))
    }

    pub fn issue(&self, user_id: Uuid, username: &str, role: Role) -> Result<String, TokenError> {
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            role,
            iat: now.unix_timestamp(),
            exp: (now + self.ttl).unix_timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| TokenError::Sign(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        })?;
        Ok(data.claims)
    }
}
