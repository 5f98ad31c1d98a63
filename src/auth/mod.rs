use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config;
use crate::types::Identity;

/// Clock skew tolerated when checking `exp`
pub const TOKEN_LEEWAY_SECS: u64 = 60;

/// Bearer token claims identifying a dashboard user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(identity: &Identity, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: identity.id.clone(),
            email: identity.email.clone(),
            exp,
            iat: now.timestamp(),
        }
    }

    /// Claims for `identity` using the configured token lifetime
    pub fn for_identity(identity: &Identity) -> Self {
        Self::new(identity, config::config().security.jwt_expiry_hours)
    }

    pub fn identity(&self) -> Identity {
        Identity::new(self.sub.clone(), self.email.clone())
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),
    #[error("Invalid JWT secret")]
    InvalidSecret,
}

pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let mut validation = Validation::default();
    validation.leeway = TOKEN_LEEWAY_SECS;

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| JwtError::InvalidToken(e.to_string()))
}

/// Expiry of a correctly signed token, whether or not it has passed
pub fn token_expiry(token: &str, secret: &str) -> Option<DateTime<Utc>> {
    if secret.is_empty() {
        return None;
    }

    let mut validation = Validation::default();
    validation.validate_exp = false;

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    decode::<Claims>(token, &decoding_key, &validation)
        .ok()
        .and_then(|data| data.claims.expires_at())
}
