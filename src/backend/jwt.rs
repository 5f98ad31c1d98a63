use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::access::{AccessError, IdentitySource};
use crate::auth::{token_expiry, validate_jwt, JwtError};
use crate::types::Identity;

/// Identity taken from a locally verified HS256 bearer token
pub struct JwtIdentitySource {
    token: String,
    secret: String,
}

impl JwtIdentitySource {
    pub fn new(token: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            secret: secret.into(),
        }
    }
}

#[async_trait]
impl IdentitySource for JwtIdentitySource {
    async fn current_identity(&self) -> Result<Option<Identity>, AccessError> {
        match validate_jwt(&self.token, &self.secret) {
            Ok(claims) => Ok(Some(claims.identity())),
            // a bad or expired token means "not logged in"
            Err(JwtError::InvalidToken(reason)) => {
                tracing::debug!("Bearer token rejected: {}", reason);
                Ok(None)
            }
            Err(e) => Err(AccessError::transport(e.to_string())),
        }
    }

    fn expires_at(&self) -> Option<DateTime<Utc>> {
        token_expiry(&self.token, &self.secret)
    }
}
