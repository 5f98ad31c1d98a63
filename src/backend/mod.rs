//! Identity and profile backends the access core talks to.

pub mod http;
pub mod jwt;

pub use http::{HttpIdentitySource, HttpProfileSource};
pub use jwt::JwtIdentitySource;

use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use crate::access::{
    AccessError, IdentitySource, ProfileSource, SessionSources, UnavailableProfileSource,
};
use crate::config::{AppConfig, IdentityMode};
use crate::types::Identity;

/// Session sources wired from [`AppConfig`]
pub struct BackendSources {
    client: Client,
    mode: IdentityMode,
    identity_url: Option<url::Url>,
    profile_url: Option<url::Url>,
    jwt_secret: String,
}

impl BackendSources {
    pub fn from_config(config: &AppConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.api.backend_timeout_secs))
            .build()?;

        if config.identity.mode == IdentityMode::Remote && config.identity.url.is_none() {
            tracing::warn!("IDENTITY_MODE=remote without IDENTITY_URL; every identity lookup will fail");
        }
        if config.profile.url.is_none() {
            tracing::warn!("PROFILE_URL not set; every user gets the default role");
        }

        Ok(Self {
            client,
            mode: config.identity.mode,
            identity_url: config.identity.url.clone(),
            profile_url: config.profile.url.clone(),
            jwt_secret: config.security.jwt_secret.clone(),
        })
    }
}

impl SessionSources for BackendSources {
    fn identity_for(&self, token: &str) -> Arc<dyn IdentitySource> {
        match (self.mode, &self.identity_url) {
            (IdentityMode::Jwt, _) => Arc::new(JwtIdentitySource::new(token, self.jwt_secret.clone())),
            (IdentityMode::Remote, Some(url)) => {
                Arc::new(HttpIdentitySource::new(self.client.clone(), url.clone(), token))
            }
            (IdentityMode::Remote, None) => Arc::new(MisconfiguredIdentity),
        }
    }

    fn profiles_for(&self, token: &str) -> Arc<dyn ProfileSource> {
        match &self.profile_url {
            Some(url) => Arc::new(HttpProfileSource::new(self.client.clone(), url.clone(), token)),
            None => Arc::new(UnavailableProfileSource),
        }
    }
}

/// Remote identity mode with no backend url; fails so visitors land on the login view
struct MisconfiguredIdentity;

#[async_trait::async_trait]
impl IdentitySource for MisconfiguredIdentity {
    async fn current_identity(&self) -> Result<Option<Identity>, AccessError> {
        Err(AccessError::transport("identity backend url not configured"))
    }
}

