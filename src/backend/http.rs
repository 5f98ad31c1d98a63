use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use url::Url;

use crate::access::{AccessError, IdentitySource, ProfileSource};
use crate::types::{Identity, Profile};

/// `GET current-identity` against the authentication backend
pub struct HttpIdentitySource {
    client: Client,
    url: Url,
    token: String,
}

impl HttpIdentitySource {
    pub fn new(client: Client, url: Url, token: impl Into<String>) -> Self {
        Self {
            client,
            url,
            token: token.into(),
        }
    }
}

#[async_trait]
impl IdentitySource for HttpIdentitySource {
    async fn current_identity(&self) -> Result<Option<Identity>, AccessError> {
        let response = self
            .client
            .get(self.url.clone())
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| AccessError::transport(format!("identity backend unreachable: {}", e)))?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            status if status.is_success() => response
                .json::<Option<Identity>>()
                .await
                .map_err(|e| AccessError::transport(format!("invalid identity payload: {}", e))),
            status => Err(AccessError::transport(format!("identity backend returned {}", status))),
        }
    }
}

/// `GET profile-for(identity)` against the business backend
pub struct HttpProfileSource {
    client: Client,
    url: Url,
    token: String,
}

impl HttpProfileSource {
    pub fn new(client: Client, url: Url, token: impl Into<String>) -> Self {
        Self {
            client,
            url,
            token: token.into(),
        }
    }
}

#[async_trait]
impl ProfileSource for HttpProfileSource {
    async fn profile_for(&self, identity: &Identity) -> Result<Profile, AccessError> {
        let response = self
            .client
            .get(self.url.clone())
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| AccessError::transport(format!("profile backend unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AccessError::transport(format!(
                "profile backend returned {} for '{}'",
                status, identity.id
            )));
        }

        response
            .json::<Profile>()
            .await
            .map_err(|e| AccessError::transport(format!("invalid profile payload: {}", e)))
    }
}
