use anyhow::{anyhow, Context};
use reqwest::{redirect, Client, Method, RequestBuilder};
use serde_json::Value;
use std::time::Duration;

use crate::cli::config::CliConfig;

/// Thin client for the gateway's JSON envelope
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn from_config(config: &CliConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            // page redirects are the answer, not something to follow
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            base_url: config.server_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub async fn get(&self, path: &str) -> anyhow::Result<Value> {
        self.send(self.request(Method::GET, path)).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> anyhow::Result<Value> {
        self.send(self.request(Method::PUT, path).json(body)).await
    }

    pub async fn delete(&self, path: &str) -> anyhow::Result<Value> {
        self.send(self.request(Method::DELETE, path)).await
    }

    /// Returns the envelope's `data` or the server's error message
    async fn send(&self, builder: RequestBuilder) -> anyhow::Result<Value> {
        let response = builder
            .send()
            .await
            .with_context(|| format!("could not reach {}", self.base_url))?;

        let status = response.status();
        let body: Value = response.json().await.context("server returned a non-JSON body")?;

        if body["success"] == Value::Bool(true) {
            return Ok(body["data"].clone());
        }

        let message = body["message"].as_str().unwrap_or("request failed");
        Err(anyhow!("{} ({})", message, status))
    }

    pub async fn health(&self) -> bool {
        match self.request(Method::GET, "/health").send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}
