use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use url::Url;

use crate::access::{QueryPolicy, ResolverPolicies};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub identity: IdentityConfig,
    pub profile: ProfileConfig,
    pub security: SecurityConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

/// How bearer tokens are turned into identities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityMode {
    /// Verify the token locally with the shared JWT secret
    Jwt,
    /// Ask the identity backend at `identity.url`
    Remote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub mode: IdentityMode,
    pub url: Option<Url>,
    pub stale_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    pub url: Option<Url>,
    pub retry: u32,
    pub stale_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    /// Sessions unused for this long are dropped
    pub session_idle_secs: u64,
    pub session_prune_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_request_logging: bool,
    pub backend_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Some(port) = env::var("FA_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }

        // Identity overrides
        if let Ok(v) = env::var("IDENTITY_MODE") {
            match v.to_ascii_lowercase().as_str() {
                "jwt" => self.identity.mode = IdentityMode::Jwt,
                "remote" => self.identity.mode = IdentityMode::Remote,
                other => tracing::warn!("Ignoring unknown IDENTITY_MODE '{}'", other),
            }
        }
        if let Ok(v) = env::var("IDENTITY_URL") {
            self.identity.url = parse_url("IDENTITY_URL", &v);
        }
        if let Ok(v) = env::var("IDENTITY_STALE_SECS") {
            self.identity.stale_secs = v.parse().unwrap_or(self.identity.stale_secs);
        }

        // Profile overrides
        if let Ok(v) = env::var("PROFILE_URL") {
            self.profile.url = parse_url("PROFILE_URL", &v);
        }
        if let Ok(v) = env::var("PROFILE_RETRY") {
            self.profile.retry = v.parse().unwrap_or(self.profile.retry);
        }
        if let Ok(v) = env::var("PROFILE_STALE_SECS") {
            self.profile.stale_secs = v.parse().unwrap_or(self.profile.stale_secs);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET").or_else(|_| env::var("SECURITY_JWT_SECRET")) {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("SECURITY_SESSION_IDLE_SECS") {
            self.security.session_idle_secs = v.parse().unwrap_or(self.security.session_idle_secs);
        }
        if let Ok(v) = env::var("SECURITY_SESSION_PRUNE_SECS") {
            self.security.session_prune_secs = v.parse().unwrap_or(self.security.session_prune_secs);
        }

        // API overrides
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_BACKEND_TIMEOUT_SECS") {
            self.api.backend_timeout_secs = v.parse().unwrap_or(self.api.backend_timeout_secs);
        }

        self
    }

    /// Cache and retry policies for the resolvers
    pub fn policies(&self) -> ResolverPolicies {
        ResolverPolicies {
            // identity lookups are never retried
            session: QueryPolicy {
                stale_time: Duration::from_secs(self.identity.stale_secs),
                ..QueryPolicy::session()
            },
            profile: QueryPolicy {
                stale_time: Duration::from_secs(self.profile.stale_secs),
                retry: self.profile.retry,
            },
        }
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 3000 },
            identity: IdentityConfig {
                mode: IdentityMode::Jwt,
                url: None,
                stale_secs: 5 * 60,
            },
            profile: ProfileConfig {
                url: None,
                retry: 1,
                stale_secs: 5 * 60,
            },
            security: SecurityConfig {
                jwt_secret: "development-secret".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                session_idle_secs: 30 * 60,
                session_prune_secs: 60,
            },
            api: ApiConfig {
                enable_request_logging: true,
                backend_timeout_secs: 10,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig { port: 3000 },
            identity: IdentityConfig {
                mode: IdentityMode::Remote,
                url: None,
                stale_secs: 5 * 60,
            },
            profile: ProfileConfig {
                url: None,
                retry: 1,
                stale_secs: 5 * 60,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                session_idle_secs: 30 * 60,
                session_prune_secs: 60,
            },
            api: ApiConfig {
                enable_request_logging: true,
                backend_timeout_secs: 5,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig { port: 8080 },
            identity: IdentityConfig {
                mode: IdentityMode::Remote,
                url: None,
                stale_secs: 60,
            },
            profile: ProfileConfig {
                url: None,
                retry: 1,
                stale_secs: 5 * 60,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
                session_idle_secs: 30 * 60,
                session_prune_secs: 60,
            },
            api: ApiConfig {
                enable_request_logging: false,
                backend_timeout_secs: 5,
            },
        }
    }
}

fn parse_url(var: &str, value: &str) -> Option<Url> {
    if value.trim().is_empty() {
        return None;
    }
    match Url::parse(value.trim()) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::warn!("Ignoring invalid {} '{}': {}", var, value, e);
            None
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.identity.mode, IdentityMode::Jwt);
        assert!(!config.security.jwt_secret.is_empty());
        assert!(config.profile.url.is_none());
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert_eq!(config.identity.mode, IdentityMode::Remote);
        assert!(config.security.jwt_secret.is_empty());
        assert!(!config.api.enable_request_logging);
    }

    #[test]
    fn test_session_policy_never_retries() {
        for config in [AppConfig::development(), AppConfig::staging(), AppConfig::production()] {
            let policies = config.policies();
            assert_eq!(policies.session.retry, 0);
            assert_eq!(policies.profile.retry, 1);
        }
    }

    #[test]
    fn test_parse_url_rejects_garbage() {
        assert!(parse_url("PROFILE_URL", "not a url").is_none());
        assert!(parse_url("PROFILE_URL", "  ").is_none());
        assert_eq!(
            parse_url("PROFILE_URL", "http://backend:8000/api/profile/").map(|u| u.to_string()),
            Some("http://backend:8000/api/profile/".to_string())
        );
    }
}
