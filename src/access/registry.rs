use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, Instant, MissedTickBehavior};

use crate::access::controller::{AccessController, ResolverPolicies};
use crate::access::profile::{ProfileSource, UnavailableProfileSource};
use crate::access::session::{AnonymousIdentity, IdentitySource};
use crate::auth::TOKEN_LEEWAY_SECS;

/// Builds the backends a session token talks to
pub trait SessionSources: Send + Sync {
    fn identity_for(&self, token: &str) -> Arc<dyn IdentitySource>;
    fn profiles_for(&self, token: &str) -> Arc<dyn ProfileSource>;
}

/// SHA-256 of a bearer token; raw tokens are never kept as map keys
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey(String);

impl SessionKey {
    pub fn from_token(token: &str) -> Self {
        SessionKey(format!("{:x}", Sha256::digest(token.as_bytes())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn short(&self) -> &str {
        &self.0[..12]
    }
}

struct SessionEntry {
    controller: Arc<AccessController>,
    expires_at: Option<DateTime<Utc>>,
    last_seen: Mutex<Instant>,
}

impl SessionEntry {
    fn touch(&self) -> Arc<AccessController> {
        *self.last_seen.lock() = Instant::now();
        self.controller.clone()
    }

    fn is_live(&self, now: Instant, wall: DateTime<Utc>, idle_timeout: Duration) -> bool {
        now.saturating_duration_since(*self.last_seen.lock()) < idle_timeout
            && self.expires_at.map_or(true, |at| at > wall)
            && self.controller.snapshot().session.identity().is_some()
    }
}

/// One [`AccessController`] per logged-in bearer token.
///
/// Tokens that resolve to no identity get a throwaway controller and are never
/// stored. Stored sessions are evicted by [`SessionRegistry::prune`] once idle
/// or expired; revoked digests are forgotten once the token could no longer
/// verify anyway.
pub struct SessionRegistry {
    sources: Arc<dyn SessionSources>,
    policies: ResolverPolicies,
    idle_timeout: Duration,
    sessions: RwLock<HashMap<SessionKey, SessionEntry>>,
    revoked: RwLock<HashMap<SessionKey, DateTime<Utc>>>,
    anonymous: Arc<AccessController>,
}

impl SessionRegistry {
    pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

    /// How long a revoked token is refused when its expiry is unknown
    pub const REVOKED_RETENTION: Duration = Duration::from_secs(24 * 60 * 60);

    pub fn new(sources: Arc<dyn SessionSources>, policies: ResolverPolicies) -> Self {
        let anonymous = Arc::new(AccessController::new(
            Arc::new(AnonymousIdentity),
            Arc::new(UnavailableProfileSource),
            policies,
        ));
        Self {
            sources,
            policies,
            idle_timeout: Self::DEFAULT_IDLE_TIMEOUT,
            sessions: RwLock::new(HashMap::new()),
            revoked: RwLock::new(HashMap::new()),
            anonymous,
        }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Controller for the request's token, refreshed and ready to answer
    pub async fn resolve(&self, token: Option<&str>) -> Arc<AccessController> {
        let Some(token) = token else {
            return self.refreshed_anonymous().await;
        };

        let key = SessionKey::from_token(token);
        if self.is_revoked(&key) {
            tracing::debug!("Token {} was logged out, serving anonymous session", key.short());
            return self.refreshed_anonymous().await;
        }

        let existing = self.sessions.read().get(&key).map(SessionEntry::touch);
        if let Some(controller) = existing {
            let snapshot = controller.refresh().await;
            if snapshot.session.identity().is_none() {
                tracing::debug!("Session {} no longer has an identity, dropping it", key.short());
                self.sessions.write().remove(&key);
            }
            return controller;
        }

        let identity = self.sources.identity_for(token);
        let expires_at = identity.expires_at();
        let controller = Arc::new(AccessController::new(
            identity,
            self.sources.profiles_for(token),
            self.policies,
        ));

        let snapshot = controller.refresh().await;
        if snapshot.session.identity().is_none() {
            return controller;
        }

        let mut sessions = self.sessions.write();
        // a logout may have landed while the identity was being fetched
        if self.is_revoked(&key) {
            controller.logout();
            return self.anonymous.clone();
        }
        tracing::debug!("Registering access session {}", key.short());
        sessions
            .entry(key)
            .or_insert_with(|| SessionEntry {
                controller,
                expires_at,
                last_seen: Mutex::new(Instant::now()),
            })
            .controller
            .clone()
    }

    async fn refreshed_anonymous(&self) -> Arc<AccessController> {
        self.anonymous.refresh().await;
        self.anonymous.clone()
    }

    fn is_revoked(&self, key: &SessionKey) -> bool {
        self.revoked
            .read()
            .get(key)
            .is_some_and(|forget_after| *forget_after > Utc::now())
    }

    /// Log the session out and refuse the token until it could no longer verify
    pub fn revoke(&self, token: &str) -> bool {
        let key = SessionKey::from_token(token);
        let expires_at = self.sources.identity_for(token).expires_at();
        let registered = self.sessions.read().contains_key(&key);
        if expires_at.is_none() && !registered {
            // nothing verifiable to refuse
            return false;
        }

        let forget_after = match expires_at {
            Some(exp) => exp + chrono::Duration::seconds(TOKEN_LEEWAY_SECS as i64),
            None => Utc::now() + chrono::Duration::seconds(Self::REVOKED_RETENTION.as_secs() as i64),
        };
        self.revoked.write().insert(key.clone(), forget_after);

        let removed = self.sessions.write().remove(&key);
        if let Some(entry) = &removed {
            entry.controller.logout();
        }
        removed.is_some()
    }

    /// Evict idle or expired sessions and forget revocations past their token's expiry
    pub fn prune(&self) -> usize {
        let now = Instant::now();
        let wall = Utc::now();

        let mut evicted = 0;
        self.sessions.write().retain(|key, entry| {
            let live = entry.is_live(now, wall, self.idle_timeout);
            if !live {
                tracing::debug!("Evicting access session {}", key.short());
                evicted += 1;
            }
            live
        });
        self.revoked.write().retain(|_, forget_after| *forget_after > wall);

        evicted
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn revoked_tokens(&self) -> usize {
        self.revoked.read().len()
    }
}

/// Periodically prune the registry for the lifetime of the server
pub async fn prune_task(registry: Arc<SessionRegistry>, every: Duration) {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::info!(interval_secs = every.as_secs(), "Session pruning started");
    loop {
        ticker.tick().await;
        let evicted = registry.prune();
        if evicted > 0 {
            tracing::info!(
                evicted,
                active = registry.active_sessions(),
                revoked = registry.revoked_tokens(),
                "Pruned access sessions"
            );
        }
    }
}
