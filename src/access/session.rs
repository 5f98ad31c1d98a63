use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::access::cache::{QueryCache, QueryPolicy};
use crate::access::error::AccessError;
use crate::access::state::{ResolutionState, SessionState};
use crate::types::Identity;

const IDENTITY_KEY: &str = "identity";

/// Backend answering "who is logged in right now".
///
/// Not being logged in is `Ok(None)`; only transport problems are errors.
#[async_trait]
pub trait IdentitySource: Send + Sync {
    async fn current_identity(&self) -> Result<Option<Identity>, AccessError>;

    /// Instant after which the credential behind this source stops being valid
    fn expires_at(&self) -> Option<DateTime<Utc>> {
        None
    }
}

/// Resolves the current identity through the query cache, without retries
pub struct SessionResolver {
    source: Arc<dyn IdentitySource>,
    cache: QueryCache<Option<Identity>>,
    policy: QueryPolicy,
    fetches: AtomicUsize,
}

impl SessionResolver {
    pub fn new(source: Arc<dyn IdentitySource>, policy: QueryPolicy) -> Self {
        Self {
            source,
            cache: QueryCache::new(),
            policy,
            fetches: AtomicUsize::new(0),
        }
    }

    pub async fn resolve(&self) -> SessionState {
        let result = self
            .cache
            .fetch(IDENTITY_KEY, &self.effective_policy(), || {
                self.fetches.fetch_add(1, Ordering::SeqCst);
                self.source.current_identity()
            })
            .await;

        match result {
            Ok(identity) => ResolutionState::Resolved(identity),
            Err(e) => {
                tracing::warn!("Identity fetch failed, treating visitor as logged out: {}", e);
                ResolutionState::failed(&e)
            }
        }
    }

    /// Never keep an identity past the expiry of the credential it came from
    fn effective_policy(&self) -> QueryPolicy {
        let Some(expires_at) = self.source.expires_at() else {
            return self.policy;
        };
        let remaining = (expires_at - Utc::now()).to_std().unwrap_or(Duration::ZERO);
        QueryPolicy {
            stale_time: self.policy.stale_time.min(remaining),
            ..self.policy
        }
    }

    /// Number of calls issued to the identity backend
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn clear(&self) {
        self.cache.clear();
    }
}

/// Identity source for visitors without any credentials
pub struct AnonymousIdentity;

#[async_trait]
impl IdentitySource for AnonymousIdentity {
    async fn current_identity(&self) -> Result<Option<Identity>, AccessError> {
        Ok(None)
    }
}
