use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::access::cache::{QueryCache, QueryPolicy};
use crate::access::error::AccessError;
use crate::access::state::{ProfileState, ResolutionState, SessionState};
use crate::types::{Identity, Profile};

/// Backend that knows a user's role and business memberships
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn profile_for(&self, identity: &Identity) -> Result<Profile, AccessError>;
}

/// Profile lookup gated on a resolved, non-null identity.
///
/// Backend failures degrade to `resolved(None)` so the visitor still lands on
/// the default-role dashboard instead of stalling.
pub struct ProfileResolver {
    source: Arc<dyn ProfileSource>,
    cache: QueryCache<Option<Profile>>,
    policy: QueryPolicy,
    fetches: AtomicUsize,
}

impl ProfileResolver {
    pub fn new(source: Arc<dyn ProfileSource>, policy: QueryPolicy) -> Self {
        Self {
            source,
            cache: QueryCache::new(),
            policy,
            fetches: AtomicUsize::new(0),
        }
    }

    /// Whether a fetch may be issued for this session state
    pub fn enabled(session: &SessionState) -> bool {
        session.identity().is_some()
    }

    pub async fn resolve(&self, session: &SessionState) -> ProfileState {
        let Some(identity) = session.identity() else {
            tracing::debug!("Profile lookup skipped, no authenticated identity");
            return ResolutionState::Pending;
        };

        let key = format!("profile:{}", identity.id);
        let result = self
            .cache
            .fetch(&key, &self.policy, || async {
                self.fetches.fetch_add(1, Ordering::SeqCst);
                self.source.profile_for(identity).await.map(Some)
            })
            .await;

        match result {
            Ok(profile) => ResolutionState::Resolved(profile),
            Err(e) => {
                tracing::warn!("Profile fetch for '{}' failed, using default role: {}", identity.id, e);
                ResolutionState::Resolved(None)
            }
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn clear(&self) {
        self.cache.clear();
    }
}

/// Profile source used when no profile backend is configured
pub struct UnavailableProfileSource;

#[async_trait]
impl ProfileSource for UnavailableProfileSource {
    async fn profile_for(&self, _identity: &Identity) -> Result<Profile, AccessError> {
        Err(AccessError::transport("no profile backend configured"))
    }
}
