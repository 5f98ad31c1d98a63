use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

use crate::access::{AccessError, IdentitySource, ProfileSource};
use crate::types::{BusinessMembership, Identity, MembershipRole, Profile, Role};

/// Test doubles for the identity and profile backends

/// Identity backend whose answer can be swapped mid-test (login / logout)
#[derive(Default)]
pub struct StaticIdentity {
    identity: Mutex<Option<Identity>>,
    calls: AtomicUsize,
}

impl StaticIdentity {
    pub fn new(identity: Identity) -> Self {
        Self {
            identity: Mutex::new(Some(identity)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn set(&self, identity: Option<Identity>) {
        *self.identity.lock() = identity;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentitySource for StaticIdentity {
    async fn current_identity(&self) -> Result<Option<Identity>, AccessError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.identity.lock().clone())
    }
}

/// Identity backend that holds every answer until `release()` is called
pub struct GatedIdentity {
    inner: StaticIdentity,
    started: Notify,
    gate: Notify,
}

impl GatedIdentity {
    pub fn new(identity: Identity) -> Arc<Self> {
        Arc::new(Self {
            inner: StaticIdentity::new(identity),
            started: Notify::new(),
            gate: Notify::new(),
        })
    }

    pub async fn wait_started(&self) {
        self.started.notified().await;
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }
}

#[async_trait]
impl IdentitySource for GatedIdentity {
    async fn current_identity(&self) -> Result<Option<Identity>, AccessError> {
        self.started.notify_one();
        self.gate.notified().await;
        self.inner.current_identity().await
    }
}

#[derive(Default)]
pub struct FailingIdentity {
    calls: AtomicUsize,
}

impl FailingIdentity {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentitySource for FailingIdentity {
    async fn current_identity(&self) -> Result<Option<Identity>, AccessError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(AccessError::transport("connection refused"))
    }
}

/// Profile backend keyed by identity id; unknown ids fail
#[derive(Default)]
pub struct StaticProfiles {
    profiles: HashMap<String, Profile>,
    calls: AtomicUsize,
}

impl StaticProfiles {
    pub fn with(mut self, identity_id: &str, profile: Profile) -> Self {
        self.profiles.insert(identity_id.to_string(), profile);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileSource for StaticProfiles {
    async fn profile_for(&self, identity: &Identity) -> Result<Profile, AccessError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.profiles
            .get(&identity.id)
            .cloned()
            .ok_or_else(|| AccessError::transport(format!("no profile for {}", identity.id)))
    }
}

/// Profile backend that holds every response until `release()` is called
pub struct GatedProfiles {
    inner: StaticProfiles,
    started: Notify,
    gate: Notify,
}

impl GatedProfiles {
    pub fn new(inner: StaticProfiles) -> Arc<Self> {
        Arc::new(Self {
            inner,
            started: Notify::new(),
            gate: Notify::new(),
        })
    }

    /// Resolves once a fetch is waiting at the gate
    pub async fn wait_started(&self) {
        self.started.notified().await;
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }
}

#[async_trait]
impl ProfileSource for GatedProfiles {
    async fn profile_for(&self, identity: &Identity) -> Result<Profile, AccessError> {
        self.started.notify_one();
        self.gate.notified().await;
        self.inner.profile_for(identity).await
    }
}

pub fn owner() -> Identity {
    Identity::new("u-owner", "owner@example.com")
}

pub fn admin() -> Identity {
    Identity::new("u-admin", "admin@example.com")
}

pub fn multi_business_profile() -> Profile {
    Profile::new(
        Role::Owner,
        vec![
            BusinessMembership::new(1, "Acme Bakery", MembershipRole::Staff),
            BusinessMembership::new(2, "Acme Catering", MembershipRole::BusinessAdmin),
        ],
    )
}
