//! Per-visitor orchestration of the resolvers.
//!
//! The controller owns one session's resolver chain and exposes its state as
//! a `watch` channel. Every identity change (login, logout, different user,
//! failed lookup) bumps `generation`; a session or profile fetch that started
//! under an older generation is dropped on arrival instead of being applied.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

use crate::access::business::{ActiveBusinessSelection, BusinessContext, BusinessSwitcher};
use crate::access::cache::QueryPolicy;
use crate::access::error::AccessError;
use crate::access::guard::{authorize_route, GuardDecision};
use crate::access::navigation::{visible_items, NavItem};
use crate::access::profile::{ProfileResolver, ProfileSource};
use crate::access::redirect::{RedirectEngine, RouteDecision};
use crate::access::session::{IdentitySource, SessionResolver};
use crate::access::state::{AccessSnapshot, ProfileState, ResolutionState, SessionState};
use crate::types::{BusinessId, BusinessMembership};

#[derive(Debug, Clone, Copy)]
pub struct ResolverPolicies {
    pub session: QueryPolicy,
    pub profile: QueryPolicy,
}

impl Default for ResolverPolicies {
    fn default() -> Self {
        Self {
            session: QueryPolicy::session(),
            profile: QueryPolicy::profile(),
        }
    }
}

pub struct AccessController {
    session: SessionResolver,
    profile: ProfileResolver,
    business: Mutex<BusinessContext>,
    redirect: Mutex<RedirectEngine>,
    generation: AtomicU64,
    state: watch::Sender<AccessSnapshot>,
}

impl AccessController {
    pub fn new(
        identity: Arc<dyn IdentitySource>,
        profiles: Arc<dyn ProfileSource>,
        policies: ResolverPolicies,
    ) -> Self {
        let (state, _) = watch::channel(AccessSnapshot::default());
        Self {
            session: SessionResolver::new(identity, policies.session),
            profile: ProfileResolver::new(profiles, policies.profile),
            business: Mutex::new(BusinessContext::new()),
            redirect: Mutex::new(RedirectEngine::new()),
            generation: AtomicU64::new(0),
            state,
        }
    }

    pub fn snapshot(&self) -> AccessSnapshot {
        self.state.borrow().clone()
    }

    /// Read-only subscription to every state transition
    pub fn subscribe(&self) -> watch::Receiver<AccessSnapshot> {
        self.state.subscribe()
    }

    pub fn session_fetch_count(&self) -> usize {
        self.session.fetch_count()
    }

    pub fn profile_fetch_count(&self) -> usize {
        self.profile.fetch_count()
    }

    /// Resolve the session, then the profile if the session allows it
    pub async fn refresh(&self) -> AccessSnapshot {
        self.refresh_session().await;
        self.refresh_profile().await;
        self.snapshot()
    }

    /// Resolve the session; an answer that arrives after a logout or identity
    /// reset is dropped and the current state returned instead.
    pub async fn refresh_session(&self) -> SessionState {
        let generation = self.generation.load(Ordering::SeqCst);
        let next = self.session.resolve().await;
        self.apply_session(next, generation);
        self.state.borrow().session.clone()
    }

    /// Fetch the profile for the current identity, if any.
    ///
    /// Returns the profile state in effect afterwards, which is unchanged when
    /// the result arrived for an identity that is no longer current.
    pub async fn refresh_profile(&self) -> ProfileState {
        let generation = self.generation.load(Ordering::SeqCst);
        let session = self.state.borrow().session.clone();

        let next = self.profile.resolve(&session).await;
        if next.is_pending() {
            return self.state.borrow().profile.clone();
        }

        let mut applied = false;
        self.state.send_if_modified(|snapshot| {
            if self.generation.load(Ordering::SeqCst) != generation || snapshot.session != session {
                return false;
            }
            applied = true;
            if snapshot.profile == next {
                return false;
            }
            snapshot.profile = next.clone();
            true
        });

        if !applied {
            tracing::debug!("Discarding profile response for a session that is no longer current");
        }
        self.state.borrow().profile.clone()
    }

    fn apply_session(&self, next: SessionState, generation: u64) {
        self.state.send_if_modified(|snapshot| {
            if self.generation.load(Ordering::SeqCst) != generation {
                tracing::debug!("Discarding session response that started before a reset");
                return false;
            }
            if snapshot.session == next {
                return false;
            }
            let identity_changed =
                snapshot.session.identity().map(|i| &i.id) != next.identity().map(|i| &i.id);
            if identity_changed {
                self.reset_identity_scoped();
                snapshot.profile = ResolutionState::Pending;
            }
            snapshot.session = next;
            true
        });
    }

    /// Drop everything tied to the previous identity
    fn reset_identity_scoped(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.profile.clear();
        self.business.lock().clear();
        self.redirect.lock().reset();
    }

    pub fn logout(&self) {
        tracing::info!("Logging out session");
        self.reset_identity_scoped();
        self.session.clear();
        self.state.send_replace(AccessSnapshot {
            session: ResolutionState::Resolved(None),
            profile: ResolutionState::Pending,
        });
    }

    /// Redirect decision for `path`; a navigation is issued at most once per state
    pub fn route(&self, path: &str) -> RouteDecision {
        let snapshot = self.snapshot();
        self.redirect
            .lock()
            .evaluate(&snapshot.session, &snapshot.profile, path)
    }

    pub fn authorize_business(&self, route_business_id: &str) -> GuardDecision {
        let snapshot = self.snapshot();
        authorize_route(&snapshot.session, &snapshot.profile, route_business_id)
    }

    fn memberships(&self) -> Vec<BusinessMembership> {
        match &self.state.borrow().profile {
            ResolutionState::Resolved(Some(profile)) => profile.business_memberships.clone(),
            _ => Vec::new(),
        }
    }

    pub fn select_business(&self, business_id: BusinessId) -> Result<ActiveBusinessSelection, AccessError> {
        let memberships = self.memberships();
        self.business.lock().select(&memberships, business_id)
    }

    pub fn active_business(&self) -> Option<BusinessId> {
        let memberships = self.memberships();
        self.business.lock().active(&memberships)
    }

    pub fn switcher(&self) -> BusinessSwitcher {
        let memberships = self.memberships();
        self.business.lock().switcher(&memberships)
    }

    pub fn navigation(&self) -> Vec<NavItem> {
        let snapshot = self.snapshot();
        if snapshot.session.identity().is_none() {
            return Vec::new();
        }
        let profile = match &snapshot.profile {
            ResolutionState::Resolved(profile) => profile.as_ref(),
            _ => None,
        };
        visible_items(profile, self.active_business())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, FailingIdentity, GatedIdentity, GatedProfiles, StaticIdentity, StaticProfiles};
    use crate::types::{Profile, Role};

    fn controller(identity: Arc<StaticIdentity>, profiles: Arc<dyn ProfileSource>) -> Arc<AccessController> {
        Arc::new(AccessController::new(identity, profiles, ResolverPolicies::default()))
    }

    #[tokio::test]
    async fn test_admin_flow_redirects_once() {
        let identity = Arc::new(StaticIdentity::new(testing::admin()));
        let profiles = Arc::new(StaticProfiles::default().with("u-admin", Profile::new(Role::Admin, vec![])));
        let access = controller(identity, profiles);

        assert_eq!(access.route("/"), RouteDecision::Wait);
        access.refresh().await;

        let first = access.route("/");
        assert_eq!(first.navigation().map(|n| n.to.as_str()), Some("/admin-dashboard"));
        assert_eq!(access.route("/"), RouteDecision::Stay);
        assert_eq!(access.route("/admin-dashboard"), RouteDecision::Stay);

        // landed, then reloaded the entry page
        assert_eq!(access.route("/"), first);
    }

    #[tokio::test]
    async fn test_logged_out_never_fetches_profile() {
        let identity = Arc::new(StaticIdentity::anonymous());
        let profiles = Arc::new(StaticProfiles::default());
        let access = controller(identity, profiles.clone());

        for _ in 0..5 {
            access.refresh().await;
            assert_eq!(access.route("/"), RouteDecision::Unauthenticated);
        }

        assert_eq!(access.profile_fetch_count(), 0);
        assert_eq!(profiles.calls(), 0);
        assert!(access.snapshot().profile.is_pending());
    }

    #[tokio::test]
    async fn test_session_fetched_once_while_fresh() {
        let identity = Arc::new(StaticIdentity::new(testing::owner()));
        let access = controller(identity.clone(), Arc::new(StaticProfiles::default()));

        access.refresh().await;
        access.refresh().await;

        assert_eq!(identity.calls(), 1);
        assert_eq!(access.session_fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_identity_reads_as_logged_out() {
        let access = Arc::new(AccessController::new(
            Arc::new(FailingIdentity::default()),
            Arc::new(StaticProfiles::default()),
            ResolverPolicies::default(),
        ));

        let snapshot = access.refresh().await;

        assert!(matches!(snapshot.session, ResolutionState::Failed(_)));
        assert_eq!(access.route("/dashboard"), RouteDecision::Unauthenticated);
        assert_eq!(access.profile_fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_profile_failure_defaults_to_owner_dashboard() {
        let identity = Arc::new(StaticIdentity::new(testing::owner()));
        let access = controller(identity, Arc::new(StaticProfiles::default()));

        let snapshot = access.refresh().await;

        assert_eq!(snapshot.profile, ResolutionState::Resolved(None));
        assert_eq!(access.route("/dashboard"), RouteDecision::Stay);
    }

    #[tokio::test]
    async fn test_logout_discards_in_flight_profile() {
        let identity = Arc::new(StaticIdentity::new(testing::admin()));
        let profiles = GatedProfiles::new(
            StaticProfiles::default().with("u-admin", Profile::new(Role::Admin, vec![])),
        );
        let access = controller(identity, profiles.clone());

        access.refresh_session().await;
        let in_flight = {
            let access = access.clone();
            tokio::spawn(async move { access.refresh_profile().await })
        };

        profiles.wait_started().await;
        access.logout();
        profiles.release();

        let profile_after = in_flight.await.unwrap();
        assert!(profile_after.is_pending());

        let snapshot = access.snapshot();
        assert_eq!(snapshot.session, ResolutionState::Resolved(None));
        assert!(snapshot.profile.is_pending());
        assert_eq!(access.route("/"), RouteDecision::Unauthenticated);
    }

    #[tokio::test]
    async fn test_logout_discards_in_flight_session() {
        let identity = GatedIdentity::new(testing::admin());
        let profiles = Arc::new(StaticProfiles::default().with("u-admin", Profile::new(Role::Admin, vec![])));
        let access = Arc::new(AccessController::new(
            identity.clone(),
            profiles.clone(),
            ResolverPolicies::default(),
        ));

        let in_flight = {
            let access = access.clone();
            tokio::spawn(async move { access.refresh().await })
        };

        identity.wait_started().await;
        access.logout();
        identity.release();

        let snapshot = in_flight.await.unwrap();
        assert_eq!(snapshot.session, ResolutionState::Resolved(None));
        assert!(snapshot.profile.is_pending());
        assert_eq!(access.snapshot().session, ResolutionState::Resolved(None));
        assert_eq!(access.route("/"), RouteDecision::Unauthenticated);
        assert_eq!(profiles.calls(), 0);
    }

    #[tokio::test]
    async fn test_switching_user_discards_previous_profile() {
        let identity = Arc::new(StaticIdentity::new(testing::admin()));
        let profiles = GatedProfiles::new(
            StaticProfiles::default()
                .with("u-admin", Profile::new(Role::Admin, vec![]))
                .with("u-owner", Profile::new(Role::Owner, vec![])),
        );
        let access = controller(identity.clone(), profiles.clone());

        access.refresh_session().await;
        let in_flight = {
            let access = access.clone();
            tokio::spawn(async move { access.refresh_profile().await })
        };
        profiles.wait_started().await;

        access.logout();
        identity.set(Some(testing::owner()));
        access.refresh_session().await;
        profiles.release();
        in_flight.await.unwrap();

        assert!(access.snapshot().profile.is_pending());

        let owner_fetch = {
            let access = access.clone();
            tokio::spawn(async move { access.refresh_profile().await })
        };
        profiles.wait_started().await;
        profiles.release();
        let profile = owner_fetch.await.unwrap();
        assert_eq!(profile.effective_role(), Some(Role::Owner));
    }

    #[tokio::test]
    async fn test_subscribers_see_transitions() {
        let identity = Arc::new(StaticIdentity::new(testing::owner()));
        let profiles = Arc::new(StaticProfiles::default().with("u-owner", testing::multi_business_profile()));
        let access = controller(identity, profiles);
        let mut updates = access.subscribe();

        access.refresh().await;
        assert!(updates.has_changed().unwrap());
        let seen = updates.borrow_and_update().clone();
        assert_eq!(seen.profile.effective_role(), Some(Role::Owner));

        access.logout();
        updates.changed().await.unwrap();
        assert_eq!(updates.borrow().session, ResolutionState::Resolved(None));
    }

    #[tokio::test]
    async fn test_business_selection_scoped_to_session() {
        let identity = Arc::new(StaticIdentity::new(testing::owner()));
        let profiles = Arc::new(StaticProfiles::default().with("u-owner", testing::multi_business_profile()));
        let access = controller(identity, profiles);
        access.refresh().await;

        assert_eq!(access.active_business(), Some(BusinessId(1)));
        assert!(access.switcher().visible);
        assert_eq!(access.select_business(BusinessId(2)).unwrap().business_id, BusinessId(2));
        assert_eq!(access.active_business(), Some(BusinessId(2)));
        assert_eq!(
            access.select_business(BusinessId(77)),
            Err(AccessError::InvalidSelection(BusinessId(77)))
        );

        assert!(access.authorize_business("2").is_authorized());
        assert!(!access.authorize_business("1").is_authorized());
        assert!(access
            .navigation()
            .iter()
            .any(|item| item.path == "/business/2/dashboard"));

        access.logout();
        assert_eq!(access.active_business(), None);
        assert!(access.navigation().is_empty());
    }
}
