use serde::Serialize;

use crate::access::error::AccessError;
use crate::types::{Identity, Profile, Role, DEFAULT_ROLE};

/// Tri-state of an asynchronous fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum ResolutionState<T> {
    Pending,
    Resolved(T),
    Failed(AccessErrorView),
}

/// Serializable view of a failure carried inside a resolution state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessErrorView {
    pub message: String,
}

impl From<&AccessError> for AccessErrorView {
    fn from(err: &AccessError) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}

impl<T> ResolutionState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, ResolutionState::Pending)
    }

    pub fn failed(err: &AccessError) -> Self {
        ResolutionState::Failed(err.into())
    }
}

impl<T> Default for ResolutionState<T> {
    fn default() -> Self {
        ResolutionState::Pending
    }
}

pub type SessionState = ResolutionState<Option<Identity>>;
pub type ProfileState = ResolutionState<Option<Profile>>;

/// Collapsed view of the session that downstream consumers act on.
/// A failed session is indistinguishable from being logged out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionView<'a> {
    Pending,
    Anonymous,
    Authenticated(&'a Identity),
}

impl SessionState {
    pub fn view(&self) -> SessionView<'_> {
        match self {
            ResolutionState::Pending => SessionView::Pending,
            ResolutionState::Resolved(Some(identity)) => SessionView::Authenticated(identity),
            ResolutionState::Resolved(None) | ResolutionState::Failed(_) => SessionView::Anonymous,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self.view() {
            SessionView::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }
}

impl ProfileState {
    /// Resolved profile, `Some(None)` when resolved without one, `None` while pending
    pub fn resolved(&self) -> Option<Option<&Profile>> {
        match self {
            ResolutionState::Pending => None,
            ResolutionState::Resolved(profile) => Some(profile.as_ref()),
            ResolutionState::Failed(_) => Some(None),
        }
    }

    /// Effective role once resolved; a missing profile falls back to [`DEFAULT_ROLE`]
    pub fn effective_role(&self) -> Option<Role> {
        self.resolved()
            .map(|profile| profile.map(|p| p.role).unwrap_or(DEFAULT_ROLE))
    }
}

/// Consistent snapshot of both resolvers at one instant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccessSnapshot {
    pub session: SessionState,
    pub profile: ProfileState,
}
