use serde::Serialize;

use crate::access::error::AccessError;
use crate::access::redirect::Navigation;
use crate::access::state::{ProfileState, SessionState, SessionView};
use crate::types::{BusinessId, Profile, Role, DEFAULT_ROLE};

/// Where a denied visitor is sent; same landing page as the redirect engine's default home
pub const DENIED_LANDING: &str = "/dashboard";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GuardDecision {
    /// Still resolving; render a neutral loading indicator only
    Pending,
    Authorized,
    Unauthorized { redirect: Navigation },
}

impl GuardDecision {
    pub fn is_authorized(&self) -> bool {
        matches!(self, GuardDecision::Authorized)
    }

    pub fn denied() -> Self {
        GuardDecision::Unauthorized {
            redirect: Navigation::replace(DENIED_LANDING),
        }
    }

    /// Convert to a result for callers that propagate with `?`
    pub fn into_result(self, business_id: BusinessId) -> Result<bool, AccessError> {
        match self {
            GuardDecision::Pending => Ok(false),
            GuardDecision::Authorized => Ok(true),
            GuardDecision::Unauthorized { .. } => Err(AccessError::AuthorizationDenied(business_id)),
        }
    }
}

pub fn is_super_admin(profile: Option<&Profile>) -> bool {
    profile.map(|p| p.role).unwrap_or(DEFAULT_ROLE) == Role::Admin
}

pub fn is_business_admin(profile: Option<&Profile>, business_id: BusinessId) -> bool {
    profile
        .and_then(|p| p.membership(business_id))
        .map(|m| m.role_within_business.is_administrative())
        .unwrap_or(false)
}

/// Gate for business-scoped admin views
pub fn authorize_business(session: &SessionState, profile: &ProfileState, business_id: BusinessId) -> GuardDecision {
    match session.view() {
        SessionView::Pending => GuardDecision::Pending,
        SessionView::Anonymous => GuardDecision::denied(),
        SessionView::Authenticated(identity) => match profile.resolved() {
            None => GuardDecision::Pending,
            Some(profile) => {
                if is_super_admin(profile) || is_business_admin(profile, business_id) {
                    GuardDecision::Authorized
                } else {
                    tracing::warn!("User '{}' denied admin access to business {}", identity.id, business_id);
                    GuardDecision::denied()
                }
            }
        },
    }
}

/// Same as [`authorize_business`] for a raw route segment; unparseable ids are denied once resolved
pub fn authorize_route(session: &SessionState, profile: &ProfileState, route_business_id: &str) -> GuardDecision {
    match route_business_id.parse::<BusinessId>() {
        Ok(business_id) => authorize_business(session, profile, business_id),
        Err(_) => {
            let loading = match session.view() {
                SessionView::Pending => true,
                SessionView::Anonymous => false,
                SessionView::Authenticated(_) => profile.is_pending(),
            };
            if loading {
                GuardDecision::Pending
            } else {
                tracing::warn!("Rejecting malformed business id '{}'", route_business_id);
                GuardDecision::denied()
            }
        }
    }
}
