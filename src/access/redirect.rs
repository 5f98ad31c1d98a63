//! Role-based redirect decisions.
//!
//! [`decide`] is a pure function of (session, profile, path). It only ever
//! navigates away from `/` or `/dashboard`, and never to the path the visitor
//! is already on, so re-applying it after the navigation lands is a no-op.
//! [`RedirectEngine`] adds the stateful half: the same input snapshot never
//! produces a second navigation.

use serde::Serialize;

use crate::access::state::{ProfileState, SessionState, SessionView};

/// Paths from which the visitor is sent to their role's home
pub const ENTRY_PATHS: [&str; 2] = ["/", "/dashboard"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Navigation {
    pub to: String,
    /// Engine-driven navigations always replace the current history entry
    pub replace: bool,
}

impl Navigation {
    pub fn replace(to: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            replace: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RouteDecision {
    /// Session still resolving; render nothing yet
    Wait,
    /// No session (or the identity lookup failed); show the login view
    Unauthenticated,
    /// Authenticated but the profile is still loading
    Loading,
    /// Render the requested path as-is
    Stay,
    Navigate(Navigation),
}

impl RouteDecision {
    pub fn navigation(&self) -> Option<&Navigation> {
        match self {
            RouteDecision::Navigate(nav) => Some(nav),
            _ => None,
        }
    }
}

pub fn is_entry_path(path: &str) -> bool {
    ENTRY_PATHS.iter().any(|entry| *entry == path)
}

pub fn decide(session: &SessionState, profile: &ProfileState, current_path: &str) -> RouteDecision {
    match session.view() {
        SessionView::Pending => RouteDecision::Wait,
        SessionView::Anonymous => RouteDecision::Unauthenticated,
        SessionView::Authenticated(_) => match profile.effective_role() {
            None => RouteDecision::Loading,
            Some(role) => {
                let home = role.home_path();
                if is_entry_path(current_path) && current_path != home {
                    RouteDecision::Navigate(Navigation::replace(home))
                } else {
                    RouteDecision::Stay
                }
            }
        },
    }
}

/// Input snapshot a navigation was issued for
#[derive(Debug, Clone, PartialEq, Eq)]
struct Issued {
    session: SessionState,
    profile: ProfileState,
    path: String,
    navigation: Navigation,
}

/// Stateful wrapper around [`decide`] that never issues the same navigation twice
#[derive(Debug, Default)]
pub struct RedirectEngine {
    last: Option<Issued>,
}

impl RedirectEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn evaluate(&mut self, session: &SessionState, profile: &ProfileState, current_path: &str) -> RouteDecision {
        let decision = decide(session, profile, current_path);

        // a report from any other path means the client moved, so the entry
        // page may be redirected again on its next render
        if self.last.as_ref().is_some_and(|last| last.path != current_path) {
            self.last = None;
        }

        let RouteDecision::Navigate(navigation) = &decision else {
            return decision;
        };

        if let Some(last) = &self.last {
            if last.path == current_path
                && &last.navigation == navigation
                && &last.session == session
                && &last.profile == profile
            {
                tracing::debug!("Navigation to {} already issued for this state", navigation.to);
                return RouteDecision::Stay;
            }
        }

        tracing::info!("Redirecting {} -> {}", current_path, navigation.to);
        self.last = Some(Issued {
            session: session.clone(),
            profile: profile.clone(),
            path: current_path.to_string(),
            navigation: navigation.clone(),
        });
        decision
    }

    /// Forget issued navigations, e.g. after logout
    pub fn reset(&mut self) {
        self.last = None;
    }
}
