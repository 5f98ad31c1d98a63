//! Authorization and multi-tenant routing core.
//!
//! Session resolver -> profile resolver -> {redirect engine, business-admin
//! guard}; the business context consumes the profile's memberships.

pub mod business;
pub mod cache;
pub mod controller;
pub mod error;
pub mod guard;
pub mod navigation;
pub mod profile;
pub mod redirect;
pub mod registry;
pub mod session;
pub mod state;

pub use business::{select_active_business, ActiveBusinessSelection, BusinessContext, BusinessSwitcher};
pub use cache::{QueryCache, QueryPolicy};
pub use controller::{AccessController, ResolverPolicies};
pub use error::AccessError;
pub use guard::{authorize_business, authorize_route, GuardDecision};
pub use navigation::{visible_items, NavItem};
pub use profile::{ProfileResolver, ProfileSource, UnavailableProfileSource};
pub use redirect::{decide, Navigation, RedirectEngine, RouteDecision};
pub use registry::{prune_task, SessionKey, SessionRegistry, SessionSources};
pub use session::{AnonymousIdentity, IdentitySource, SessionResolver};
pub use state::{AccessSnapshot, ProfileState, ResolutionState, SessionState};
