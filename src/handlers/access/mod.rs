pub mod authorize;
pub mod business;
pub mod navigation;
pub mod route;
pub mod session;
pub mod whoami;

// Re-export handler functions for use in routing
pub use authorize::authorize_get;
pub use business::{business_get, business_put};
pub use navigation::navigation_get;
pub use route::route_get;
pub use session::session_delete;
pub use whoami::whoami;
