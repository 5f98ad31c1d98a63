pub mod business_admin;
pub mod response;
pub mod session;

pub use business_admin::{business_admin_middleware, AuthorizedBusiness};
pub use response::{ApiResponse, ApiResult};
pub use session::{session_middleware, AccessSession};
