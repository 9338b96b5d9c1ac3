//! API middleware.

mod auth;
mod rate_limit;

pub use auth::{auth_middleware, require_account, require_admin, require_user, CurrentUser};
pub use rate_limit::rate_limit_auth_middleware;
