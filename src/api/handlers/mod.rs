//! HTTP request handlers.

pub mod account_handler;
pub mod category_handler;
pub mod contact_handler;
pub mod portfolio_handler;
pub mod rate_limit_handler;
pub mod template_handler;
pub mod user_handler;

pub use account_handler::{account_protected_routes, account_routes};
pub use category_handler::{category_protected_routes, category_routes};
pub use contact_handler::contact_routes;
pub use portfolio_handler::portfolio_routes;
pub use rate_limit_handler::rate_limit_routes;
pub use template_handler::template_protected_routes;
pub use user_handler::{user_protected_routes, user_routes};
