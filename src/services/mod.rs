//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure. They depend on
//! traits so handlers and tests can swap implementations, and reach the
//! database through the Unit of Work.

mod account_service;
mod auth_service;
mod category_service;
mod contact_service;
pub mod container;
mod portfolio_service;
mod user_service;

// Service Container
pub use container::{parallel, Backends, ServiceContainer, Services};

// Service traits and implementations
pub use account_service::{AccountManager, AccountService};
pub use auth_service::{AuthService, Authenticator, Claims, PrincipalKind, TokenResponse};
pub use category_service::{CategoryManager, CategoryService};
pub use contact_service::{ContactDesk, ContactMessage, ContactReceipt, ContactService, CONTACT_FORM};
pub use portfolio_service::{PortfolioService, PortfolioValuer};
pub use user_service::{UserManager, UserService};
