//! Application state - Dependency injection container.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{Database, RateLimitStore};
use crate::services::{
    AccountService, AuthService, Backends, CategoryService, ContactService, PortfolioService,
    ServiceContainer, Services, UserService,
};

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub user_service: Arc<dyn UserService>,
    pub account_service: Arc<dyn AccountService>,
    pub category_service: Arc<dyn CategoryService>,
    pub contact_service: Arc<dyn ContactService>,
    pub portfolio_service: Arc<dyn PortfolioService>,
    /// Request counters for rate limiting
    pub rate_limits: Arc<dyn RateLimitStore>,
    /// Absent when the router is built without a database (tests)
    pub database: Option<Arc<Database>>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Build every service on top of the database connection.
    pub fn from_config(database: Arc<Database>, config: Config, backends: Backends) -> Self {
        let rate_limits = backends.rate_limits.clone();
        let container = Services::from_connection(database.get_connection(), config.clone(), backends);

        Self::new(&container, rate_limits, Some(database), config)
    }

    /// Create state from any service container.
    pub fn new(
        services: &dyn ServiceContainer,
        rate_limits: Arc<dyn RateLimitStore>,
        database: Option<Arc<Database>>,
        config: Config,
    ) -> Self {
        Self {
            auth_service: services.auth(),
            user_service: services.users(),
            account_service: services.accounts(),
            category_service: services.categories(),
            contact_service: services.contact(),
            portfolio_service: services.portfolio(),
            rate_limits,
            database,
            config: Arc::new(config),
        }
    }
}
