//! Service Container - Centralized service access with parallel execution support.
//!
//! - Centralized access to all application services
//! - Thread-safe concurrent access via Arc
//! - Parallel execution helpers for independent operations

use std::future::Future;
use std::sync::Arc;

use super::{
    AccountManager, AccountService, AuthService, Authenticator, CategoryManager, CategoryService,
    ContactDesk, ContactService, PortfolioService, PortfolioValuer, UserManager, UserService,
};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{ExplorerClient, Mailer, Persistence, PriceSource, RateLimitStore};

/// Access to every application service.
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn users(&self) -> Arc<dyn UserService>;

    fn accounts(&self) -> Arc<dyn AccountService>;

    fn categories(&self) -> Arc<dyn CategoryService>;

    fn contact(&self) -> Arc<dyn ContactService>;

    fn portfolio(&self) -> Arc<dyn PortfolioService>;
}

/// External collaborators the services are built from
pub struct Backends {
    pub mailer: Mailer,
    pub rate_limits: Arc<dyn RateLimitStore>,
    pub prices: Arc<dyn PriceSource>,
    pub explorer: Arc<dyn ExplorerClient>,
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
    account_service: Arc<dyn AccountService>,
    category_service: Arc<dyn CategoryService>,
    contact_service: Arc<dyn ContactService>,
    portfolio_service: Arc<dyn PortfolioService>,
}

impl Services {
    /// Wire every service onto one database connection.
    pub fn from_connection(
        db: sea_orm::DatabaseConnection,
        config: Config,
        backends: Backends,
    ) -> Self {
        let uow = Arc::new(Persistence::new(db));

        Self {
            auth_service: Arc::new(Authenticator::new(
                uow.clone(),
                backends.mailer.clone(),
                config.clone(),
            )),
            user_service: Arc::new(UserManager::new(uow.clone())),
            account_service: Arc::new(AccountManager::new(uow.clone())),
            category_service: Arc::new(CategoryManager::new(uow.clone())),
            contact_service: Arc::new(ContactDesk::new(
                uow,
                backends.mailer,
                backends.rate_limits,
                config,
            )),
            portfolio_service: Arc::new(PortfolioValuer::new(
                backends.prices,
                backends.explorer,
            )),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn accounts(&self) -> Arc<dyn AccountService> {
        self.account_service.clone()
    }

    fn categories(&self) -> Arc<dyn CategoryService> {
        self.category_service.clone()
    }

    fn contact(&self) -> Arc<dyn ContactService> {
        self.contact_service.clone()
    }

    fn portfolio(&self) -> Arc<dyn PortfolioService> {
        self.portfolio_service.clone()
    }
}

/// Parallel execution utilities for running independent operations concurrently.
pub mod parallel {
    use super::*;
    use tokio::try_join;

    /// Execute two independent async operations in parallel.
    ///
    /// If either operation fails, the error is returned immediately.
    pub async fn join2<F1, F2, T1, T2>(f1: F1, f2: F2) -> AppResult<(T1, T2)>
    where
        F1: Future<Output = AppResult<T1>>,
        F2: Future<Output = AppResult<T2>>,
    {
        try_join!(f1, f2)
    }

    /// Execute operations with at most `limit` in flight.
    ///
    /// Results keep the order of the input futures.
    ///
    /// # Example
    /// ```ignore
    /// let balances = parallel::join_all_limited(
    ///     addresses.iter().map(|a| explorer.address_balance(a)),
    ///     4,
    /// ).await?;
    /// ```
    pub async fn join_all_limited<F, T, I>(futures: I, limit: usize) -> AppResult<Vec<T>>
    where
        F: Future<Output = AppResult<T>>,
        I: IntoIterator<Item = F>,
    {
        use futures::stream::{self, StreamExt, TryStreamExt};

        stream::iter(futures)
            .map(Ok)
            .try_buffered(limit.max(1))
            .try_collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::errors::AppError;

    #[tokio::test]
    async fn test_parallel_join2() {
        async fn op1() -> AppResult<i32> {
            Ok(1)
        }
        async fn op2() -> AppResult<i32> {
            Ok(2)
        }

        let (a, b) = parallel::join2(op1(), op2()).await.unwrap();
        assert_eq!(a, 1);
        assert_eq!(b, 2);
    }

    #[tokio::test]
    async fn test_join_all_limited_keeps_input_order() {
        let futures = (0..5u64).map(|i| async move {
            tokio::time::sleep(Duration::from_millis(10 * (5 - i))).await;
            Ok::<_, AppError>(i)
        });

        let results = parallel::join_all_limited(futures, 3).await.unwrap();
        assert_eq!(results, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_join_all_limited_fails_fast() {
        let futures = (0..3).map(|i| async move {
            if i == 1 {
                Err(AppError::upstream("boom"))
            } else {
                Ok(i)
            }
        });

        assert!(parallel::join_all_limited(futures, 2).await.is_err());
    }
}
