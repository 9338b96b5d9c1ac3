//! Unit of Work: one place to reach every repository.
//!
//! Each endpoint touches a single aggregate, so there are no multi-table
//! transactions here; the hub only hands out shared repository instances
//! built on one connection pool.

use std::sync::Arc;

#[cfg(test)]
use mockall::automock;
use sea_orm::DatabaseConnection;

use super::repositories::{
    AccountRepository, AccountStore, CategoryRepository, CategoryStore, SubmissionRepository,
    SubmissionStore, UserRepository, UserStore,
};

/// Repository access for the service layer.
#[cfg_attr(test, automock)]
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> Arc<dyn UserRepository>;

    fn accounts(&self) -> Arc<dyn AccountRepository>;

    fn categories(&self) -> Arc<dyn CategoryRepository>;

    fn submissions(&self) -> Arc<dyn SubmissionRepository>;
}

/// SeaORM backed implementation of [`UnitOfWork`]
pub struct Persistence {
    user_repo: Arc<UserStore>,
    account_repo: Arc<AccountStore>,
    category_repo: Arc<CategoryStore>,
    submission_repo: Arc<SubmissionStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            user_repo: Arc::new(UserStore::new(db.clone())),
            account_repo: Arc::new(AccountStore::new(db.clone())),
            category_repo: Arc::new(CategoryStore::new(db.clone())),
            submission_repo: Arc::new(SubmissionStore::new(db)),
        }
    }
}

impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn accounts(&self) -> Arc<dyn AccountRepository> {
        self.account_repo.clone()
    }

    fn categories(&self) -> Arc<dyn CategoryRepository> {
        self.category_repo.clone()
    }

    fn submissions(&self) -> Arc<dyn SubmissionRepository> {
        self.submission_repo.clone()
    }
}
