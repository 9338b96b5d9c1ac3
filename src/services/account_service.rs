//! Account service - staff account administration.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{required_name, Account, AccountRole, NewAccount, Password};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

#[async_trait]
pub trait AccountService: Send + Sync {
    async fn get_account(&self, id: Uuid) -> AppResult<Account>;

    async fn list_accounts(&self) -> AppResult<Vec<Account>>;

    async fn create_account(&self, new_account: NewAccount) -> AppResult<Account>;

    /// Create an admin account when none exist yet.
    /// Returns the created account, or `None` when accounts already exist.
    async fn ensure_admin(&self, email: &str, password: &str) -> AppResult<Option<Account>>;
}

pub struct AccountManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> AccountManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> AccountService for AccountManager<U> {
    async fn get_account(&self, id: Uuid) -> AppResult<Account> {
        self.uow.accounts().find_by_id(id).await?.ok_or_not_found()
    }

    async fn list_accounts(&self) -> AppResult<Vec<Account>> {
        self.uow.accounts().list().await
    }

    async fn create_account(&self, new_account: NewAccount) -> AppResult<Account> {
        let email = new_account.email.trim().to_lowercase();
        if email.is_empty() {
            return Err(AppError::validation("Email is required"));
        }
        let name = required_name(&new_account.name)?;

        if self.uow.accounts().find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("Account"));
        }

        let password_hash = Password::new(&new_account.password)?.into_string();
        let account = self
            .uow
            .accounts()
            .create(Account::new(
                email,
                password_hash,
                name,
                new_account.role,
            ))
            .await?;

        tracing::info!(account_id = %account.id, role = %account.role, "Account created");
        Ok(account)
    }

    async fn ensure_admin(&self, email: &str, password: &str) -> AppResult<Option<Account>> {
        if self.uow.accounts().count().await? > 0 {
            return Ok(None);
        }

        let account = self
            .create_account(NewAccount {
                email: email.to_string(),
                password: password.to_string(),
                name: "Administrator".to_string(),
                role: AccountRole::Admin,
            })
            .await?;

        Ok(Some(account))
    }
}
