//! Staff account repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::account::{self, ActiveModel, Entity as AccountEntity};
use crate::domain::Account;
use crate::errors::{AppError, AppResult, DbResultExt};

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Account>>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>>;

    async fn create(&self, account: Account) -> AppResult<Account>;

    /// Bump the login counter and last login timestamp
    async fn record_login(&self, id: Uuid) -> AppResult<()>;

    /// All accounts ordered by email
    async fn list(&self) -> AppResult<Vec<Account>>;

    async fn count(&self) -> AppResult<u64>;
}

/// SeaORM implementation of AccountRepository
pub struct AccountStore {
    db: DatabaseConnection,
}

impl AccountStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountRepository for AccountStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Account>> {
        let result = AccountEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Account::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        let result = AccountEntity::find()
            .filter(account::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        Ok(result.map(Account::from))
    }

    async fn create(&self, account: Account) -> AppResult<Account> {
        let active_model = ActiveModel {
            id: Set(account.id),
            email: Set(account.email),
            password_hash: Set(account.password_hash),
            name: Set(account.name),
            role: Set(account.role.to_string()),
            login_count: Set(account.login_count),
            last_login_at: Set(account.last_login_at),
            created_at: Set(account.created_at),
            updated_at: Set(account.updated_at),
        };

        let model = active_model.insert(&self.db).await.or_conflict("Account")?;
        Ok(Account::from(model))
    }

    async fn record_login(&self, id: Uuid) -> AppResult<()> {
        let now = Utc::now();
        let result = AccountEntity::update_many()
            .col_expr(
                account::Column::LoginCount,
                Expr::col(account::Column::LoginCount).add(1),
            )
            .col_expr(account::Column::LastLoginAt, Expr::value(now))
            .col_expr(account::Column::UpdatedAt, Expr::value(now))
            .filter(account::Column::Id.eq(id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn list(&self) -> AppResult<Vec<Account>> {
        let models = AccountEntity::find()
            .order_by_asc(account::Column::Email)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Account::from).collect())
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(AccountEntity::find().count(&self.db).await?)
    }
}
