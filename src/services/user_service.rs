//! User service - website user lookups and administration.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::User;
use crate::errors::{AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};

#[async_trait]
pub trait UserService: Send + Sync {
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    /// Newest users first
    async fn list_users(&self, params: PaginationParams) -> AppResult<Paginated<User>>;

    async fn delete_user(&self, id: Uuid) -> AppResult<()>;
}

pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> UserManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.uow.users().find_by_id(id).await?.ok_or_not_found()
    }

    async fn list_users(&self, params: PaginationParams) -> AppResult<Paginated<User>> {
        let params = params.normalized();
        let (users, total) = self.uow.users().list(params.clone()).await?;
        Ok(Paginated::new(users, params.page, params.limit(), total))
    }

    async fn delete_user(&self, id: Uuid) -> AppResult<()> {
        self.uow.users().delete(id).await?;
        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use crate::infra::{MockUnitOfWork, MockUserRepository, UserRepository};

    fn service(users: MockUserRepository) -> UserManager<MockUnitOfWork> {
        let users: Arc<dyn UserRepository> = Arc::new(users);
        let mut uow = MockUnitOfWork::new();
        uow.expect_users().returning(move || users.clone());
        UserManager::new(Arc::new(uow))
    }

    fn user() -> User {
        User::new(
            "jan@example.com".to_string(),
            "hash".to_string(),
            "Jan".to_string(),
            None,
        )
    }

    #[tokio::test]
    async fn test_get_missing_user_is_not_found() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|_| Ok(None));

        let err = service(users).get_user(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn test_list_users_builds_page_meta() {
        let mut users = MockUserRepository::new();
        users
            .expect_list()
            .withf(|p| p.page == 2 && p.per_page == 100)
            .returning(|_| Ok((vec![user()], 101)));

        let page = service(users)
            .list_users(PaginationParams {
                page: 2,
                per_page: 500,
            })
            .await
            .unwrap();

        assert_eq!(page.data.len(), 1);
        assert_eq!(page.meta.per_page, 100);
        assert_eq!(page.meta.total_pages, 2);
    }

    #[tokio::test]
    async fn test_delete_propagates_not_found() {
        let mut users = MockUserRepository::new();
        users.expect_delete().returning(|_| Err(AppError::NotFound));

        assert!(matches!(
            service(users).delete_user(Uuid::new_v4()).await,
            Err(AppError::NotFound)
        ));
    }
}
