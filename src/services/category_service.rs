//! Category service - CRUD for website categories.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::category::{validate_form_fields, validate_tag};
use crate::domain::{required_name, Category, CategoryChanges, NewCategory};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

#[async_trait]
pub trait CategoryService: Send + Sync {
    async fn list_categories(&self, active_only: bool) -> AppResult<Vec<Category>>;

    async fn get_category(&self, id: Uuid) -> AppResult<Category>;

    async fn create_category(&self, new_category: NewCategory) -> AppResult<Category>;

    async fn update_category(&self, id: Uuid, changes: CategoryChanges) -> AppResult<Category>;

    async fn delete_category(&self, id: Uuid) -> AppResult<()>;
}

pub struct CategoryManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CategoryManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    /// Fails with 409 when another category already uses `tag`.
    async fn ensure_tag_free(&self, tag: &str, owner: Option<Uuid>) -> AppResult<()> {
        match self.uow.categories().find_by_tag(tag).await? {
            Some(existing) if Some(existing.id) != owner => Err(AppError::conflict("Category")),
            _ => Ok(()),
        }
    }
}

fn normalize_email(email: Option<String>) -> Option<String> {
    email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
}

#[async_trait]
impl<U: UnitOfWork> CategoryService for CategoryManager<U> {
    async fn list_categories(&self, active_only: bool) -> AppResult<Vec<Category>> {
        self.uow.categories().list(active_only).await
    }

    async fn get_category(&self, id: Uuid) -> AppResult<Category> {
        self.uow.categories().find_by_id(id).await?.ok_or_not_found()
    }

    async fn create_category(&self, new_category: NewCategory) -> AppResult<Category> {
        let name = required_name(&new_category.name)?;
        validate_tag(&new_category.tag)?;
        validate_form_fields(&new_category.form_fields)?;
        self.ensure_tag_free(&new_category.tag, None).await?;

        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4(),
            name,
            tag: new_category.tag,
            active: new_category.active,
            notification_email: normalize_email(new_category.notification_email),
            form_fields: new_category.form_fields,
            created_at: now,
            updated_at: now,
        };

        let category = self.uow.categories().create(category).await?;
        tracing::info!(category_id = %category.id, tag = %category.tag, "Category created");
        Ok(category)
    }

    async fn update_category(&self, id: Uuid, changes: CategoryChanges) -> AppResult<Category> {
        let name = changes.name.as_deref().map(required_name).transpose()?;
        let mut category = self.get_category(id).await?;

        if let Some(tag) = changes.tag {
            validate_tag(&tag)?;
            if tag != category.tag {
                self.ensure_tag_free(&tag, Some(id)).await?;
            }
            category.tag = tag;
        }
        if let Some(fields) = changes.form_fields {
            validate_form_fields(&fields)?;
            category.form_fields = fields;
        }
        if let Some(name) = name {
            category.name = name;
        }
        if let Some(active) = changes.active {
            category.active = active;
        }
        if let Some(email) = changes.notification_email {
            category.notification_email = normalize_email(email);
        }
        category.updated_at = Utc::now();

        self.uow.categories().update(category).await
    }

    async fn delete_category(&self, id: Uuid) -> AppResult<()> {
        self.uow.categories().delete(id).await?;
        tracing::info!(category_id = %id, "Category deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FieldKind, FormField};
    use crate::infra::{CategoryRepository, MockCategoryRepository, MockUnitOfWork};

    fn service(categories: MockCategoryRepository) -> CategoryManager<MockUnitOfWork> {
        let categories: Arc<dyn CategoryRepository> = Arc::new(categories);
        let mut uow = MockUnitOfWork::new();
        uow.expect_categories().returning(move || categories.clone());
        CategoryManager::new(Arc::new(uow))
    }

    fn new_category(tag: &str) -> NewCategory {
        NewCategory {
            name: " Vermogensbeheer ".to_string(),
            tag: tag.to_string(),
            active: true,
            notification_email: Some("  ".to_string()),
            form_fields: vec![FormField {
                name: "budget".to_string(),
                label: "Budget".to_string(),
                kind: FieldKind::Number,
                required: true,
            }],
        }
    }

    fn existing(tag: &str) -> Category {
        let now = Utc::now();
        Category {
            id: Uuid::new_v4(),
            name: "Bestaand".to_string(),
            tag: tag.to_string(),
            active: true,
            notification_email: None,
            form_fields: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_category() {
        let mut categories = MockCategoryRepository::new();
        categories.expect_find_by_tag().returning(|_| Ok(None));
        categories.expect_create().returning(|c| Ok(c));

        let category = service(categories)
            .create_category(new_category("vermogensbeheer"))
            .await
            .unwrap();
        assert_eq!(category.name, "Vermogensbeheer");
        assert_eq!(category.notification_email, None);
    }

    #[tokio::test]
    async fn test_create_with_taken_tag_conflicts() {
        let mut categories = MockCategoryRepository::new();
        categories
            .expect_find_by_tag()
            .returning(|tag| Ok(Some(existing(tag))));
        categories.expect_create().never();

        let err = service(categories)
            .create_category(new_category("vermogensbeheer"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_create_with_bad_tag_is_validation_error() {
        let err = service(MockCategoryRepository::new())
            .create_category(new_category("Geen Slug"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_with_blank_name_is_validation_error() {
        let mut categories = MockCategoryRepository::new();
        categories.expect_create().never();

        let err = service(categories)
            .create_category(NewCategory {
                name: "   ".to_string(),
                ..new_category("vermogensbeheer")
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_rejects_blank_name() {
        let mut categories = MockCategoryRepository::new();
        categories.expect_find_by_id().never();
        categories.expect_update().never();

        let err = service(categories)
            .update_category(
                Uuid::new_v4(),
                CategoryChanges {
                    name: Some("  ".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_applies_partial_changes() {
        let current = existing("advies");
        let id = current.id;

        let mut categories = MockCategoryRepository::new();
        categories
            .expect_find_by_id()
            .returning(move |_| Ok(Some(current.clone())));
        categories.expect_find_by_tag().never();
        categories.expect_update().returning(|c| Ok(c));

        let updated = service(categories)
            .update_category(
                id,
                CategoryChanges {
                    active: Some(false),
                    notification_email: Some(Some("advies@bitbeheer.nl".to_string())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(!updated.active);
        assert_eq!(updated.tag, "advies");
        assert_eq!(updated.notification_email.as_deref(), Some("advies@bitbeheer.nl"));
    }

    #[tokio::test]
    async fn test_update_clears_notification_email() {
        let mut current = existing("advies");
        current.notification_email = Some("oud@bitbeheer.nl".to_string());
        let id = current.id;

        let mut categories = MockCategoryRepository::new();
        categories
            .expect_find_by_id()
            .returning(move |_| Ok(Some(current.clone())));
        categories.expect_update().returning(|c| Ok(c));

        let updated = service(categories)
            .update_category(
                id,
                CategoryChanges {
                    notification_email: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.notification_email, None);
    }

    #[tokio::test]
    async fn test_update_missing_category_is_not_found() {
        let mut categories = MockCategoryRepository::new();
        categories.expect_find_by_id().returning(|_| Ok(None));

        let err = service(categories)
            .update_category(Uuid::new_v4(), CategoryChanges::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }
}
