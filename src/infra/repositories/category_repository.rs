//! Category repository implementation.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::category::{self, ActiveModel, Entity as CategoryEntity};
use crate::domain::Category;
use crate::errors::{AppError, AppResult, DbResultExt};

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Category>>;

    async fn find_by_tag(&self, tag: &str) -> AppResult<Option<Category>>;

    /// Categories ordered by name, optionally only the active ones
    async fn list(&self, active_only: bool) -> AppResult<Vec<Category>>;

    async fn create(&self, category: Category) -> AppResult<Category>;

    /// Overwrite every column of an existing category
    async fn update(&self, category: Category) -> AppResult<Category>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// SeaORM implementation of CategoryRepository
pub struct CategoryStore {
    db: DatabaseConnection,
}

impl CategoryStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_active_model(category: Category) -> AppResult<ActiveModel> {
    let form_fields = serde_json::to_value(&category.form_fields)
        .map_err(|e| AppError::internal(format!("Form field serialization failed: {}", e)))?;

    Ok(ActiveModel {
        id: Set(category.id),
        name: Set(category.name),
        tag: Set(category.tag),
        active: Set(category.active),
        notification_email: Set(category.notification_email),
        form_fields: Set(form_fields),
        created_at: Set(category.created_at),
        updated_at: Set(category.updated_at),
    })
}

#[async_trait]
impl CategoryRepository for CategoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Category>> {
        let result = CategoryEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Category::from))
    }

    async fn find_by_tag(&self, tag: &str) -> AppResult<Option<Category>> {
        let result = CategoryEntity::find()
            .filter(category::Column::Tag.eq(tag))
            .one(&self.db)
            .await?;
        Ok(result.map(Category::from))
    }

    async fn list(&self, active_only: bool) -> AppResult<Vec<Category>> {
        let mut query = CategoryEntity::find().order_by_asc(category::Column::Name);
        if active_only {
            query = query.filter(category::Column::Active.eq(true));
        }

        let models = query.all(&self.db).await?;
        Ok(models.into_iter().map(Category::from).collect())
    }

    async fn create(&self, category: Category) -> AppResult<Category> {
        let model = to_active_model(category)?
            .insert(&self.db)
            .await
            .or_conflict("Category")?;
        Ok(Category::from(model))
    }

    async fn update(&self, category: Category) -> AppResult<Category> {
        // Primary key becomes the WHERE clause, every other column is rewritten
        let model = to_active_model(category)?
            .update(&self.db)
            .await
            .map_err(|e| match e {
                sea_orm::DbErr::RecordNotUpdated => AppError::NotFound,
                other => {
                    let violation = other.sql_err();
                    AppError::from_db(other, violation, "Category")
                }
            })?;
        Ok(Category::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = CategoryEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
