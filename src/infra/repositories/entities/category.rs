//! Category database entity for SeaORM.
//!
//! Form fields are stored as a JSON array.

use sea_orm::entity::prelude::*;

use crate::domain::{Category, FormField};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub tag: String,
    pub active: bool,
    pub notification_email: Option<String>,
    pub form_fields: Json,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Category {
    fn from(model: Model) -> Self {
        let form_fields: Vec<FormField> = match serde_json::from_value(model.form_fields) {
            Ok(fields) => fields,
            Err(e) => {
                tracing::warn!(category = %model.tag, error = %e, "Ignoring malformed form fields");
                Vec::new()
            }
        };

        Category {
            id: model.id,
            name: model.name,
            tag: model.tag,
            active: model.active,
            notification_email: model.notification_email,
            form_fields,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
