//! Form submission log entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::FormSubmission;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "form_submissions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub ip: String,
    pub user_agent: Option<String>,
    pub fingerprint: Option<String>,
    pub form: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for FormSubmission {
    fn from(model: Model) -> Self {
        FormSubmission {
            id: model.id,
            ip: model.ip,
            user_agent: model.user_agent,
            fingerprint: model.fingerprint,
            form: model.form,
            created_at: model.created_at,
        }
    }
}
