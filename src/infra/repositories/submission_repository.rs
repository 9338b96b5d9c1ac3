//! Form submission log repository.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

use super::entities::form_submission::ActiveModel;
use crate::domain::FormSubmission;
use crate::errors::AppResult;

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    async fn record(&self, submission: FormSubmission) -> AppResult<()>;
}

/// SeaORM implementation of SubmissionRepository
pub struct SubmissionStore {
    db: DatabaseConnection,
}

impl SubmissionStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SubmissionRepository for SubmissionStore {
    async fn record(&self, submission: FormSubmission) -> AppResult<()> {
        ActiveModel {
            id: Set(submission.id),
            ip: Set(submission.ip),
            user_agent: Set(submission.user_agent),
            fingerprint: Set(submission.fingerprint),
            form: Set(submission.form),
            created_at: Set(submission.created_at),
        }
        .insert(&self.db)
        .await?;
        Ok(())
    }
}
