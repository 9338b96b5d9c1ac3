//! Log entry for a public form post.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who posted a form, recorded for abuse tracking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSubmission {
    pub id: Uuid,
    pub ip: String,
    pub user_agent: Option<String>,
    pub fingerprint: Option<String>,
    /// Form identifier, e.g. `contact`
    pub form: String,
    pub created_at: DateTime<Utc>,
}

/// Request metadata of the caller
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip: String,
    pub user_agent: Option<String>,
    pub fingerprint: Option<String>,
}

impl FormSubmission {
    pub fn new(client: &ClientInfo, form: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            ip: client.ip.clone(),
            user_agent: client.user_agent.clone(),
            fingerprint: client.fingerprint.clone(),
            form: form.into(),
            created_at: Utc::now(),
        }
    }
}
