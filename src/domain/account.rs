//! Staff account entity used for the admin side of the site.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{ROLE_ADMIN, ROLE_EDITOR};

/// Staff roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    Editor,
    Admin,
}

impl AccountRole {
    pub fn is_admin(&self) -> bool {
        matches!(self, AccountRole::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountRole::Admin => ROLE_ADMIN,
            AccountRole::Editor => ROLE_EDITOR,
        }
    }
}

impl From<&str> for AccountRole {
    fn from(s: &str) -> Self {
        match s {
            ROLE_ADMIN => AccountRole::Admin,
            _ => AccountRole::Editor,
        }
    }
}

impl std::fmt::Display for AccountRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Staff account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub role: AccountRole,
    pub login_count: i32,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn new(email: String, password_hash: String, name: String, role: AccountRole) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            name,
            role,
            login_count: 0,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn record_login(&mut self) {
        let now = Utc::now();
        self.login_count = self.login_count.saturating_add(1);
        self.last_login_at = Some(now);
        self.updated_at = now;
    }
}

/// Data needed to create a staff account
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: AccountRole,
}

/// Account response (safe to return to client)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccountResponse {
    pub id: Uuid,
    #[schema(example = "beheer@bitbeheer.nl")]
    pub email: String,
    pub name: String,
    pub role: AccountRole,
    pub login_count: i32,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            name: account.name,
            role: account.role,
            login_count: account.login_count,
            last_login_at: account.last_login_at,
            created_at: account.created_at,
        }
    }
}
