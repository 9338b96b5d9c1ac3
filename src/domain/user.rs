//! Website user entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Person registered through the public website
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    /// Tag of the category the user signed up under
    pub category: Option<String>,
    pub login_count: i32,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: String, password_hash: String, name: String, category: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            name,
            category,
            login_count: 0,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record a successful login
    pub fn record_login(&mut self) {
        let now = Utc::now();
        self.login_count = self.login_count.saturating_add(1);
        self.last_login_at = Some(now);
        self.updated_at = now;
    }
}

/// Data needed to register a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub name: String,
    pub category: Option<String>,
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    #[schema(example = "klant@example.com")]
    pub email: String,
    #[schema(example = "Jan Jansen")]
    pub name: String,
    #[schema(example = "vermogensbeheer")]
    pub category: Option<String>,
    pub login_count: i32,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            category: user.category,
            login_count: user.login_count,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_login_increments_counter() {
        let mut user = User::new(
            "klant@example.com".to_string(),
            "hash".to_string(),
            "Klant".to_string(),
            None,
        );
        assert_eq!(user.login_count, 0);
        assert!(user.last_login_at.is_none());

        user.record_login();
        user.record_login();

        assert_eq!(user.login_count, 2);
        assert!(user.last_login_at.is_some());
    }

    #[test]
    fn test_response_hides_password_hash() {
        let user = User::new(
            "klant@example.com".to_string(),
            "secret-hash".to_string(),
            "Klant".to_string(),
            Some("starter".to_string()),
        );
        let json = serde_json::to_string(&UserResponse::from(user)).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("starter"));
    }
}
