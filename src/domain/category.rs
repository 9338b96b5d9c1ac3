//! Service categories shown on the website and the forms attached to them.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

static TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid tag pattern"));

/// Input widget of a dynamic form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    Email,
    Phone,
    Number,
    Textarea,
    Checkbox,
}

/// One field of the form attached to a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FormField {
    #[schema(example = "budget")]
    pub name: String,
    #[schema(example = "Budget in euro")]
    pub label: String,
    #[serde(default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
}

/// Category entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    #[schema(example = "Vermogensbeheer")]
    pub name: String,
    #[schema(example = "vermogensbeheer")]
    pub tag: String,
    pub active: bool,
    /// Mailbox notified about contact requests in this category
    #[schema(example = "advies@bitbeheer.nl")]
    pub notification_email: Option<String>,
    pub form_fields: Vec<FormField>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// Mailbox for contact notifications, if this category routes its own mail.
    pub fn notification_target(&self) -> Option<&str> {
        if !self.active {
            return None;
        }
        self.notification_email
            .as_deref()
            .filter(|email| !email.trim().is_empty())
    }

    /// Names of required form fields missing from `values`.
    pub fn missing_fields<'a>(
        &'a self,
        values: &std::collections::HashMap<String, String>,
    ) -> Vec<&'a str> {
        self.form_fields
            .iter()
            .filter(|field| field.required)
            .filter(|field| {
                values
                    .get(&field.name)
                    .map(|v| v.trim().is_empty())
                    .unwrap_or(true)
            })
            .map(|field| field.name.as_str())
            .collect()
    }
}

/// Data needed to create a category
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub tag: String,
    pub active: bool,
    pub notification_email: Option<String>,
    pub form_fields: Vec<FormField>,
}

/// Partial update of a category; `None` leaves the field unchanged
#[derive(Debug, Clone, Default)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub tag: Option<String>,
    pub active: Option<bool>,
    /// `Some(None)` clears the notification address
    pub notification_email: Option<Option<String>>,
    pub form_fields: Option<Vec<FormField>>,
}

/// Tags are lowercase slugs used in URLs and on user records.
pub fn validate_tag(tag: &str) -> AppResult<()> {
    if TAG_PATTERN.is_match(tag) {
        Ok(())
    } else {
        Err(AppError::validation(
            "Tag may only contain lowercase letters, digits and single dashes",
        ))
    }
}

/// Field names must be unique within one form.
pub fn validate_form_fields(fields: &[FormField]) -> AppResult<()> {
    let mut seen = std::collections::HashSet::new();
    for field in fields {
        if field.name.trim().is_empty() {
            return Err(AppError::validation("Form field name is required"));
        }
        if !seen.insert(field.name.as_str()) {
            return Err(AppError::validation(format!(
                "Duplicate form field: {}",
                field.name
            )));
        }
    }
    Ok(())
}
