//! Validated JSON extractor - Combines deserialization with validation.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError};

use crate::errors::AppError;

/// JSON body that has passed `validator` checks.
///
/// Malformed bodies, missing fields and failed validations all become a
/// 400 with the `VALIDATION_ERROR` code.
///
/// ```rust,ignore
/// #[derive(Deserialize, Validate)]
/// struct ContactRequest {
///     #[validate(email)]
///     email: String,
///     #[validate(length(min = 1))]
///     message: String,
/// }
///
/// async fn contact(ValidatedJson(payload): ValidatedJson<ContactRequest>) { /* ... */ }
/// ```
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(AppError::from)?;

        value
            .validate()
            .map_err(|e| AppError::validation(format_validation_errors(&e)))?;

        Ok(ValidatedJson(value))
    }
}

/// Custom `validator` rule: the value must hold more than whitespace.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Messages of every failed field, sorted by field name
fn format_validation_errors(errors: &validator::ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::header::CONTENT_TYPE};
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, Validate)]
    struct ContactForm {
        #[validate(email(message = "Invalid email format"))]
        email: String,
        #[validate(custom(function = "not_blank", message = "Message is required"))]
        message: String,
    }

    async fn extract(body: &'static str) -> Result<ContactForm, AppError> {
        let request = Request::builder()
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();
        ValidatedJson::<ContactForm>::from_request(request, &())
            .await
            .map(|ValidatedJson(p)| p)
    }

    #[tokio::test]
    async fn test_valid_body_passes() {
        let form = extract(r#"{"email":"a@b.nl","message":"hoi"}"#).await.unwrap();
        assert_eq!(form.message, "hoi");
    }

    #[tokio::test]
    async fn test_missing_field_is_validation_error() {
        let err = extract(r#"{"email":"a@b.nl"}"#).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_whitespace_only_is_blank() {
        let err = extract(r#"{"email":"a@b.nl","message":"  \n "}"#).await.unwrap_err();
        assert_eq!(err.to_string(), "Message is required");
    }

    #[tokio::test]
    async fn test_failed_rules_are_listed() {
        let err = extract(r#"{"email":"nope","message":""}"#).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid email format, Message is required");
    }
}
