//! Public contact form.

use std::collections::HashMap;

use axum::{extract::State, response::Json, routing::post, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::ClientInfo;
use crate::errors::AppResult;
use crate::services::ContactMessage;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ContactRequest {
    #[schema(example = "Jan Jansen")]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "jan@example.nl")]
    pub email: String,
    #[schema(example = "Ik wil graag meer weten over vermogensbeheer.")]
    pub message: String,
    /// Category tag; unknown tags are handled as general contact
    #[schema(example = "vermogensbeheer")]
    pub category: Option<String>,
    /// Values of the category's extra form fields
    #[serde(default)]
    pub fields: HashMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ContactResponse {
    #[schema(example = "Bedankt voor je bericht")]
    pub message: String,
    pub confirmation_sent: bool,
}

pub fn contact_routes() -> Router<AppState> {
    Router::new().route("/", post(submit_contact))
}

/// Submit the contact form
#[utoipa::path(
    post,
    path = "/api/contact",
    tag = "Contact",
    request_body = ContactRequest,
    responses(
        (status = 200, description = "Message delivered", body = ContactResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 429, description = "Too many submissions from this address"),
        (status = 500, description = "Notification could not be sent")
    )
)]
pub async fn submit_contact(
    State(state): State<AppState>,
    client: ClientInfo,
    ValidatedJson(payload): ValidatedJson<ContactRequest>,
) -> AppResult<Json<ContactResponse>> {
    let receipt = state
        .contact_service
        .submit(
            ContactMessage {
                name: payload.name,
                email: payload.email,
                message: payload.message,
                category: payload.category,
                fields: payload.fields,
            },
            client,
        )
        .await?;

    Ok(Json(ContactResponse {
        message: "Bedankt voor je bericht".to_string(),
        confirmation_sent: receipt.confirmation_sent,
    }))
}
