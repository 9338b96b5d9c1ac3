//! Read-only access to the built-in email templates.

use std::collections::HashMap;

use axum::{
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::{Path, ValidatedJson};
use crate::api::middleware::{require_account, CurrentUser};
use crate::api::AppState;
use crate::errors::{AppResult, OptionExt};
use crate::infra::mail::templates::{self, EmailTemplate, RenderedEmail};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TemplateSummary {
    #[schema(example = "welcome")]
    pub name: String,
    pub subject: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TemplateResponse {
    pub name: String,
    pub subject: String,
    pub body: String,
    /// Variables the template expects
    pub placeholders: Vec<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct PreviewRequest {
    #[serde(default)]
    pub vars: HashMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PreviewResponse {
    pub subject: String,
    pub body: String,
}

impl From<&EmailTemplate> for TemplateResponse {
    fn from(template: &EmailTemplate) -> Self {
        Self {
            name: template.name.to_string(),
            subject: template.subject.to_string(),
            body: template.body.to_string(),
            placeholders: template.placeholders(),
        }
    }
}

impl From<RenderedEmail> for PreviewResponse {
    fn from(rendered: RenderedEmail) -> Self {
        Self {
            subject: rendered.subject,
            body: rendered.body,
        }
    }
}

pub fn template_protected_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_templates))
        .route("/:name", get(get_template))
        .route("/:name/preview", post(preview_template))
}

/// List email templates (staff)
#[utoipa::path(
    get,
    path = "/api/email-templates",
    tag = "Email templates",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Templates", body = [TemplateSummary]),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Staff account required")
    )
)]
pub async fn list_templates(
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<TemplateSummary>>> {
    require_account(&current_user)?;

    let summaries = templates::all()
        .iter()
        .map(|t| TemplateSummary {
            name: t.name.to_string(),
            subject: t.subject.to_string(),
        })
        .collect();
    Ok(Json(summaries))
}

/// Get one email template (staff)
#[utoipa::path(
    get,
    path = "/api/email-templates/{name}",
    tag = "Email templates",
    params(("name" = String, Path, description = "Template name")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Template", body = TemplateResponse),
        (status = 404, description = "Unknown template")
    )
)]
pub async fn get_template(
    Extension(current_user): Extension<CurrentUser>,
    Path(name): Path<String>,
) -> AppResult<Json<TemplateResponse>> {
    require_account(&current_user)?;
    let template = templates::find(&name).ok_or_not_found()?;
    Ok(Json(template.into()))
}

/// Render a template with sample variables (staff)
#[utoipa::path(
    post,
    path = "/api/email-templates/{name}/preview",
    tag = "Email templates",
    params(("name" = String, Path, description = "Template name")),
    request_body = PreviewRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Rendered email", body = PreviewResponse),
        (status = 400, description = "Malformed body"),
        (status = 404, description = "Unknown template")
    )
)]
pub async fn preview_template(
    Extension(current_user): Extension<CurrentUser>,
    Path(name): Path<String>,
    ValidatedJson(payload): ValidatedJson<PreviewRequest>,
) -> AppResult<Json<PreviewResponse>> {
    require_account(&current_user)?;
    let rendered = templates::render(&name, &payload.vars)?;
    Ok(Json(rendered.into()))
}
