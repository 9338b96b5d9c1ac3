//! Category CRUD handlers.

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use serde::{Deserialize, Deserializer};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidateEmail};

use crate::api::extractors::{not_blank, Path, Query, ValidatedJson};
use crate::api::middleware::{require_account, require_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::{Category, CategoryChanges, FormField, NewCategory};
use crate::errors::{AppError, AppResult};
use crate::types::NoContent;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CategoryFilter {
    /// Only return active categories
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryRequest {
    #[validate(custom(function = "not_blank", message = "Name is required"))]
    #[schema(example = "Vermogensbeheer")]
    pub name: String,
    #[validate(length(min = 1, max = 64, message = "Tag is required"))]
    #[schema(example = "vermogensbeheer")]
    pub tag: String,
    /// Defaults to true
    pub active: Option<bool>,
    /// Blank is stored as no address
    pub notification_email: Option<String>,
    #[serde(default)]
    pub form_fields: Vec<FormField>,
}

/// Partial update; omitted fields are left unchanged
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryRequest {
    #[validate(custom(function = "not_blank", message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 64, message = "Tag cannot be empty"))]
    pub tag: Option<String>,
    pub active: Option<bool>,
    /// `null` removes the address
    #[serde(default, deserialize_with = "present_or_null")]
    #[schema(value_type = Option<String>)]
    pub notification_email: Option<Option<String>>,
    pub form_fields: Option<Vec<FormField>>,
}

/// A blank notification address is allowed and clears the field.
fn check_notification_email(email: Option<&str>) -> AppResult<()> {
    match email {
        Some(email) if !email.trim().is_empty() && !email.trim().validate_email() => {
            Err(AppError::validation("Invalid notification email"))
        }
        _ => Ok(()),
    }
}

/// Tells an explicit `null` (`Some(None)`) apart from an absent field (`None`).
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories))
        .route("/:id", get(get_category))
}

pub fn category_protected_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_category))
        .route("/:id", axum::routing::put(update_category).delete(delete_category))
}

/// List categories
#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "Categories",
    params(CategoryFilter),
    responses((status = 200, description = "Categories", body = [Category]))
)]
pub async fn list_categories(
    State(state): State<AppState>,
    Query(filter): Query<CategoryFilter>,
) -> AppResult<Json<Vec<Category>>> {
    let categories = state
        .category_service
        .list_categories(filter.active.unwrap_or(false))
        .await?;
    Ok(Json(categories))
}

/// Get one category
#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    tag = "Categories",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category", body = Category),
        (status = 404, description = "Category not found")
    )
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Category>> {
    Ok(Json(state.category_service.get_category(id).await?))
}

/// Create a category (staff)
#[utoipa::path(
    post,
    path = "/api/categories",
    tag = "Categories",
    request_body = CreateCategoryRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, description = "Missing or invalid fields"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Staff account required"),
        (status = 409, description = "Tag already in use")
    )
)]
pub async fn create_category(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateCategoryRequest>,
) -> AppResult<(StatusCode, Json<Category>)> {
    require_account(&current_user)?;
    check_notification_email(payload.notification_email.as_deref())?;

    let category = state
        .category_service
        .create_category(NewCategory {
            name: payload.name,
            tag: payload.tag,
            active: payload.active.unwrap_or(true),
            notification_email: payload.notification_email,
            form_fields: payload.form_fields,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(category)))
}

/// Update a category (staff)
#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    tag = "Categories",
    params(("id" = Uuid, Path, description = "Category id")),
    request_body = UpdateCategoryRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Category updated", body = Category),
        (status = 400, description = "Invalid fields"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Staff account required"),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Tag already in use")
    )
)]
pub async fn update_category(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateCategoryRequest>,
) -> AppResult<Json<Category>> {
    require_account(&current_user)?;

    check_notification_email(
        payload
            .notification_email
            .as_ref()
            .and_then(|email| email.as_deref()),
    )?;

    let category = state
        .category_service
        .update_category(
            id,
            CategoryChanges {
                name: payload.name,
                tag: payload.tag,
                active: payload.active,
                notification_email: payload.notification_email,
                form_fields: payload.form_fields,
            },
        )
        .await?;

    Ok(Json(category))
}

/// Delete a category (admin)
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    tag = "Categories",
    params(("id" = Uuid, Path, description = "Category id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Admin account required"),
        (status = 404, description = "Category not found")
    )
)]
pub async fn delete_category(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    require_admin(&current_user)?;
    state.category_service.delete_category(id).await?;
    Ok(NoContent)
}
