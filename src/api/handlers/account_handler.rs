//! Staff account handlers.

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::user_handler::LoginRequest;
use crate::api::extractors::{not_blank, ValidatedJson};
use crate::api::middleware::{require_account, require_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::{AccountResponse, AccountRole, NewAccount};
use crate::errors::AppResult;
use crate::services::TokenResponse;

/// New staff account
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAccountRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "redactie@bitbeheer.nl")]
    pub email: String,
    #[validate(custom(function = "not_blank", message = "Name is required"))]
    #[schema(example = "Redactie")]
    pub name: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(min_length = 8)]
    pub password: String,
    pub role: AccountRole,
}

pub fn account_routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

pub fn account_protected_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_accounts).post(create_account))
        .route("/me", get(get_current_account))
}

/// Log in as staff account
#[utoipa::path(
    post,
    path = "/api/accounts/login",
    tag = "Accounts",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials"),
        (status = 429, description = "Too many attempts")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let token = state
        .auth_service
        .login_account(payload.email, payload.password)
        .await?;

    Ok(Json(token))
}

/// Current staff account
#[utoipa::path(
    get,
    path = "/api/accounts/me",
    tag = "Accounts",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current account", body = AccountResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Token does not belong to an account")
    )
)]
pub async fn get_current_account(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<AccountResponse>> {
    require_account(&current_user)?;
    let account = state.account_service.get_account(current_user.id).await?;
    Ok(Json(AccountResponse::from(account)))
}

/// List staff accounts (admin)
#[utoipa::path(
    get,
    path = "/api/accounts",
    tag = "Accounts",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All accounts", body = [AccountResponse]),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Admin account required")
    )
)]
pub async fn list_accounts(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<AccountResponse>>> {
    require_admin(&current_user)?;

    let accounts = state.account_service.list_accounts().await?;
    Ok(Json(accounts.into_iter().map(AccountResponse::from).collect()))
}

/// Create a staff account (admin)
#[utoipa::path(
    post,
    path = "/api/accounts",
    tag = "Accounts",
    request_body = CreateAccountRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Account created", body = AccountResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Admin account required"),
        (status = 409, description = "Email already in use")
    )
)]
pub async fn create_account(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateAccountRequest>,
) -> AppResult<(StatusCode, Json<AccountResponse>)> {
    require_admin(&current_user)?;

    let account = state
        .account_service
        .create_account(NewAccount {
            email: payload.email,
            password: payload.password,
            name: payload.name,
            role: payload.role,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(AccountResponse::from(account))))
}
