//! JWT authentication middleware.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::api::AppState;
use crate::config::{BEARER_TOKEN_PREFIX, ROLE_ADMIN};
use crate::errors::AppError;
use crate::services::PrincipalKind;

/// Authenticated principal extracted from the JWT token
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub kind: PrincipalKind,
}

impl CurrentUser {
    pub fn is_account(&self) -> bool {
        self.kind == PrincipalKind::Account
    }

    /// Staff account with the admin role
    pub fn is_admin(&self) -> bool {
        self.is_account() && self.role == ROLE_ADMIN
    }
}

/// Extracts and validates the bearer token, then injects [`CurrentUser`]
/// into the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = auth_header
        .strip_prefix(BEARER_TOKEN_PREFIX)
        .ok_or(AppError::Unauthorized)?;

    let claims = state.auth_service.verify_token(token)?;

    request.extensions_mut().insert(CurrentUser {
        id: claims.sub,
        email: claims.email,
        role: claims.role,
        kind: claims.kind,
    });

    Ok(next.run(request).await)
}

/// Require a staff account with the admin role.
pub fn require_admin(user: &CurrentUser) -> Result<(), AppError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// Require any staff account.
pub fn require_account(user: &CurrentUser) -> Result<(), AppError> {
    if user.is_account() {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// Require a website user token.
pub fn require_user(user: &CurrentUser) -> Result<(), AppError> {
    if user.kind == PrincipalKind::User {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}
