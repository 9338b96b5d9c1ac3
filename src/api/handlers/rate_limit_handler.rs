//! Lets the website check a form's submission budget before posting it.

use axum::{extract::State, response::Json, routing::post, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::AppState;
use crate::domain::ClientInfo;
use crate::errors::{AppError, AppResult};

const DEFAULT_FORM: &str = "default";

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RateLimitRequest {
    /// Form identifier; each form has its own budget
    #[schema(example = "newsletter")]
    pub form: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RateLimitResponse {
    pub allowed: bool,
    pub remaining: u64,
    /// Seconds until the window resets, 0 while allowed
    pub retry_after: u64,
}

pub fn rate_limit_routes() -> Router<AppState> {
    Router::new().route("/", post(check_rate_limit))
}

fn form_key(form: Option<&str>, ip: &str) -> String {
    let form = form
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .unwrap_or(DEFAULT_FORM);
    format!("form:{}:{}", form, ip)
}

/// Count a form submission for the caller
#[utoipa::path(
    post,
    path = "/api/rate-limit",
    tag = "Rate limit",
    request_body(content = RateLimitRequest, description = "Optional form identifier"),
    responses(
        (status = 200, description = "Submission allowed", body = RateLimitResponse),
        (status = 429, description = "Limit reached, see Retry-After")
    )
)]
pub async fn check_rate_limit(
    State(state): State<AppState>,
    client: ClientInfo,
    payload: Option<Json<RateLimitRequest>>,
) -> AppResult<Json<RateLimitResponse>> {
    let request = payload.map(|Json(p)| p).unwrap_or_default();
    let key = form_key(request.form.as_deref(), &client.ip);

    let decision = state
        .rate_limits
        .hit(
            &key,
            state.config.rate_limit_requests,
            state.config.rate_limit_window_seconds,
        )
        .await?;

    if !decision.allowed {
        tracing::info!(client = %client.ip, key = %key, "Form rate limit reached");
        return Err(AppError::TooManyRequests {
            retry_after: decision.retry_after,
        });
    }

    Ok(Json(RateLimitResponse {
        allowed: decision.allowed,
        remaining: decision.remaining,
        retry_after: decision.retry_after,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_key_defaults() {
        assert_eq!(form_key(None, "1.2.3.4"), "form:default:1.2.3.4");
        assert_eq!(form_key(Some("  "), "1.2.3.4"), "form:default:1.2.3.4");
        assert_eq!(form_key(Some("newsletter"), "1.2.3.4"), "form:newsletter:1.2.3.4");
    }
}
