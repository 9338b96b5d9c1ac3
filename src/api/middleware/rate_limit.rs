//! Rate limiting middleware for the login and registration routes.

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};

use crate::api::extractors::client_ip;
use crate::api::AppState;
use crate::config::{RATE_LIMIT_AUTH_REQUESTS, RATE_LIMIT_AUTH_WINDOW_SECONDS};
use crate::errors::AppError;

/// Limits requests to RATE_LIMIT_AUTH_REQUESTS per RATE_LIMIT_AUTH_WINDOW_SECONDS
/// per client IP.
pub async fn rate_limit_auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let client_id = client_ip(request.headers(), request.extensions());
    let key = format!("auth:{}", client_id);

    let decision = match state
        .rate_limits
        .hit(&key, RATE_LIMIT_AUTH_REQUESTS, RATE_LIMIT_AUTH_WINDOW_SECONDS)
        .await
    {
        Ok(decision) => decision,
        Err(e) => {
            // Fail closed while the store is unavailable
            tracing::error!(error = %e, "Auth rate limit check failed - denying request");
            return Err(AppError::TooManyRequests {
                retry_after: RATE_LIMIT_AUTH_WINDOW_SECONDS,
            });
        }
    };

    if !decision.allowed {
        tracing::warn!(
            client = %client_id,
            count = decision.count,
            "Auth rate limit exceeded"
        );
        return Err(AppError::TooManyRequests {
            retry_after: decision.retry_after,
        });
    }

    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    headers.insert("X-RateLimit-Limit", HeaderValue::from(RATE_LIMIT_AUTH_REQUESTS));
    headers.insert("X-RateLimit-Remaining", HeaderValue::from(decision.remaining));

    Ok(response)
}
