//! Path and query extractors whose rejections use the JSON error body.

use axum::extract::FromRequestParts;

use crate::errors::AppError;

/// `axum::extract::Query` that fails with `AppError::BadRequest`
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct Query<T>(pub T);

/// `axum::extract::Path` that fails with `AppError::BadRequest`
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct Path<T>(pub T);
