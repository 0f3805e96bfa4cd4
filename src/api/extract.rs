//! Request extractors whose rejections use the application error body

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// JSON body; a malformed body is reported as `BadRequest`
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query string; missing or unparsable parameters are reported as `BadRequest`
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Path segment; a non-numeric id is reported as `BadRequest`
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);
