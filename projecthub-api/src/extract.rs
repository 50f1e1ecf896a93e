//! Request extractors that reject with [`ApiError`]
//!
//! Axum's own `Json` and `Path` rejections answer with plain-text bodies
//! and, for JSON, a 422 status. These wrappers run the same extractors but
//! turn any rejection into a JSON `400` through [`ApiError::BadRequest`].
//!
//! Handlers that must authorize the caller before looking at the body take
//! `Result<ApiJson<T>, ApiError>` and apply `?` once access is checked.

use crate::error::ApiError;
use axum::extract::{FromRequest, FromRequestParts};

/// JSON body
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path parameters
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);
