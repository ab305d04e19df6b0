/// Request extractors
///
/// [`ApiJson`] is `axum::Json` with its rejection routed through
/// [`ApiError`], so a bad body gets the same `{error, message}` response as
/// every other failure instead of axum's plain-text rejection.

use axum::extract::FromRequest;

use crate::error::ApiError;

/// JSON request body
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
