//! Authentication extractor.
//!
//! Provides an extractor for requiring bearer-token authentication in route
//! handlers. Tokens are opaque and resolved against the `api_tokens` table.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use prickly_fig_core::UserId;

use crate::error::{self, AppError};
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// Rejects with `401 Unauthorized` when the header is missing, malformed, or
/// names a token the service does not know.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireUser(user_id): RequireUser,
/// ) -> impl IntoResponse {
///     format!("cart owner: {user_id}")
/// }
/// ```
pub struct RequireUser(pub UserId);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_string()))?;

        let user_id = state
            .tokens()
            .user_for_token(token)
            .await?
            .ok_or_else(|| AppError::Unauthorized("invalid access token".to_string()))?;

        // Associate any downstream errors with the authenticated user
        error::set_sentry_user(&user_id);

        Ok(Self(user_id))
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() { None } else { Some(token) }
}
