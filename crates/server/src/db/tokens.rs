//! Token repository for bearer-token lookups.

use prickly_fig_core::UserId;
use sqlx::PgPool;

use super::RepositoryError;

/// Repository for API token lookups.
///
/// Tokens are opaque strings issued out of band (seeded via the CLI in
/// development); the service only maps them to user ids.
pub struct TokenRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TokenRepository<'a> {
    /// Create a new token repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Resolve a bearer token to the user it belongs to.
    ///
    /// Returns `None` for unknown or revoked tokens.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn user_for_token(&self, token: &str) -> Result<Option<UserId>, RepositoryError> {
        let user_id = sqlx::query_scalar::<_, UserId>(
            "SELECT user_id FROM api_tokens WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await?;

        Ok(user_id)
    }
}
