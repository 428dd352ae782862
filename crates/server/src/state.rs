//! Shared handles every request needs: config, pool, repositories.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::CartApiConfig;
use crate::db::{CartRepository, TokenRepository};

/// Handle cloned into every request; the inner `Arc` keeps clones cheap.
///
/// Handlers reach the database through the repository accessors rather than
/// the raw pool, so the SQL stays inside `db`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: CartApiConfig,
    pool: PgPool,
}

impl AppState {
    #[must_use]
    pub fn new(config: CartApiConfig, pool: PgPool) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, pool }),
        }
    }

    /// The loaded service configuration.
    #[must_use]
    pub fn config(&self) -> &CartApiConfig {
        &self.inner.config
    }

    /// The raw connection pool, for checks that bypass the repositories.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Repository over the `carts` table.
    #[must_use]
    pub fn carts(&self) -> CartRepository<'_> {
        CartRepository::new(&self.inner.pool)
    }

    /// Repository over the `api_tokens` table.
    #[must_use]
    pub fn tokens(&self) -> TokenRepository<'_> {
        TokenRepository::new(&self.inner.pool)
    }

    /// Ping the database, for the readiness probe.
    pub async fn database_reachable(&self) -> bool {
        sqlx::query("SELECT 1")
            .fetch_one(&self.inner.pool)
            .await
            .is_ok()
    }
}
