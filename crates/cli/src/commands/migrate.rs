//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! pfig-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `CART_API_DATABASE_URL` - `PostgreSQL` connection string for the cart API
//! - `DATABASE_URL` - Fallback connection string
//!
//! Migration files live in `crates/server/migrations/` and are embedded into
//! the binary at compile time, so the command runs without a source checkout.

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use tracing::info;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../server/migrations");

/// Run cart database migrations.
///
/// # Errors
///
/// Returns an error if no database url is configured, the connection fails,
/// or a migration fails to apply.
pub async fn run() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = database_url()?;

    info!("Connecting to cart database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    info!("Running cart migrations...");
    MIGRATOR.run(&pool).await?;

    info!("Cart migrations complete!");
    Ok(())
}

fn database_url() -> Result<SecretString, MigrationError> {
    std::env::var("CART_API_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MigrationError::MissingEnvVar("CART_API_DATABASE_URL"))
}

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}
