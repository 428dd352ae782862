//! Seed the database with a demo API token.
//!
//! The cart API authenticates requests by looking bearer tokens up in the
//! `api_tokens` table. This command inserts a token for a new or existing
//! user so the API can be exercised without a real identity provider.

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use prickly_fig_core::types::UserId;

/// Insert an API token row and report the credentials.
///
/// # Arguments
///
/// * `user_id` - User id to attach the token to; random when absent
/// * `token` - Token value to insert; random when absent
///
/// # Errors
///
/// Returns an error if environment variables are missing, the user id does
/// not parse as a UUID, or the insert fails.
pub async fn token(
    user_id: Option<&str>,
    token: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let database_url = std::env::var("CART_API_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "CART_API_DATABASE_URL not set")?;

    let user_id = match user_id {
        Some(raw) => UserId::new(Uuid::parse_str(raw)?),
        None => UserId::random(),
    };
    let token = match token {
        Some(value) => value.to_owned(),
        None => Uuid::new_v4().simple().to_string(),
    };

    // Connect to database
    let pool = PgPool::connect(database_url.expose_secret()).await?;
    info!("Connected to database");

    sqlx::query("INSERT INTO api_tokens (token, user_id) VALUES ($1, $2)")
        .bind(&token)
        .bind(user_id)
        .execute(&pool)
        .await?;

    info!("Token seeded!");
    info!("  User id: {user_id}");
    info!("  Authorization: Bearer {token}");

    Ok(())
}
