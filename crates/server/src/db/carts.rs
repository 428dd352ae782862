//! Cart repository for database operations.
//!
//! One `carts` row per user. The item list is stored as a JSONB document and
//! replaced wholesale on every push; the service never edits individual
//! lines, so last write wins by construction.

use prickly_fig_core::{CartItem, UserId};
use sqlx::PgPool;

use super::RepositoryError;

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the stored items for a user.
    ///
    /// Returns `None` if the user has never pushed a cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored JSONB does not
    /// decode as a cart item list.
    pub async fn get(&self, user_id: UserId) -> Result<Option<Vec<CartItem>>, RepositoryError> {
        let row = sqlx::query_scalar::<_, serde_json::Value>(
            "SELECT items FROM carts WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(items_from_value).transpose()
    }

    /// Overwrite the stored items for a user (upsert, last write wins).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    /// Returns `RepositoryError::DataCorruption` if the items cannot be
    /// encoded as JSON.
    pub async fn replace(
        &self,
        user_id: UserId,
        items: &[CartItem],
    ) -> Result<(), RepositoryError> {
        let document = serde_json::to_value(items).map_err(|e| {
            RepositoryError::DataCorruption(format!("failed to encode cart items: {e}"))
        })?;

        sqlx::query(
            "INSERT INTO carts (user_id, items) \
             VALUES ($1, $2) \
             ON CONFLICT (user_id) DO UPDATE SET \
                 items      = EXCLUDED.items, \
                 updated_at = NOW()",
        )
        .bind(user_id)
        .bind(document)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}

/// Decode a stored JSONB document into cart items.
fn items_from_value(value: serde_json::Value) -> Result<Vec<CartItem>, RepositoryError> {
    serde_json::from_value(value)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid cart items in database: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_items_from_value_decodes_stored_cart() {
        let value = serde_json::json!([
            { "id": "fig-jam", "name": "Fig Jam", "price": 12.5, "quantity": 2 }
        ]);

        let items = items_from_value(value).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id.as_str(), "fig-jam");
        assert_eq!(items[0].price, Decimal::new(125, 1));
        assert_eq!(items[0].quantity, 2);
    }

    #[test]
    fn test_items_from_value_rejects_wrong_shape() {
        let value = serde_json::json!({ "items": [] });

        let err = items_from_value(value).unwrap_err();
        assert!(matches!(err, RepositoryError::DataCorruption(_)));
    }

    #[test]
    fn test_items_round_trip_through_document() {
        let items = vec![CartItem::new("fig-soap", "Fig Leaf Soap", Decimal::new(425, 2), 1)];

        let document = serde_json::to_value(&items).unwrap();
        let decoded = items_from_value(document).unwrap();
        assert_eq!(decoded, items);
    }
}
