//! Cart line items and the state that aggregates them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ProductId;

/// Errors that can occur when validating a wire-supplied [`CartItem`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartItemError {
    /// The product id is an empty string.
    #[error("cart item id cannot be empty")]
    EmptyId,
    /// The display name is an empty string.
    #[error("cart item name cannot be empty")]
    EmptyName,
    /// The quantity is zero.
    #[error("cart item quantity must be at least 1")]
    ZeroQuantity,
    /// The unit price is zero or negative.
    #[error("cart item price must be positive")]
    NonPositivePrice,
}

/// A single line in a cart.
///
/// Prices are decimal amounts in the store currency and serialize as plain
/// JSON numbers, matching the wire shape the storefront and the cart service
/// exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Product identifier; unique within a cart.
    pub id: ProductId,
    /// Display name captured when the item was added.
    pub name: String,
    /// Unit price in the store currency.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Number of units; at least 1 in any stored cart.
    pub quantity: u32,
}

impl CartItem {
    /// Create a new cart line.
    #[must_use]
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        price: Decimal,
        quantity: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            quantity,
        }
    }

    /// Validate an item received over the wire.
    ///
    /// ## Constraints
    ///
    /// - `id` and `name` must be non-empty
    /// - `quantity` must be at least 1
    /// - `price` must be positive
    ///
    /// # Errors
    ///
    /// Returns the first [`CartItemError`] the item violates, checked in the
    /// order listed above.
    pub fn validate(&self) -> Result<(), CartItemError> {
        if self.id.as_str().is_empty() {
            return Err(CartItemError::EmptyId);
        }

        if self.name.is_empty() {
            return Err(CartItemError::EmptyName);
        }

        if self.quantity == 0 {
            return Err(CartItemError::ZeroQuantity);
        }

        if self.price <= Decimal::ZERO {
            return Err(CartItemError::NonPositivePrice);
        }

        Ok(())
    }
}

/// Aggregate cart state: ordered line items plus the running unit count.
///
/// `size` is always derived from `items`, never adjusted incrementally, so it
/// cannot drift from the list it summarizes. For the same reason a `size`
/// found in persisted or wire data is ignored on load and rederived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "StoredCart")]
pub struct CartState {
    items: Vec<CartItem>,
    size: u32,
}

impl CartState {
    /// Build a state from a list of items, deriving `size` as the quantity
    /// sum.
    #[must_use]
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let size = items.iter().map(|item| item.quantity).sum();
        Self { items, size }
    }

    /// The line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Total number of units across all lines.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Whether the cart holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consume the state, returning its items.
    #[must_use]
    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }
}

/// Persisted/wire shape of a cart state.
///
/// Accepts the historical `{ "items": [...], "size": n }` layout but drops
/// the stored `size` on the floor; [`CartState::from_items`] rederives it.
#[derive(Deserialize)]
struct StoredCart {
    #[serde(default)]
    items: Vec<CartItem>,
}

impl From<StoredCart> for CartState {
    fn from(stored: StoredCart) -> Self {
        Self::from_items(stored.items)
    }
}
