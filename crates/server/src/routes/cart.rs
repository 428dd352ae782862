//! Cart route handlers.
//!
//! One stored cart per authenticated user. `GET` returns it, `PUT` replaces
//! it wholesale; clients reconcile before pushing, the service never merges.

use axum::{Json, extract::State};
use prickly_fig_core::{CartItem, CartState};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::state::AppState;

/// `PUT /api/cart` request body.
#[derive(Debug, Deserialize)]
pub struct UpdateCartBody {
    pub items: Option<Vec<CartItem>>,
}

/// Get the stored cart for the authenticated user.
///
/// Users who have never pushed a cart get an empty one, not a 404; the
/// client treats the remote copy as a cache to reconcile against.
#[instrument(skip_all, fields(user_id = %user_id))]
pub async fn show(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
) -> Result<Json<CartState>> {
    let items = state.carts().get(user_id).await?.unwrap_or_default();

    Ok(Json(CartState::from_items(items)))
}

/// Replace the stored cart for the authenticated user.
///
/// The body must carry the full item list; the previous row is overwritten
/// without comparison (last write wins). Responds with the stored cart so
/// clients see the same envelope as `GET`.
#[instrument(skip_all, fields(user_id = %user_id))]
pub async fn update(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Json(body): Json<UpdateCartBody>,
) -> Result<Json<CartState>> {
    let Some(items) = body.items else {
        return Err(AppError::BadRequest("items not provided".to_string()));
    };

    validate_items(&items)?;

    let cart = CartState::from_items(items);
    state.carts().replace(user_id, cart.items()).await?;

    Ok(Json(cart))
}

/// Reject item lists with incomplete entries before they reach storage.
fn validate_items(items: &[CartItem]) -> Result<()> {
    for item in items {
        item.validate().map_err(|e| {
            AppError::BadRequest(format!("cart item information is not complete: {e}"))
        })?;
    }
    Ok(())
}
