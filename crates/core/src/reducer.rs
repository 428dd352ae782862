//! Cart actions and the pure reduction function.
//!
//! Reducing never performs I/O and never emits notifications; it returns the
//! next state together with a [`CartDelta`] describing what actually changed,
//! so callers can persist, sync, and notify as separate steps.

use serde::{Deserialize, Serialize};

use crate::cart::{CartItem, CartState};
use crate::types::ProductId;

/// Why a cart was cleared.
///
/// Clearing resets the state identically in every case; the source only
/// decides whether the user sees a notice for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearSource {
    /// The user emptied the cart themselves.
    User,
    /// An order was placed; the cart empties silently.
    PlaceOrder,
    /// The user signed out; the cart empties silently.
    SignOut,
}

/// A state transition request for the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CartAction {
    /// Add an item, or bump the quantity of the line that already holds its
    /// id. A zero quantity counts as 1.
    AddItem {
        /// The item to add.
        item: CartItem,
    },
    /// Take one unit off a line, dropping the line when it reaches zero.
    RemoveItem {
        /// Product id of the line to decrement.
        id: ProductId,
        /// Display name, carried for the user notice.
        name: String,
    },
    /// Empty the cart.
    ClearCart {
        /// What triggered the clear.
        source: ClearSource,
    },
    /// Replace the item list wholesale (merge results, remote loads).
    SetItems {
        /// The replacement items.
        items: Vec<CartItem>,
    },
}

impl CartAction {
    /// Stable variant name, for log fields.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::AddItem { .. } => "add_item",
            Self::RemoveItem { .. } => "remove_item",
            Self::ClearCart { .. } => "clear_cart",
            Self::SetItems { .. } => "set_items",
        }
    }
}

/// What a reduction actually did to the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartDelta {
    /// An item was added or its line quantity bumped; `quantity` is the new
    /// line total.
    Added { id: ProductId, quantity: u32 },
    /// A line lost one unit and `remaining` units are left.
    Decremented { id: ProductId, remaining: u32 },
    /// A line was removed outright.
    Removed { id: ProductId },
    /// A removal targeted an id the cart does not hold; the state is
    /// unchanged.
    Missing { id: ProductId },
    /// The cart was emptied.
    Cleared { source: ClearSource },
    /// The item list was replaced; `size` is the new unit count.
    Replaced { size: u32 },
}

/// Apply `action` to `state`, returning the next state and the delta.
///
/// Pure: the input state is never mutated, and `size` in the returned state
/// is rederived from its items on every transition.
#[must_use]
pub fn reduce(state: &CartState, action: &CartAction) -> (CartState, CartDelta) {
    match action {
        CartAction::AddItem { item } => add_item(state, item),
        CartAction::RemoveItem { id, .. } => remove_item(state, id),
        CartAction::ClearCart { source } => (
            CartState::default(),
            CartDelta::Cleared { source: *source },
        ),
        CartAction::SetItems { items } => {
            let next = CartState::from_items(items.clone());
            let size = next.size();
            (next, CartDelta::Replaced { size })
        }
    }
}

fn add_item(state: &CartState, item: &CartItem) -> (CartState, CartDelta) {
    // The web client historically sent quantity 0 for "unspecified".
    let added = item.quantity.max(1);
    let mut items = state.items().to_vec();

    let quantity = if let Some(line) = items.iter_mut().find(|line| line.id == item.id) {
        line.quantity += added;
        line.quantity
    } else {
        let mut line = item.clone();
        line.quantity = added;
        items.push(line);
        added
    };

    let delta = CartDelta::Added {
        id: item.id.clone(),
        quantity,
    };
    (CartState::from_items(items), delta)
}

fn remove_item(state: &CartState, id: &ProductId) -> (CartState, CartDelta) {
    let mut items = state.items().to_vec();

    let Some(pos) = items.iter().position(|line| line.id == *id) else {
        return (state.clone(), CartDelta::Missing { id: id.clone() });
    };

    let remaining = items.get_mut(pos).map_or(0, |line| {
        line.quantity -= 1;
        line.quantity
    });

    let delta = if remaining == 0 {
        items.remove(pos);
        CartDelta::Removed { id: id.clone() }
    } else {
        CartDelta::Decremented {
            id: id.clone(),
            remaining,
        }
    };
    (CartState::from_items(items), delta)
}
