//! Remote/local cart reconciliation.

use crate::cart::CartItem;

/// Merge the remote copy of a cart into the local one.
///
/// The output holds every id from either input exactly once:
///
/// - an id present in both keeps the local item's name, price, and position,
///   with the remote quantity added on;
/// - a one-sided id is carried through unchanged;
/// - local items come first in their original order, then remote-only items
///   in theirs.
///
/// Seeding with the local list is what makes local fields win ties; the
/// remote contributes quantities and items the device has not seen.
#[must_use]
pub fn merge_items(remote: &[CartItem], local: &[CartItem]) -> Vec<CartItem> {
    let mut merged = local.to_vec();

    for item in remote {
        if let Some(line) = merged.iter_mut().find(|line| line.id == item.id) {
            line.quantity += item.quantity;
        } else {
            merged.push(item.clone());
        }
    }

    merged
}
