//! Prickly Fig Core - shared cart types and pure state logic.
//!
//! This crate provides the cart domain used across all Prickly Fig
//! components:
//! - `cart` - Client-side cart runtime (store, persistence, remote sync)
//! - `server` - Remote cart HTTP service
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP clients. Reducing a cart, merging two carts, and
//! deriving user notices are all side-effect free, so every state rule can be
//! unit tested in isolation.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and the sync status
//! - [`cart`] - Line items and the aggregate cart state
//! - [`reducer`] - Cart actions and the pure reduction function
//! - [`merge`] - Remote/local cart reconciliation
//! - [`notice`] - User-facing notices derived from reductions

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod merge;
pub mod notice;
pub mod reducer;
pub mod types;

pub use cart::{CartItem, CartItemError, CartState};
pub use merge::merge_items;
pub use notice::{Notice, NoticeLevel, notice_for};
pub use reducer::{CartAction, CartDelta, ClearSource, reduce};
pub use types::*;
