//! Core types for Prickly Fig.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod status;

pub use id::{ProductId, UserId};
pub use status::SyncStatus;
