//! Middleware and extractors for the cart service.

pub mod auth;

pub use auth::RequireUser;
