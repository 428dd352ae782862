//! Prickly Fig Cart - the client-side cart runtime.
//!
//! Owns the single cart of a browsing session and everything around it:
//!
//! - [`store`] - the state container; all mutation goes through its
//!   dispatch, which persists and signals every change
//! - [`storage`] - the on-device slot the cart survives restarts in
//! - [`remote`] - the cart service client and the trait that seams it off
//! - [`auth`] - the session watch channel the application publishes into
//! - [`sync`] - sign-in merge, change pushes, and sign-out cleanup
//!
//! The state rules themselves (reducing, merging, notices) live in
//! `prickly-fig-core`; this crate is the I/O shell around them.
//!
//! # Wiring
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use prickly_fig_cart::auth;
//! use prickly_fig_cart::remote::HttpRemoteCart;
//! use prickly_fig_cart::storage::FileStorage;
//! use prickly_fig_cart::store::CartStore;
//! use prickly_fig_cart::sync::CartSyncService;
//!
//! # async fn wire() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = Arc::new(FileStorage::new("/var/lib/prickly-fig"));
//! let store = CartStore::load(storage).await;
//!
//! let remote = Arc::new(HttpRemoteCart::new("https://shop.example.com")?);
//! let (auth_handle, auth_watcher) = auth::channel();
//! let sync = CartSyncService::new(store.clone(), remote, auth_watcher);
//!
//! // After the application signs the user in:
//! auth_handle.sign_in(auth::AccessToken::new("bearer-token"));
//! sync.sync_on_sign_in().await;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod remote;
pub mod storage;
pub mod store;
pub mod sync;

pub use auth::{AccessToken, AuthHandle, AuthSession, AuthWatcher};
pub use remote::{HttpRemoteCart, RemoteCart, RemoteCartError};
pub use storage::{CART_KEY, CartStorage, FileStorage, MemoryStorage, StorageError};
pub use store::CartStore;
pub use sync::CartSyncService;
