//! Remote reconciliation flows.
//!
//! Three flows, all best-effort and none fatal to the local cart:
//!
//! - **sign-in**: fetch the user's server cart, merge it into whatever the
//!   device holds, and set the result - the resulting change pushes the
//!   merged cart back out.
//! - **change push**: a single worker task watches dispatches and overwrites
//!   the server copy with the newest snapshot. One in-flight push at a time;
//!   a burst of dispatches collapses into pushes of the latest state.
//! - **sign-out**: clear the cart and the slot, unless a sticky sync error
//!   says the server may never have seen this cart - then keep everything.
//!
//! The application flips its [`auth channel`](crate::auth) before invoking
//! the sign-in/sign-out flows, so pushes triggered here observe the session
//! they belong to.

use std::sync::Arc;

use prickly_fig_core::{CartAction, ClearSource, Notice, SyncStatus, merge_items};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use crate::auth::{AccessToken, AuthSession, AuthWatcher};
use crate::remote::RemoteCart;
use crate::store::CartStore;

/// Notice shown when pushing the cart to the service fails.
const PUSH_FAILED_NOTICE: &str = "Failed to sync cart with backend";
/// Notice shown when the sign-in fetch fails.
const FETCH_FAILED_NOTICE: &str = "Failed to load cart from backend";

/// Owns the push worker and exposes the sign-in/sign-out flows.
///
/// Dropping the service aborts the worker; the store itself keeps working
/// locally.
pub struct CartSyncService {
    store: CartStore,
    remote: Arc<dyn RemoteCart>,
    auth: AuthWatcher,
    worker: JoinHandle<()>,
}

impl CartSyncService {
    /// Attach sync flows to `store`, pushing through `remote` whenever the
    /// session in `auth` is signed in.
    #[must_use]
    pub fn new(store: CartStore, remote: Arc<dyn RemoteCart>, auth: AuthWatcher) -> Self {
        let worker = tokio::spawn(push_worker(
            store.clone(),
            Arc::clone(&remote),
            auth.clone(),
            store.watch_changes(),
        ));

        Self {
            store,
            remote,
            auth,
            worker,
        }
    }

    /// The store this service syncs.
    #[must_use]
    pub const fn store(&self) -> &CartStore {
        &self.store
    }

    /// Reconcile the server cart into the local one after a sign-in.
    ///
    /// Fetches the user's stored items and dispatches a replacement list:
    /// the quantity-summing merge when the local cart has anything in it,
    /// the server items verbatim when it does not. The dispatch wakes the
    /// push worker, which writes the merged cart back to the server.
    ///
    /// A fetch failure sets the sticky [`SyncStatus::Error`] and surfaces a
    /// notice; the local cart is left alone.
    #[instrument(skip(self))]
    pub async fn sync_on_sign_in(&self) {
        let session = self.auth.borrow().clone();
        let Some(token) = session.token() else {
            debug!("Not signed in; skipping cart sync");
            return;
        };

        match self.remote.fetch(token).await {
            Ok(remote_items) => {
                let local = self.store.state();
                let items = if local.is_empty() {
                    remote_items
                } else {
                    merge_items(&remote_items, local.items())
                };

                debug!(count = items.len(), "Merged remote cart at sign-in");
                self.store.dispatch(CartAction::SetItems { items }).await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch remote cart at sign-in");
                self.store.set_sync_status(SyncStatus::Error);
                self.store.emit_notice(Notice::error(FETCH_FAILED_NOTICE));
            }
        }
    }

    /// Clear the cart and its persisted slot after a sign-out.
    ///
    /// Skipped entirely while the sticky [`SyncStatus::Error`] is set: the
    /// server may never have seen this cart, so it survives locally and the
    /// next sign-in merges it. The error state outlives the sign-out for the
    /// same reason.
    #[instrument(skip(self))]
    pub async fn reset_on_sign_out(&self) {
        if self.store.sync_status().is_error() {
            warn!("Sync error pending; keeping cart through sign-out");
            return;
        }

        self.store
            .dispatch(CartAction::ClearCart {
                source: ClearSource::SignOut,
            })
            .await;
        self.store.erase_persisted().await;
        self.store.set_sync_status(SyncStatus::Synced);
    }
}

impl Drop for CartSyncService {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

/// Push loop: wake per dispatch, push the newest snapshot while signed in.
///
/// `changed()` marks everything seen so far, so dispatches that land during
/// a push coalesce into one trailing pass instead of queueing a push each.
async fn push_worker(
    store: CartStore,
    remote: Arc<dyn RemoteCart>,
    auth: AuthWatcher,
    mut changes: watch::Receiver<u64>,
) {
    loop {
        if changes.changed().await.is_err() {
            // Store dropped; nothing left to push.
            break;
        }

        let token = match auth.borrow().clone() {
            AuthSession::SignedIn { token } => token,
            AuthSession::SignedOut => {
                debug!("Skipping cart push while signed out");
                continue;
            }
        };

        push_current(&store, remote.as_ref(), &token).await;
    }
}

/// One push attempt, with the status transitions around it.
///
/// Status never moves from `Error` on an attempt - only an outcome clears
/// the sticky state. A success lands on `Synced` only if nothing was
/// dispatched while the push was in flight; otherwise the cart is still
/// `Pending` and the worker is already due for another pass. A failure
/// leaves status where it was: the notice is the surface, there is no
/// rollback, and no retry until the next change.
async fn push_current(store: &CartStore, remote: &dyn RemoteCart, token: &AccessToken) {
    if store.sync_status() != SyncStatus::Error {
        store.set_sync_status(SyncStatus::Pending);
    }

    let version = store.version();
    let items = store.state().into_items();

    match remote.push(token, &items).await {
        Ok(()) => {
            if store.version() == version {
                store.set_sync_status(SyncStatus::Synced);
            } else {
                store.set_sync_status(SyncStatus::Pending);
            }
            debug!(version, count = items.len(), "Pushed cart");
        }
        Err(e) => {
            warn!(error = %e, version, "Failed to push cart");
            store.emit_notice(Notice::error(PUSH_FAILED_NOTICE));
        }
    }
}
