//! The cart store: state container, persistence, and change signaling.
//!
//! All mutation funnels through [`CartStore::dispatch`], which applies the
//! pure reducer atomically, emits the user notice the reduction calls for,
//! persists the new state, and then signals the change for the sync worker.
//! Everything else only observes.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use prickly_fig_core::{CartAction, CartState, Notice, SyncStatus, notice_for, reduce};
use tokio::sync::{Mutex, broadcast, watch};
use tracing::{debug, instrument, warn};

use crate::storage::{CART_KEY, CartStorage};

const NOTICE_CHANNEL_CAPACITY: usize = 16;

/// Shared, cloneable handle to the single cart state of the session.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    state: watch::Sender<CartState>,
    version: AtomicU64,
    storage: Arc<dyn CartStorage>,
    // Taken for the whole snapshot-then-write of a persist, so a slow writer
    // can never clobber the slot with an older state.
    persist_lock: Mutex<()>,
    notices: broadcast::Sender<Notice>,
    status: watch::Sender<SyncStatus>,
    changes: watch::Sender<u64>,
}

impl CartStore {
    /// Create a store from whatever the storage slot holds.
    ///
    /// A missing slot starts an empty cart; a corrupt or unreadable slot is
    /// logged and also starts empty. Loading never fails - the cart must
    /// stay usable whatever the device did to the slot.
    #[instrument(skip(storage))]
    pub async fn load(storage: Arc<dyn CartStorage>) -> Self {
        let state = match storage.get(CART_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<CartState>(&raw) {
                Ok(state) => state,
                Err(e) => {
                    warn!(error = %e, "Persisted cart is corrupt; starting empty");
                    CartState::default()
                }
            },
            Ok(None) => CartState::default(),
            Err(e) => {
                warn!(error = %e, "Could not read persisted cart; starting empty");
                CartState::default()
            }
        };

        debug!(size = state.size(), "Loaded cart");
        Self::with_state(storage, state)
    }

    fn with_state(storage: Arc<dyn CartStorage>, state: CartState) -> Self {
        let (state_tx, _) = watch::channel(state);
        let (notices, _) = broadcast::channel(NOTICE_CHANNEL_CAPACITY);
        let (status, _) = watch::channel(SyncStatus::default());
        let (changes, _) = watch::channel(0);

        Self {
            inner: Arc::new(CartStoreInner {
                state: state_tx,
                version: AtomicU64::new(0),
                storage,
                persist_lock: Mutex::new(()),
                notices,
                status,
                changes,
            }),
        }
    }

    /// Apply an action to the cart.
    ///
    /// Reduction is atomic with respect to concurrent dispatches. When this
    /// returns, the new state has been offered to the storage slot (storage
    /// failures degrade to a warning) and the change has been signaled.
    /// Returns the state version the dispatch produced.
    #[instrument(skip(self, action), fields(kind = action.kind()))]
    pub async fn dispatch(&self, action: CartAction) -> u64 {
        let mut delta = None;
        self.inner.state.send_modify(|state| {
            let (next, d) = reduce(state, &action);
            *state = next;
            delta = Some(d);
        });
        let version = self.inner.version.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(delta) = delta
            && let Some(notice) = notice_for(&action, &delta)
        {
            // Nobody listening is fine.
            let _ = self.inner.notices.send(notice);
        }

        self.persist_current().await;
        self.inner.changes.send_replace(version);
        version
    }

    /// A snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> CartState {
        self.inner.state.borrow().clone()
    }

    /// Observe every state change.
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<CartState> {
        self.inner.state.subscribe()
    }

    /// Monotonic counter of applied dispatches.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.version.load(Ordering::SeqCst)
    }

    /// Subscribe to user-facing notices.
    #[must_use]
    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.inner.notices.subscribe()
    }

    /// The current remote sync status.
    #[must_use]
    pub fn sync_status(&self) -> SyncStatus {
        *self.inner.status.borrow()
    }

    /// Observe sync status transitions.
    #[must_use]
    pub fn watch_sync_status(&self) -> watch::Receiver<SyncStatus> {
        self.inner.status.subscribe()
    }

    /// Versions as they are dispatched; the sync worker's wakeup.
    pub(crate) fn watch_changes(&self) -> watch::Receiver<u64> {
        self.inner.changes.subscribe()
    }

    /// Only the sync flows move this; the status rules live there.
    pub(crate) fn set_sync_status(&self, status: SyncStatus) {
        let previous = self.inner.status.send_replace(status);
        if previous != status {
            debug!(from = %previous, to = %status, "Sync status changed");
        }
    }

    /// Surface a notice that did not come from a reduction (sync failures).
    pub(crate) fn emit_notice(&self, notice: Notice) {
        let _ = self.inner.notices.send(notice);
    }

    /// Drop the persisted slot (sign-out cleanup).
    pub(crate) async fn erase_persisted(&self) {
        let _permit = self.inner.persist_lock.lock().await;
        if let Err(e) = self.inner.storage.remove(CART_KEY).await {
            warn!(error = %e, "Failed to erase persisted cart");
        }
    }

    /// Write the current state to the slot.
    ///
    /// The snapshot is taken after the persist lock is acquired, so when
    /// writers queue up, each one writes the newest state and the slot
    /// converges on the last dispatch.
    async fn persist_current(&self) {
        let _permit = self.inner.persist_lock.lock().await;
        let state = self.state();

        match serde_json::to_string(&state) {
            Ok(json) => {
                if let Err(e) = self.inner.storage.set(CART_KEY, &json).await {
                    warn!(error = %e, "Failed to persist cart");
                }
            }
            Err(e) => warn!(error = %e, "Failed to serialize cart for persistence"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use prickly_fig_core::{CartItem, ClearSource, NoticeLevel};
    use rust_decimal::Decimal;

    use super::*;
    use crate::storage::MemoryStorage;

    fn item(id: &str, name: &str, quantity: u32) -> CartItem {
        CartItem::new(id, name, Decimal::new(20, 0), quantity)
    }

    fn add(id: &str, name: &str, quantity: u32) -> CartAction {
        CartAction::AddItem {
            item: item(id, name, quantity),
        }
    }

    #[tokio::test]
    async fn test_dispatch_updates_state_and_version() {
        let store = CartStore::load(Arc::new(MemoryStorage::new())).await;

        let version = store.dispatch(add("p1", "Shirt", 2)).await;

        assert_eq!(version, 1);
        assert_eq!(store.version(), 1);
        assert_eq!(store.state().size(), 2);
    }

    #[tokio::test]
    async fn test_dispatch_persists_to_slot() {
        let storage = Arc::new(MemoryStorage::new());
        let store = CartStore::load(Arc::clone(&storage) as Arc<dyn CartStorage>).await;

        store.dispatch(add("p1", "Shirt", 1)).await;

        let raw = storage.get(CART_KEY).await.unwrap().unwrap();
        let persisted: CartState = serde_json::from_str(&raw).unwrap();
        assert_eq!(persisted, store.state());
    }

    #[tokio::test]
    async fn test_load_restores_persisted_state() {
        let storage: Arc<dyn CartStorage> = Arc::new(MemoryStorage::new());
        let store = CartStore::load(Arc::clone(&storage)).await;
        store.dispatch(add("p1", "Shirt", 2)).await;
        store.dispatch(add("p2", "Mug", 1)).await;
        let expected = store.state();
        drop(store);

        let restored = CartStore::load(storage).await;
        assert_eq!(restored.state(), expected);
        assert_eq!(restored.version(), 0);
    }

    #[tokio::test]
    async fn test_load_survives_corrupt_slot() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(CART_KEY, "not json at all {{{").await.unwrap();

        let store = CartStore::load(storage).await;
        assert!(store.state().is_empty());
    }

    #[tokio::test]
    async fn test_add_emits_success_notice() {
        let store = CartStore::load(Arc::new(MemoryStorage::new())).await;
        let mut notices = store.notices();

        store.dispatch(add("p1", "Shirt", 1)).await;

        let notice = notices.recv().await.unwrap();
        assert_eq!(notice.level, NoticeLevel::Success);
        assert_eq!(notice.message, "'Shirt' added to cart!");
    }

    #[tokio::test]
    async fn test_set_items_is_silent() {
        let store = CartStore::load(Arc::new(MemoryStorage::new())).await;
        let mut notices = store.notices();

        store
            .dispatch(CartAction::SetItems {
                items: vec![item("p1", "Shirt", 1)],
            })
            .await;
        store.dispatch(add("p2", "Mug", 1)).await;

        // The only notice is the one for the add; set_items produced none.
        let notice = notices.recv().await.unwrap();
        assert!(notice.message.contains("Mug"));
    }

    #[tokio::test]
    async fn test_sign_out_clear_is_silent() {
        let store = CartStore::load(Arc::new(MemoryStorage::new())).await;
        store.dispatch(add("p1", "Shirt", 1)).await;

        let mut notices = store.notices();
        store
            .dispatch(CartAction::ClearCart {
                source: ClearSource::SignOut,
            })
            .await;
        store.dispatch(add("p2", "Mug", 1)).await;

        let notice = notices.recv().await.unwrap();
        assert!(notice.message.contains("Mug"));
    }

    #[tokio::test]
    async fn test_erase_persisted_removes_slot() {
        let storage = Arc::new(MemoryStorage::new());
        let store = CartStore::load(Arc::clone(&storage) as Arc<dyn CartStorage>).await;
        store.dispatch(add("p1", "Shirt", 1)).await;
        assert!(storage.get(CART_KEY).await.unwrap().is_some());

        store.erase_persisted().await;
        assert!(storage.get(CART_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_status_starts_synced() {
        let store = CartStore::load(Arc::new(MemoryStorage::new())).await;
        assert_eq!(store.sync_status(), SyncStatus::Synced);
    }
}
