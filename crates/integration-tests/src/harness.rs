//! Shared test harness for cart integration scenarios.
//!
//! [`RecordingRemote`] is a scriptable [`RemoteCart`]: it serves a fixed
//! fetch result, records every accepted push, fails on demand, and can hold
//! pushes at the wire so tests can observe what coalesces behind an
//! in-flight request. [`TestSession`] wires it to a real store and sync
//! service the way an application does at startup.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use prickly_fig_cart::auth::{self, AccessToken, AuthHandle};
use prickly_fig_cart::remote::{RemoteCart, RemoteCartError};
use prickly_fig_cart::storage::CartStorage;
use prickly_fig_cart::store::CartStore;
use prickly_fig_cart::sync::CartSyncService;
use prickly_fig_core::{CartItem, Notice, NoticeLevel, SyncStatus};
use rust_decimal::Decimal;
use tokio::sync::{Mutex, broadcast, watch};
use tokio::time::{sleep, timeout};

const WAIT_BUDGET: Duration = Duration::from_secs(2);

/// Remote double that records pushes and can be paused or failed.
pub struct RecordingRemote {
    served: Mutex<Vec<CartItem>>,
    fail_fetch: AtomicBool,
    fail_push: AtomicBool,
    gate: watch::Sender<bool>,
    fetches: AtomicUsize,
    pushes: Mutex<Vec<Vec<CartItem>>>,
}

impl Default for RecordingRemote {
    fn default() -> Self {
        let (gate, _) = watch::channel(true);
        Self {
            served: Mutex::new(Vec::new()),
            fail_fetch: AtomicBool::new(false),
            fail_push: AtomicBool::new(false),
            gate,
            fetches: AtomicUsize::new(0),
            pushes: Mutex::new(Vec::new()),
        }
    }
}

impl RecordingRemote {
    /// A remote whose fetches serve `items`.
    #[must_use]
    pub fn serving(items: Vec<CartItem>) -> Self {
        Self {
            served: Mutex::new(items),
            ..Self::default()
        }
    }

    /// Make subsequent fetches fail as unauthorized.
    pub fn fail_fetches(&self) {
        self.fail_fetch.store(true, Ordering::SeqCst);
    }

    /// Control whether pushes fail as unauthorized.
    pub fn fail_pushes(&self, fail: bool) {
        self.fail_push.store(fail, Ordering::SeqCst);
    }

    /// Hold pushes at the wire until [`Self::open_gate`].
    ///
    /// Close the gate before dispatching; a push already past the gate is
    /// not recalled.
    pub fn close_gate(&self) {
        // send_replace: the value must stick even when no push is parked at
        // the gate yet (plain `send` drops the value without receivers).
        self.gate.send_replace(false);
    }

    /// Release pushes held by [`Self::close_gate`].
    pub fn open_gate(&self) {
        self.gate.send_replace(true);
    }

    /// Every push body the remote has accepted, oldest first.
    pub async fn pushed(&self) -> Vec<Vec<CartItem>> {
        self.pushes.lock().await.clone()
    }

    /// Number of fetches attempted, served or failed.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteCart for RecordingRemote {
    async fn fetch(&self, _token: &AccessToken) -> Result<Vec<CartItem>, RemoteCartError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(RemoteCartError::Unauthorized);
        }
        Ok(self.served.lock().await.clone())
    }

    async fn push(&self, _token: &AccessToken, items: &[CartItem]) -> Result<(), RemoteCartError> {
        // Park while the gate is closed; the worker is busy here, so
        // dispatches landing now must coalesce behind this push.
        let mut gate = self.gate.subscribe();
        let _ = gate.wait_for(|open| *open).await;

        if self.fail_push.load(Ordering::SeqCst) {
            return Err(RemoteCartError::Unauthorized);
        }
        self.pushes.lock().await.push(items.to_vec());
        Ok(())
    }
}

/// A wired cart session: real store and sync service over a controllable
/// remote, plus the auth handle an application would hold.
pub struct TestSession {
    /// The sync service under test. Dropping the session stops its worker.
    pub service: CartSyncService,
    /// The remote double the service pushes through.
    pub remote: Arc<RecordingRemote>,
    /// Writer side of the session's auth channel.
    pub auth: AuthHandle,
}

impl TestSession {
    /// Start a session over `storage`, syncing through `remote`.
    pub async fn start(storage: Arc<dyn CartStorage>, remote: RecordingRemote) -> Self {
        let store = CartStore::load(storage).await;
        let remote = Arc::new(remote);
        let (auth, watcher) = auth::channel();
        let service =
            CartSyncService::new(store, Arc::clone(&remote) as Arc<dyn RemoteCart>, watcher);

        Self {
            service,
            remote,
            auth,
        }
    }

    /// The store behind the session.
    #[must_use]
    pub fn store(&self) -> &CartStore {
        self.service.store()
    }

    /// Mark the session signed-in without running the sign-in sync flow.
    pub fn sign_in(&self, token: &str) {
        self.auth.sign_in(AccessToken::new(token));
    }

    /// Flip to signed-in and reconcile the remote cart, the sequence an
    /// application runs when authentication completes.
    pub async fn sign_in_and_sync(&self, token: &str) {
        self.auth.sign_in(AccessToken::new(token));
        self.service.sync_on_sign_in().await;
    }

    /// Flip to signed-out and run the reset flow.
    pub async fn sign_out_and_reset(&self) {
        self.auth.sign_out();
        self.service.reset_on_sign_out().await;
    }
}

/// Build a cart item with a fixed price.
#[must_use]
pub fn item(id: &str, name: &str, quantity: u32) -> CartItem {
    CartItem::new(id, name, Decimal::new(20, 0), quantity)
}

/// Poll until the remote has recorded at least `count` pushes.
///
/// # Panics
///
/// Panics if the pushes do not arrive within the wait budget.
pub async fn wait_for_pushes(remote: &RecordingRemote, count: usize) {
    let outcome = timeout(WAIT_BUDGET, async {
        while remote.pushed().await.len() < count {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(outcome.is_ok(), "remote never recorded {count} pushes");
}

/// Poll until the newest recorded push equals `expected`.
///
/// Earlier pushes may carry interim snapshots; this waits for the wire to
/// converge on the state the test ends in.
///
/// # Panics
///
/// Panics if no such push arrives within the wait budget.
pub async fn wait_for_last_push(remote: &RecordingRemote, expected: &[CartItem]) {
    let outcome = timeout(WAIT_BUDGET, async {
        loop {
            let pushes = remote.pushed().await;
            if pushes.last().is_some_and(|last| last.as_slice() == expected) {
                break;
            }
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(outcome.is_ok(), "remote never converged on the expected push");
}

/// Wait until the store's sync status lands on `wanted`.
///
/// # Panics
///
/// Panics if the status does not get there within the wait budget.
pub async fn wait_for_status(store: &CartStore, wanted: SyncStatus) {
    let mut status = store.watch_sync_status();
    let outcome = timeout(WAIT_BUDGET, status.wait_for(|s| *s == wanted)).await;
    assert!(
        outcome.is_ok_and(|r| r.is_ok()),
        "sync status never reached {wanted}"
    );
}

/// Receive the next error-level notice, discarding others.
///
/// # Panics
///
/// Panics if the channel closes or no error notice arrives in time.
pub async fn next_error_notice(notices: &mut broadcast::Receiver<Notice>) -> Notice {
    let outcome = timeout(WAIT_BUDGET, async {
        loop {
            match notices.recv().await {
                Ok(notice) if notice.level == NoticeLevel::Error => break notice,
                Ok(_) => {}
                Err(e) => panic!("notice channel closed: {e}"),
            }
        }
    })
    .await;
    match outcome {
        Ok(notice) => notice,
        Err(_) => panic!("no error notice arrived"),
    }
}
