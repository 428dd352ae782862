//! Session lifecycle against on-disk storage.
//!
//! The wiring an application performs, end to end: load the cart from
//! disk, take guest changes, merge the server cart at sign-in, reset at
//! sign-out, come back up after a restart.

use std::sync::Arc;

use prickly_fig_cart::{CART_KEY, CartStorage, FileStorage};
use prickly_fig_core::CartAction;
use prickly_fig_integration_tests::harness::{
    RecordingRemote, TestSession, item, wait_for_last_push,
};

fn add(id: &str, name: &str, quantity: u32) -> CartAction {
    CartAction::AddItem {
        item: item(id, name, quantity),
    }
}

#[tokio::test]
async fn test_guest_cart_survives_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let storage: Arc<dyn CartStorage> = Arc::new(FileStorage::new(dir.path()));

    let first = TestSession::start(Arc::clone(&storage), RecordingRemote::default()).await;
    first.store().dispatch(add("p1", "Shirt", 2)).await;
    first.store().dispatch(add("p2", "Mug", 1)).await;
    let parked = first.store().state();
    drop(first);

    let second = TestSession::start(storage, RecordingRemote::default()).await;
    assert_eq!(second.store().state(), parked);
    assert_eq!(second.store().state().size(), 3);
}

#[tokio::test]
async fn test_sign_in_merge_push_and_sign_out_reset() {
    let dir = tempfile::tempdir().expect("tempdir");
    let storage: Arc<dyn CartStorage> = Arc::new(FileStorage::new(dir.path()));
    let session = TestSession::start(
        Arc::clone(&storage),
        RecordingRemote::serving(vec![item("p1", "Shirt", 3)]),
    )
    .await;

    session.store().dispatch(add("p1", "Shirt", 1)).await;
    session.store().dispatch(add("p3", "Cap", 2)).await;

    session.sign_in_and_sync("tok").await;

    let merged = session.store().state();
    assert_eq!(
        merged.items(),
        &[item("p1", "Shirt", 4), item("p3", "Cap", 2)]
    );
    assert_eq!(merged.size(), 6);

    // The merged cart is what the server converges on.
    wait_for_last_push(&session.remote, merged.items()).await;

    session.sign_out_and_reset().await;
    assert!(session.store().state().is_empty());
    assert!(
        storage
            .get(CART_KEY)
            .await
            .expect("storage readable")
            .is_none()
    );

    drop(session);
    let next = TestSession::start(storage, RecordingRemote::default()).await;
    assert!(next.store().state().is_empty());
}

#[tokio::test]
async fn test_corrupt_slot_starts_empty_and_recovers() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("cart.json"), r#"{"items": [{"id"#).expect("write slot");

    let storage: Arc<dyn CartStorage> = Arc::new(FileStorage::new(dir.path()));
    let session = TestSession::start(Arc::clone(&storage), RecordingRemote::default()).await;
    assert!(session.store().state().is_empty());

    session.store().dispatch(add("p1", "Shirt", 1)).await;
    drop(session);

    let recovered = TestSession::start(storage, RecordingRemote::default()).await;
    assert_eq!(recovered.store().state().size(), 1);
}
