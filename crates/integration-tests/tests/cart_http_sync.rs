//! Sync flows over real HTTP against a mock cart API.
//!
//! Drives the real `HttpRemoteCart` through `CartSyncService`, covering the
//! wire contract end to end: bearer auth, the `{items, size}` envelope, and
//! the push payload.

use std::sync::Arc;
use std::time::Duration;

use prickly_fig_cart::auth::{self, AccessToken, AuthHandle};
use prickly_fig_cart::{CartStore, CartSyncService, HttpRemoteCart, MemoryStorage, RemoteCart};
use prickly_fig_core::{CartAction, CartItem, SyncStatus};
use prickly_fig_integration_tests::harness::next_error_notice;
use rust_decimal::Decimal;
use serde_json::json;
use tokio::time::{sleep, timeout};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn session_against(server: &MockServer) -> (CartSyncService, AuthHandle) {
    let store = CartStore::load(Arc::new(MemoryStorage::new())).await;
    let remote = HttpRemoteCart::new(&server.uri()).expect("client construction should not fail");
    let (handle, watcher) = auth::channel();
    let service = CartSyncService::new(store, Arc::new(remote) as Arc<dyn RemoteCart>, watcher);
    (service, handle)
}

fn shirt(quantity: u32) -> CartItem {
    CartItem::new("p1", "Shirt", Decimal::new(20, 0), quantity)
}

/// Poll until the server has seen `count` requests with `method_name`.
async fn wait_for_requests(server: &MockServer, method_name: &str, count: usize) {
    let outcome = timeout(Duration::from_secs(2), async {
        loop {
            let received = server.received_requests().await.unwrap_or_default();
            let seen = received
                .iter()
                .filter(|r| r.method.as_str() == method_name)
                .count();
            if seen >= count {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(
        outcome.is_ok(),
        "server never saw {count} {method_name} requests"
    );
}

#[tokio::test]
async fn test_sign_in_fetch_sets_items_and_pushes_back() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .and(header("authorization", "Bearer tok-http"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "id": "p1", "name": "Shirt", "price": 20.0, "quantity": 3 }],
            "size": 3
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/cart"))
        .and(header("authorization", "Bearer tok-http"))
        .and(body_json(json!({
            "items": [{ "id": "p1", "name": "Shirt", "price": 20.0, "quantity": 3 }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "id": "p1", "name": "Shirt", "price": 20.0, "quantity": 3 }],
            "size": 3
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (service, handle) = session_against(&server).await;
    handle.sign_in(AccessToken::new("tok-http"));
    service.sync_on_sign_in().await;

    assert_eq!(service.store().state().items(), &[shirt(3)]);
    assert_eq!(service.store().state().size(), 3);

    // The fetched cart is written straight back, confirming the merged
    // state always makes it to the server.
    wait_for_requests(&server, "PUT", 1).await;
}

#[tokio::test]
async fn test_rejected_token_leaves_local_cart_and_flags_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "invalid access token" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (service, handle) = session_against(&server).await;
    service
        .store()
        .dispatch(CartAction::AddItem { item: shirt(2) })
        .await;

    handle.sign_in(AccessToken::new("expired"));
    service.sync_on_sign_in().await;

    assert_eq!(service.store().state().items(), &[shirt(2)]);
    assert_eq!(service.store().sync_status(), SyncStatus::Error);
}

#[tokio::test]
async fn test_push_failure_surfaces_notice_and_keeps_items() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let (service, handle) = session_against(&server).await;
    handle.sign_in(AccessToken::new("tok"));
    let mut notices = service.store().notices();

    service
        .store()
        .dispatch(CartAction::AddItem { item: shirt(1) })
        .await;

    let notice = next_error_notice(&mut notices).await;
    assert_eq!(notice.message, "Failed to sync cart with backend");
    assert_eq!(service.store().state().items(), &[shirt(1)]);
    assert_eq!(service.store().sync_status(), SyncStatus::Pending);
}
