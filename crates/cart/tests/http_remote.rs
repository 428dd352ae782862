//! Integration tests for `HttpRemoteCart` using wiremock HTTP mocks.

use prickly_fig_cart::auth::AccessToken;
use prickly_fig_cart::remote::{HttpRemoteCart, RemoteCart, RemoteCartError};
use prickly_fig_core::CartItem;
use rust_decimal::Decimal;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> HttpRemoteCart {
    HttpRemoteCart::new(base_url).expect("client construction should not fail")
}

fn token() -> AccessToken {
    AccessToken::new("shopper-token")
}

#[tokio::test]
async fn fetch_parses_cart_envelope() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "items": [
            { "id": "fig-jam", "name": "Fig Jam", "price": 12.5, "quantity": 2 },
            { "id": "fig-soap", "name": "Fig Leaf Soap", "price": 4.25, "quantity": 1 }
        ],
        "size": 3
    });

    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .and(header("authorization", "Bearer shopper-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let items = client.fetch(&token()).await.expect("should parse cart");

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id.as_str(), "fig-jam");
    assert_eq!(items[0].name, "Fig Jam");
    assert_eq!(items[0].price, Decimal::new(125, 1));
    assert_eq!(items[0].quantity, 2);
    assert_eq!(items[1].id.as_str(), "fig-soap");
}

#[tokio::test]
async fn fetch_rejected_token_returns_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .fetch(&token())
        .await
        .expect_err("401 should be an error");

    assert!(matches!(err, RemoteCartError::Unauthorized));
}

#[tokio::test]
async fn fetch_unexpected_status_carries_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(503).set_body_string("cart database unavailable"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .fetch(&token())
        .await
        .expect_err("503 should be an error");

    let msg = err.to_string();
    assert!(
        msg.contains("503") && msg.contains("cart database unavailable"),
        "expected status and body in error, got: {msg}"
    );
}

#[tokio::test]
async fn push_sends_items_as_json() {
    let server = MockServer::start().await;

    let items = vec![
        CartItem::new("fig-jam", "Fig Jam", Decimal::new(125, 1), 2),
        CartItem::new("fig-soap", "Fig Leaf Soap", Decimal::new(425, 2), 1),
    ];

    let expected = serde_json::json!({
        "items": [
            { "id": "fig-jam", "name": "Fig Jam", "price": 12.5, "quantity": 2 },
            { "id": "fig-soap", "name": "Fig Leaf Soap", "price": 4.25, "quantity": 1 }
        ]
    });

    Mock::given(method("PUT"))
        .and(path("/api/cart"))
        .and(header("authorization", "Bearer shopper-token"))
        .and(body_json(&expected))
        .respond_with(ResponseTemplate::new(200).set_body_json(&serde_json::json!({
            "items": [],
            "size": 0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    client
        .push(&token(), &items)
        .await
        .expect("push should succeed");
}

#[tokio::test]
async fn push_rejected_token_returns_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .push(&token(), &[])
        .await
        .expect_err("401 should be an error");

    assert!(matches!(err, RemoteCartError::Unauthorized));
}

#[tokio::test]
async fn base_url_trailing_slash_is_normalized() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&serde_json::json!({
            "items": [],
            "size": 0
        })))
        .mount(&server)
        .await;

    let with_slash = format!("{}/", server.uri());
    let client = test_client(&with_slash);
    let items = client.fetch(&token()).await.expect("should fetch");

    assert!(items.is_empty());
}

#[test]
fn invalid_base_url_is_rejected() {
    let err = HttpRemoteCart::new("not a url").expect_err("should reject garbage");
    assert!(matches!(err, RemoteCartError::BaseUrl(_)));
}
