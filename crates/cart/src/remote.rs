//! Remote cart endpoints.
//!
//! Wraps `reqwest` with the cart service's REST contract: `GET /api/cart`
//! returns the stored cart, `PUT /api/cart` overwrites it wholesale. The
//! [`RemoteCart`] trait is the seam the sync service talks through, so tests
//! can script a remote without a server.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use prickly_fig_core::CartItem;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::auth::AccessToken;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors returned by a [`RemoteCart`] backend.
#[derive(thiserror::Error, Debug)]
pub enum RemoteCartError {
    /// Network or TLS failure from the underlying HTTP client, or a response
    /// body that did not parse.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service did not accept the bearer token.
    #[error("cart service rejected the access token")]
    Unauthorized,

    /// The service answered with an unexpected status.
    #[error("cart service returned {status}: {body}")]
    Status {
        /// HTTP status code of the response.
        status: StatusCode,
        /// Response body, truncated for logging.
        body: String,
    },

    /// The configured base URL could not be parsed.
    #[error("invalid cart service base URL '{0}'")]
    BaseUrl(String),
}

/// Server-side copy of the cart, keyed by the authenticated user.
#[async_trait]
pub trait RemoteCart: Send + Sync {
    /// Fetch the stored items for the token's user.
    async fn fetch(&self, token: &AccessToken) -> Result<Vec<CartItem>, RemoteCartError>;

    /// Overwrite the stored items for the token's user.
    async fn push(&self, token: &AccessToken, items: &[CartItem]) -> Result<(), RemoteCartError>;
}

/// Response envelope both cart endpoints return.
///
/// The `size` the service sends along is ignored here; the store rederives
/// unit counts from the items themselves.
#[derive(Deserialize)]
struct CartEnvelope {
    items: Vec<CartItem>,
}

#[derive(Serialize)]
struct PushPayload<'a> {
    items: &'a [CartItem],
}

/// HTTP implementation of [`RemoteCart`].
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone, Debug)]
pub struct HttpRemoteCart {
    inner: Arc<HttpRemoteCartInner>,
}

#[derive(Debug)]
struct HttpRemoteCartInner {
    client: Client,
    endpoint: Url,
}

impl HttpRemoteCart {
    /// Create a client for the cart service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteCartError::BaseUrl`] if `base_url` does not parse, or
    /// [`RemoteCartError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed.
    pub fn new(base_url: &str) -> Result<Self, RemoteCartError> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`HttpRemoteCart::new`].
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, RemoteCartError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        // Normalize the trailing slash so the join below cannot clobber a
        // path segment of the configured URL.
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&normalized)
            .and_then(|base| base.join("api/cart"))
            .map_err(|e| RemoteCartError::BaseUrl(format!("{base_url}: {e}")))?;

        Ok(Self {
            inner: Arc::new(HttpRemoteCartInner { client, endpoint }),
        })
    }

    async fn read_error(response: reqwest::Response) -> RemoteCartError {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return RemoteCartError::Unauthorized;
        }

        let body = response
            .text()
            .await
            .unwrap_or_default()
            .chars()
            .take(200)
            .collect();
        RemoteCartError::Status { status, body }
    }
}

#[async_trait]
impl RemoteCart for HttpRemoteCart {
    #[instrument(skip(self, token))]
    async fn fetch(&self, token: &AccessToken) -> Result<Vec<CartItem>, RemoteCartError> {
        let response = self
            .inner
            .client
            .get(self.inner.endpoint.clone())
            .bearer_auth(token.expose())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        let envelope: CartEnvelope = response.json().await?;
        Ok(envelope.items)
    }

    #[instrument(skip(self, token, items), fields(count = items.len()))]
    async fn push(&self, token: &AccessToken, items: &[CartItem]) -> Result<(), RemoteCartError> {
        let response = self
            .inner
            .client
            .put(self.inner.endpoint.clone())
            .bearer_auth(token.expose())
            .json(&PushPayload { items })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        Ok(())
    }
}
