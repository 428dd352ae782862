//! Authentication state shared with the cart runtime.
//!
//! The application owns sign-in and sign-out; the cart only observes. An
//! [`AuthHandle`] publishes the current [`AuthSession`] over a watch channel,
//! and the sync side holds receivers. Flip the channel *before* invoking the
//! sign-in/sign-out cart flows so pushes triggered by those flows see the
//! right session.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;

/// Bearer token for the remote cart service.
///
/// Wrapped in [`SecretString`] so it never lands in logs or debug output.
#[derive(Clone)]
pub struct AccessToken(SecretString);

impl AccessToken {
    /// Wrap a raw token string.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// Expose the raw token for constructing an `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

/// The user's current authentication state.
#[derive(Debug, Clone, Default)]
pub enum AuthSession {
    /// No signed-in user; the cart stays local-only.
    #[default]
    SignedOut,
    /// A user is signed in and remote sync may run.
    SignedIn {
        /// Token presented to the cart service.
        token: AccessToken,
    },
}

impl AuthSession {
    /// Whether a user is signed in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::SignedIn { .. })
    }

    /// The bearer token, when signed in.
    #[must_use]
    pub fn token(&self) -> Option<&AccessToken> {
        match self {
            Self::SignedIn { token } => Some(token),
            Self::SignedOut => None,
        }
    }
}

/// Receiving side of the auth channel.
pub type AuthWatcher = watch::Receiver<AuthSession>;

/// Publishing side of the auth channel, held by the application.
#[derive(Debug, Clone)]
pub struct AuthHandle {
    tx: watch::Sender<AuthSession>,
}

impl AuthHandle {
    /// Publish a sign-in with the given token.
    pub fn sign_in(&self, token: AccessToken) {
        self.tx.send_replace(AuthSession::SignedIn { token });
    }

    /// Publish a sign-out.
    pub fn sign_out(&self) {
        self.tx.send_replace(AuthSession::SignedOut);
    }

    /// Attach another observer to the channel.
    #[must_use]
    pub fn subscribe(&self) -> AuthWatcher {
        self.tx.subscribe()
    }
}

/// Create an auth channel starting signed out.
#[must_use]
pub fn channel() -> (AuthHandle, AuthWatcher) {
    let (tx, rx) = watch::channel(AuthSession::SignedOut);
    (AuthHandle { tx }, rx)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_starts_signed_out() {
        let (_handle, watcher) = channel();
        assert!(!watcher.borrow().is_authenticated());
    }

    #[test]
    fn test_sign_in_then_out_transitions() {
        let (handle, watcher) = channel();

        handle.sign_in(AccessToken::new("tok-1"));
        assert!(watcher.borrow().is_authenticated());
        assert_eq!(
            watcher.borrow().token().map(AccessToken::expose),
            Some("tok-1")
        );

        handle.sign_out();
        assert!(watcher.borrow().token().is_none());
    }

    #[test]
    fn test_debug_redacts_token() {
        let token = AccessToken::new("super-secret");
        let rendered = format!("{token:?}");
        assert!(!rendered.contains("super-secret"));
    }
}
