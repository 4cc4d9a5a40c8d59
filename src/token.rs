//! Turns the identity provider's auth-state signal into a single token.
//!
//! The signal is push-based and fires on every state change. A token fetch
//! wants exactly one answer, so each call subscribes, takes the first
//! notification through a oneshot channel, and tears the listener down
//! before doing anything else. Later notifications for the same call are
//! dropped on the floor.
//!
//! Nothing is cached: every call pays a full round-trip to the provider and
//! asks for a forced refresh, because the token is about to leave the
//! process and must be valid right now. Concurrent calls share nothing.

use tokio::sync::oneshot;
use tracing::trace;

use crate::error::Error;
use crate::identity::{AuthState, IdentityProvider, RefreshError};

/// Fetches a fresh ID token for whoever is signed in.
///
/// | Outcome | Result |
/// |---|---|
/// | signed in, refresh succeeds | `Ok(Some(token))` |
/// | signed out | `Ok(None)` |
/// | refresh declined by the provider | `Ok(None)` |
/// | refresh failed unexpectedly | `Err(Error::Identity)` |
/// | provider dropped the listener without notifying | `Err(Error::SignalClosed)` |
pub async fn fetch_token(provider: &dyn IdentityProvider) -> Result<Option<String>, Error> {
    let (tx, rx) = oneshot::channel::<AuthState>();
    let mut tx = Some(tx);

    let subscription = provider.on_auth_state_changed(Box::new(move |state| {
        if let Some(tx) = tx.take() {
            // The receiver only disappears if the caller gave up.
            let _ = tx.send(state);
        }
    }));

    let state = rx.await;
    subscription.unsubscribe();

    let identity = match state {
        Ok(Some(identity)) => identity,
        Ok(None) => {
            trace!("no signed-in identity");
            return Ok(None);
        }
        Err(_) => return Err(Error::SignalClosed),
    };

    match identity.id_token(true).await {
        Ok(token) => {
            trace!("token refreshed");
            Ok(Some(token))
        }
        Err(RefreshError::Declined(reason)) => {
            trace!(%reason, "token refresh declined");
            Ok(None)
        }
        Err(RefreshError::Failed(e)) => Err(Error::Identity(e)),
    }
}
