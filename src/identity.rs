//! The identity-provider boundary.
//!
//! Sign-in, token issuance and refresh belong to the identity provider. This
//! crate only needs two things from it:
//!
//! 1. a push signal announcing the current auth state, fired once on
//!    subscription and again on every sign-in or sign-out
//!    ([`IdentityProvider::on_auth_state_changed`]);
//! 2. on a signed-in [`Identity`], a token fetch that can bypass the
//!    provider's cache ([`Identity::id_token`]).
//!
//! [`AuthStateHub`] is an in-process provider for hosts that manage sign-in
//! themselves and simply publish the result.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use thiserror::Error;
use tokio::sync::watch;

use crate::error::BoxError;
use crate::future::BoxFuture;

/// `Some(identity)` while someone is signed in, `None` otherwise.
pub type AuthState = Option<Arc<dyn Identity>>;

/// Callback receiving auth-state notifications.
pub type AuthStateListener = Box<dyn FnMut(AuthState) + Send + 'static>;

/// Why a token refresh produced no token.
#[derive(Debug, Error)]
pub enum RefreshError {
    /// The provider refused to mint a token (revoked session, network
    /// trouble on its side). Treated as "no usable credential".
    #[error("token refresh declined: {0}")]
    Declined(String),

    /// Anything the provider did not anticipate.
    #[error(transparent)]
    Failed(BoxError),
}

/// A signed-in user.
pub trait Identity: Send + Sync {
    /// Returns an ID token. With `force_refresh` the provider must mint a
    /// fresh one instead of handing out a cached token.
    fn id_token(&self, force_refresh: bool) -> BoxFuture<'_, Result<String, RefreshError>>;
}

/// Source of auth-state notifications.
pub trait IdentityProvider: Send + Sync {
    /// Registers `listener` and calls it once with the current state, then
    /// again after every change until the returned [`Subscription`] ends.
    fn on_auth_state_changed(&self, listener: AuthStateListener) -> Subscription;
}

// ── Subscription ─────────────────────────────────────────────────────────────

/// Handle to a registered listener. Unsubscribes when dropped.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + 'static>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self { cancel: Some(Box::new(cancel)) }
    }

    /// A subscription with nothing to tear down.
    pub fn detached() -> Self {
        Self { cancel: None }
    }

    pub fn unsubscribe(mut self) {
        self.cancel();
    }

    fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

// ── StaticIdentity ────────────────────────────────────────────────────────────

/// An identity whose token never changes: service accounts, pre-issued
/// tokens, tests.
#[derive(Clone, Debug)]
pub struct StaticIdentity {
    token: String,
}

impl StaticIdentity {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

impl Identity for StaticIdentity {
    fn id_token(&self, _force_refresh: bool) -> BoxFuture<'_, Result<String, RefreshError>> {
        Box::pin(async move { Ok(self.token.clone()) })
    }
}

// ── AuthStateHub ──────────────────────────────────────────────────────────────

/// In-process [`IdentityProvider`]: the host calls [`set`](Self::set) after
/// sign-in or sign-out and every listener is told.
///
/// The current state lives in a [`watch`] channel, so async consumers can
/// also follow it through [`watch`](Self::watch) without registering a
/// callback. Callbacks run while the listener list is locked, so a listener
/// must not call back into the hub.
#[derive(Clone)]
pub struct AuthStateHub {
    inner: Arc<Shared>,
}

struct Shared {
    state: watch::Sender<AuthState>,
    listeners: Mutex<Listeners>,
}

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, AuthStateListener)>,
}

impl Default for AuthStateHub {
    fn default() -> Self {
        let (state, _) = watch::channel(None);
        Self {
            inner: Arc::new(Shared { state, listeners: Mutex::default() }),
        }
    }
}

impl AuthStateHub {
    /// A hub with nobody signed in.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(identity: Arc<dyn Identity>) -> Self {
        let hub = Self::new();
        hub.set(Some(identity));
        hub
    }

    /// Publishes a new auth state to every listener.
    pub fn set(&self, state: AuthState) {
        let mut listeners = lock(&self.inner.listeners);
        self.inner.state.send_replace(state.clone());
        for (_, listener) in listeners.entries.iter_mut() {
            listener(state.clone());
        }
    }

    pub fn current(&self) -> AuthState {
        self.inner.state.borrow().clone()
    }

    /// A receiver that always holds the latest state.
    pub fn watch(&self) -> watch::Receiver<AuthState> {
        self.inner.state.subscribe()
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.inner.listeners).entries.len()
    }
}

impl IdentityProvider for AuthStateHub {
    fn on_auth_state_changed(&self, mut listener: AuthStateListener) -> Subscription {
        let id = {
            let mut listeners = lock(&self.inner.listeners);
            listener(self.current());
            let id = listeners.next_id;
            listeners.next_id += 1;
            listeners.entries.push((id, listener));
            id
        };

        let inner: Weak<Shared> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                lock(&inner.listeners).entries.retain(|(i, _)| *i != id);
            }
        })
    }
}

fn lock(listeners: &Mutex<Listeners>) -> MutexGuard<'_, Listeners> {
    listeners.lock().unwrap_or_else(PoisonError::into_inner)
}
