//! Fakes shared by the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use http::StatusCode;
use tsu_bearer::{
    AuthStateHub, AuthStateListener, BearerAuth, BoxFuture, Error, Fetch, IdentityProvider, Location, Options,
    Request, Response, StaticIdentity, Subscription,
};

pub const SCOPE: &str = "https://app.example.com/sw.js";

/// Transport that records every request and answers from a script.
pub struct ScriptedFetch {
    pub sent: Mutex<Vec<Request>>,
    answer: Box<dyn Fn(&Request) -> Response + Send + Sync>,
}

impl ScriptedFetch {
    pub fn new(answer: impl Fn(&Request) -> Response + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self { sent: Mutex::new(Vec::new()), answer: Box::new(answer) })
    }

    /// `200` with the `Authorization` header echoed back as the body,
    /// `401` when there is none.
    pub fn echo_auth() -> Arc<Self> {
        Self::new(|req| match req.header("authorization") {
            Some(auth) => Response::builder().body(auth.to_owned()).unwrap(),
            None => Response::new(StatusCode::UNAUTHORIZED),
        })
    }

    pub fn always(status: StatusCode) -> Arc<Self> {
        Self::new(move |_| Response::new(status))
    }

    pub fn sent(&self) -> Vec<Request> {
        self.sent.lock().unwrap().clone()
    }
}

impl Fetch for ScriptedFetch {
    fn fetch(&self, request: Request) -> BoxFuture<'_, Result<Response, Error>> {
        let response = (self.answer)(&request);
        self.sent.lock().unwrap().push(request);
        Box::pin(async move { Ok(response) })
    }
}

/// Wraps a hub and counts subscriptions, one per token fetch.
#[derive(Default)]
pub struct CountingProvider {
    pub hub: AuthStateHub,
    subscriptions: AtomicUsize,
}

impl CountingProvider {
    pub fn signed_in(token: &str) -> Arc<Self> {
        let provider = Self::default();
        provider.hub.set(Some(Arc::new(StaticIdentity::new(token))));
        Arc::new(provider)
    }

    pub fn signed_out() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn token_fetches(&self) -> usize {
        self.subscriptions.load(Ordering::SeqCst)
    }
}

impl IdentityProvider for CountingProvider {
    fn on_auth_state_changed(&self, listener: AuthStateListener) -> Subscription {
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        self.hub.on_auth_state_changed(listener)
    }
}

pub fn scope() -> Location {
    Location::parse(SCOPE).unwrap()
}

pub fn bearer(options: Options, identity: Arc<CountingProvider>, fetch: Arc<ScriptedFetch>) -> BearerAuth {
    BearerAuth::new(options, scope(), identity, fetch)
}

pub fn get(url: &str) -> Request {
    Request::builder().uri(url).header("accept", "application/json").build().unwrap()
}
