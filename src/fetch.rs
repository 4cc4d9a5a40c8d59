//! The transport boundary.
//!
//! [`Fetch`] is whatever actually puts a request on the wire. The reactive
//! strategy uses it for its single retry and [`Pipeline`](crate::Pipeline)
//! uses it for the main dispatch. [`HyperFetch`] is a plain-HTTP
//! implementation on hyper's pooled client; hosts that need TLS supply their
//! own `Fetch`.

use bytes::Bytes;
use http::Uri;
use http::uri::Parts;
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use tracing::debug;

use crate::error::Error;
use crate::future::BoxFuture;
use crate::location::{Location, Origin};
use crate::request::{RedirectPolicy, Request, RequestMode};
use crate::response::Response;

/// Sends one request and resolves with its response.
pub trait Fetch: Send + Sync {
    fn fetch(&self, request: Request) -> BoxFuture<'_, Result<Response, Error>>;
}

/// HTTP/1.1 transport built on `hyper_util`'s pooled client.
///
/// - Redirects are never followed; a 3xx comes back as the response, which
///   is what [`RedirectPolicy::Manual`] asks for. With
///   [`RedirectPolicy::Error`] a 3xx becomes [`Error::Redirected`].
/// - Given a [`Location`], relative URLs resolve against it and
///   [`RequestMode::SameOrigin`] requests to another origin fail with
///   [`Error::CrossOrigin`] before any I/O.
/// - Only `http://` URLs are supported.
#[derive(Clone)]
pub struct HyperFetch {
    client: Client<HttpConnector, Full<Bytes>>,
    location: Option<Location>,
}

impl HyperFetch {
    pub fn new() -> Self {
        Self {
            client: Client::builder(TokioExecutor::new()).build_http(),
            location: None,
        }
    }

    /// Enforces same-origin mode against `location` and resolves relative
    /// URLs with it.
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    fn prepare(&self, request: Request) -> Result<Request, Error> {
        let Some(location) = &self.location else {
            return Ok(request);
        };

        let request = if request.uri().scheme().is_none() && request.uri().authority().is_none() {
            Request { uri: resolve(request.uri().clone(), location)?, ..request }
        } else {
            request
        };

        if request.mode() == RequestMode::SameOrigin
            && Origin::from_uri(request.uri()).as_ref() != Some(location.origin())
        {
            return Err(Error::CrossOrigin(request.uri().to_string()));
        }
        Ok(request)
    }
}

impl Default for HyperFetch {
    fn default() -> Self { Self::new() }
}

impl Fetch for HyperFetch {
    fn fetch(&self, request: Request) -> BoxFuture<'_, Result<Response, Error>> {
        Box::pin(async move {
            let request = self.prepare(request)?;
            let url = request.uri().to_string();
            let redirect = request.redirect();

            let res = self
                .client
                .request(request.into_http().map(Full::new))
                .await
                .map_err(|e| Error::Transport(Box::new(e)))?;

            if redirect == RedirectPolicy::Error && res.status().is_redirection() {
                return Err(Error::Redirected(url));
            }

            let (parts, body) = res.into_parts();
            let body = body
                .collect()
                .await
                .map_err(|e| Error::Transport(Box::new(e)))?
                .to_bytes();

            debug!(%url, status = parts.status.as_u16(), bytes = body.len(), "fetched");
            Ok(Response::from(http::Response::from_parts(parts, body)))
        })
    }
}

/// Joins a relative URI onto the scheme and authority of `location`.
fn resolve(uri: Uri, location: &Location) -> Result<Uri, Error> {
    let mut parts = Parts::from(uri);
    parts.scheme = location.uri().scheme().cloned();
    parts.authority = location.uri().authority().cloned();
    if parts.path_and_query.is_none() {
        parts.path_and_query = Some(http::uri::PathAndQuery::from_static("/"));
    }
    Uri::from_parts(parts).map_err(|e| Error::Http(e.into()))
}
