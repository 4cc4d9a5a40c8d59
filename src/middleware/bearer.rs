//! Bearer-token middleware.
//!
//! # Two strategies
//!
//! ```text
//! eager     before_dispatch:  eligible? ─ token? ─ send the authorized copy
//! reactive  after_response:   401? ─ eligible? ─ token? ─ fetch the authorized copy once
//! ```
//!
//! Exactly one strategy is active per instance, chosen by
//! [`Options::await_response`](crate::Options). A `401` on the reactive
//! retry is delivered as-is: there is never a second retry.
//!
//! Every "no" along the way (ineligible request, nobody signed in, refresh
//! declined) and every error (identity failure, unusable token, transport
//! failure on the retry) ends the same way: the original request or response
//! goes on as if the middleware were not there.

use std::sync::Arc;

use http::StatusCode;
use tracing::{debug, error};

use crate::authorize::authorize;
use crate::config::Options;
use crate::constraints::Constraints;
use crate::eligibility::is_eligible;
use crate::error::Error;
use crate::fetch::Fetch;
use crate::future::BoxFuture;
use crate::identity::IdentityProvider;
use crate::location::Location;
use crate::middleware::Middleware;
use crate::request::Request;
use crate::response::Response;
use crate::token::fetch_token;

/// Attaches identity tokens to eligible requests.
///
/// The instance holds only configuration and shared handles, so one
/// `BearerAuth` can serve any number of concurrent requests.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use tsu_bearer::{AuthStateHub, BearerAuth, HyperFetch, Location, Options};
///
/// let here = Location::parse("http://localhost:3000/").unwrap();
/// let auth = BearerAuth::new(
///     Options::default(),
///     here.clone(),
///     Arc::new(AuthStateHub::new()),
///     Arc::new(HyperFetch::new().with_location(here)),
/// );
/// ```
pub struct BearerAuth {
    constraints: Constraints,
    await_response: bool,
    location: Location,
    identity: Arc<dyn IdentityProvider>,
    fetch: Arc<dyn Fetch>,
}

impl BearerAuth {
    /// `location` is the URL of the context the middleware runs in.
    /// `fetch` is only used by the reactive strategy.
    pub fn new(
        options: Options,
        location: Location,
        identity: Arc<dyn IdentityProvider>,
        fetch: Arc<dyn Fetch>,
    ) -> Self {
        Self {
            constraints: Constraints::resolve(options.constraints),
            await_response: options.await_response,
            location,
            identity,
            fetch,
        }
    }

    pub fn constraints(&self) -> &Constraints { &self.constraints }
    pub fn awaits_response(&self) -> bool { self.await_response }

    pub fn is_eligible(&self, request: &Request) -> bool {
        is_eligible(request, &self.constraints, &self.location)
    }

    /// Eager strategy: the request to send in place of `request`.
    pub async fn authorize_request(&self, request: Request) -> Request {
        if self.await_response {
            return request;
        }
        if !self.is_eligible(&request) {
            debug!(url = %request.uri(), "not eligible for a token");
            return request;
        }

        match self.authorized(&request).await {
            Ok(Some(authorized)) => authorized,
            Ok(None) => {
                debug!(url = %request.uri(), "no token, sending unauthorized");
                request
            }
            Err(e) => {
                error!(url = %request.uri(), error = %e, "bearer authorization failed");
                request
            }
        }
    }

    /// Reactive strategy: the response to deliver in place of `response`.
    pub async fn retry_unauthorized(&self, request: &Request, response: Response) -> Response {
        if !self.await_response || response.status() != StatusCode::UNAUTHORIZED {
            return response;
        }
        if !self.is_eligible(request) {
            debug!(url = %request.uri(), "401 on a request not eligible for a token");
            return response;
        }

        let retried = match self.authorized(request).await {
            Ok(Some(authorized)) => self.fetch.fetch(authorized).await.map(Some),
            Ok(None) => Ok(None),
            Err(e) => Err(e),
        };

        match retried {
            Ok(Some(fresh)) => {
                debug!(url = %request.uri(), status = fresh.status().as_u16(), "retried with token");
                fresh
            }
            Ok(None) => {
                debug!(url = %request.uri(), "no token, delivering the 401");
                response
            }
            Err(e) => {
                error!(url = %request.uri(), error = %e, "bearer retry failed");
                response
            }
        }
    }

    /// The authorized copy of `request`, or `None` when nobody is signed in.
    async fn authorized(&self, request: &Request) -> Result<Option<Request>, Error> {
        match fetch_token(self.identity.as_ref()).await? {
            Some(token) => authorize(request, &token).map(Some),
            None => Ok(None),
        }
    }
}

impl Middleware for BearerAuth {
    fn before_dispatch(&self, request: Request) -> BoxFuture<'_, Request> {
        Box::pin(self.authorize_request(request))
    }

    fn after_response<'a>(&'a self, request: &'a Request, response: Response) -> BoxFuture<'a, Response> {
        Box::pin(self.retry_unauthorized(request, response))
    }
}
