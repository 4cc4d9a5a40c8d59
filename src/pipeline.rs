//! A minimal host pipeline.
//!
//! The pipeline owns the transport and a list of middleware and runs one
//! fetch through them:
//!
//! 1. every `before_dispatch`, in registration order, each seeing the
//!    request the previous one returned;
//! 2. the transport, with the final request;
//! 3. every `after_response`, in registration order, each seeing the
//!    dispatched request and the response the previous one returned.
//!
//! Transport errors are returned to the caller. Middleware cannot fail.

use std::sync::Arc;

use tracing::{debug, info_span, Instrument};

use crate::error::Error;
use crate::fetch::Fetch;
use crate::future::BoxFuture;
use crate::middleware::Middleware;
use crate::request::Request;
use crate::response::Response;

/// Runs fetches through a middleware chain.
///
/// ```rust,no_run
/// # use std::sync::Arc;
/// # use tsu_bearer::{AuthStateHub, BearerAuth, HyperFetch, Location, Options, Pipeline, Request};
/// # async fn run() -> Result<(), tsu_bearer::Error> {
/// let here = Location::parse("http://localhost:3000/")?;
/// let transport = Arc::new(HyperFetch::new().with_location(here.clone()));
/// let auth = BearerAuth::new(Options::default(), here, Arc::new(AuthStateHub::new()), transport.clone());
///
/// let pipeline = Pipeline::new(transport).with(auth);
/// let res = pipeline.fetch(Request::builder().uri("/api/me").build()?).await?;
/// # Ok(()) }
/// ```
#[derive(Clone)]
pub struct Pipeline {
    transport: Arc<dyn Fetch>,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl Pipeline {
    pub fn new(transport: Arc<dyn Fetch>) -> Self {
        Self { transport, middleware: Vec::new() }
    }

    /// Appends a middleware. Returns `self` for chaining.
    pub fn with(self, middleware: impl Middleware + 'static) -> Self {
        self.with_shared(Arc::new(middleware))
    }

    /// Appends a middleware that is also used elsewhere.
    pub fn with_shared(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middleware.push(middleware);
        self
    }

    pub async fn fetch(&self, request: Request) -> Result<Response, Error> {
        let span = info_span!("fetch", method = %request.method(), url = %request.uri());
        async move {
            let mut request = request;
            for m in &self.middleware {
                request = m.before_dispatch(request).await;
            }

            let mut response = self.transport.fetch(request.clone()).await?;
            for m in &self.middleware {
                response = m.after_response(&request, response).await;
            }

            debug!(status = response.status().as_u16(), "delivered");
            Ok(response)
        }
        .instrument(span)
        .await
    }
}

/// A pipeline is itself a transport, so pipelines nest.
impl Fetch for Pipeline {
    fn fetch(&self, request: Request) -> BoxFuture<'_, Result<Response, Error>> {
        Box::pin(Pipeline::fetch(self, request))
    }
}
