//! Middleware layer.
//!
//! Middleware intercepts requests and responses at two points of a fetch:
//!
//! | Hook | When | Returns |
//! |---|---|---|
//! | [`before_dispatch`](Middleware::before_dispatch) | before the request is sent | the request to send |
//! | [`after_response`](Middleware::after_response) | after a response arrived | the response to deliver |
//!
//! Hooks cannot fail. A middleware that runs into trouble hands back what it
//! was given and logs; the pipeline always gets a request or a response.
//!
//! Built-in middleware:
//! - [`BearerAuth`]: attaches identity tokens, eagerly or after a `401`

mod bearer;

pub use bearer::BearerAuth;

use crate::future::BoxFuture;
use crate::request::Request;
use crate::response::Response;

/// A pair of pipeline hooks. Both default to pass-through.
pub trait Middleware: Send + Sync {
    fn before_dispatch(&self, request: Request) -> BoxFuture<'_, Request> {
        Box::pin(async move { request })
    }

    /// The request argument is the request that was actually sent.
    fn after_response<'a>(&'a self, _request: &'a Request, response: Response) -> BoxFuture<'a, Response> {
        Box::pin(async move { response })
    }
}
