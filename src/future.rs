//! Boxed futures for object-safe async traits.
//!
//! The middleware holds its collaborators as trait objects
//! (`Arc<dyn IdentityProvider>`, `Arc<dyn Fetch>`, `Arc<dyn Middleware>`) so a
//! pipeline can mix implementations of different concrete types. A trait with
//! an `async fn` is not object safe, so those traits return a [`BoxFuture`]
//! instead:
//!
//! ```text
//! fn fetch(&self, req: Request) -> BoxFuture<'_, Result<Response, Error>> {
//!     Box::pin(async move { … })       ← one allocation per call
//! }
//! ```
//!
//! The cost per call is one heap allocation and one virtual call, which is
//! nothing next to a network round-trip.

use std::future::Future;
use std::pin::Pin;

/// A heap-allocated, type-erased future borrowing from `'a`.
///
/// `Send` lets tokio move it between worker threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
