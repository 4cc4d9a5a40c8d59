//! # tsu-bearer
//!
//! Bearer-token middleware for fetch pipelines. For every outgoing request it
//! decides whether the request may carry the signed-in user's ID token, and
//! if so, hands the pipeline an authorized copy.
//!
//! ## The contract
//!
//! The identity provider owns sign-in, token issuance and refresh. The
//! transport owns the network. tsu-bearer owns the part in between:
//!
//! - **Eligibility**: origin, `Accept` type, transport security and path
//!   exclusions, evaluated per request ([`eligibility`])
//! - **Tokens**: one forced refresh per attempt, never cached ([`token`])
//! - **Authorization**: an immutable copy with `Authorization: Bearer …`,
//!   same-origin mode and manual redirects ([`authorize`])
//! - **Strategies**: attach before sending, or retry once after a `401`
//!   ([`BearerAuth`])
//!
//! A request that fails any of that goes out exactly as it came in.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tsu_bearer::{AuthStateHub, BearerAuth, HyperFetch, Location, Options, Pipeline, Request, StaticIdentity};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), tsu_bearer::Error> {
//!     let here = Location::parse("http://localhost:3000/")?;
//!     let transport = Arc::new(HyperFetch::new().with_location(here.clone()));
//!
//!     // The host signs users in and publishes the result.
//!     let hub = AuthStateHub::new();
//!     hub.set(Some(Arc::new(StaticIdentity::new("token-from-sign-in"))));
//!
//!     let options = Options::from_json(r#"{ "constraints": { "types": "application/json" } }"#)?;
//!     let auth = BearerAuth::new(options, here, Arc::new(hub), transport.clone());
//!     let pipeline = Pipeline::new(transport).with(auth);
//!
//!     let req = Request::builder()
//!         .uri("/api/me")
//!         .header("accept", "application/json")
//!         .build()?;
//!     let res = pipeline.fetch(req).await?;
//!     println!("{}", res.status());
//!     Ok(())
//! }
//! ```

mod error;
mod future;
mod location;
mod pipeline;
mod request;
mod response;

pub mod authorize;
pub mod config;
pub mod constraints;
pub mod eligibility;
pub mod fetch;
pub mod identity;
pub mod middleware;
pub mod token;

pub use config::{ConstraintOptions, Options, Types};
pub use constraints::{Constraints, PathRule};
pub use error::{BoxError, Error};
pub use fetch::{Fetch, HyperFetch};
pub use future::BoxFuture;
pub use identity::{
    AuthState, AuthStateHub, AuthStateListener, Identity, IdentityProvider, RefreshError,
    StaticIdentity, Subscription,
};
pub use location::{Location, Origin};
pub use middleware::{BearerAuth, Middleware};
pub use pipeline::Pipeline;
pub use request::{CredentialsPolicy, RedirectPolicy, Request, RequestBuilder, RequestMode};
pub use response::{Response, ResponseBuilder};
