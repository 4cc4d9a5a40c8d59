//! Unified error type.

use thiserror::Error;

/// Boxed error coming from a collaborator (identity provider, transport).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type returned by tsu-bearer's fallible operations.
///
/// An ineligible request or a signed-out user is not an error: both are
/// expressed as pass-through. This type surfaces construction problems and
/// failures of the collaborators the middleware talks to. The interception
/// strategies never let one of these escape to the pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// The context URL is not an absolute `http`/`https` URL.
    #[error("invalid location `{0}`")]
    InvalidLocation(String),

    /// Options could not be loaded.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The token cannot be carried in an `Authorization` header.
    #[error("token is not a valid header value")]
    InvalidToken(#[from] http::header::InvalidHeaderValue),

    /// The identity provider dropped the listener without ever notifying it.
    #[error("auth-state signal closed before the first notification")]
    SignalClosed,

    /// The token refresh failed outside the provider's declined path.
    #[error("identity provider: {0}")]
    Identity(#[source] BoxError),

    /// A same-origin mode request targeted another origin.
    #[error("cross-origin request `{0}` refused in same-origin mode")]
    CrossOrigin(String),

    /// A request with the `error` redirect policy received a redirect.
    #[error("request `{0}` was redirected")]
    Redirected(String),

    /// The transport failed to produce a response.
    #[error("transport: {0}")]
    Transport(#[source] BoxError),

    /// A request could not be assembled.
    #[error("invalid request: {0}")]
    Http(#[from] http::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<regex::Error> for Error {
    fn from(e: regex::Error) -> Self {
        Self::Config(e.to_string())
    }
}
