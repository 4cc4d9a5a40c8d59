//! Outgoing HTTP request type.
//!
//! A [`Request`] is a value. Nothing in this crate edits one in place: to
//! "change" a request you build a new one from a copy of the old one. That
//! keeps a request that is already in flight through other middleware stable.

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method, Uri};

use crate::error::Error;

// ── Fetch policies ────────────────────────────────────────────────────────────

/// Which origins the request may reach.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum RequestMode {
    #[default]
    Cors,
    SameOrigin,
    NoCors,
    Navigate,
}

/// What the transport does when it receives a 3xx.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum RedirectPolicy {
    #[default]
    Follow,
    Error,
    Manual,
}

/// When cookies and other ambient credentials are sent.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CredentialsPolicy {
    Omit,
    #[default]
    SameOrigin,
    Include,
}

// ── Request ──────────────────────────────────────────────────────────────────

/// An outgoing HTTP request.
///
/// ```rust
/// use tsu_bearer::Request;
///
/// let req = Request::builder()
///     .uri("https://app.example.com/api/me")
///     .header("accept", "application/json")
///     .build()
///     .unwrap();
///
/// assert_eq!(req.header("Accept"), Some("application/json"));
/// ```
#[derive(Clone, Debug)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) uri: Uri,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
    pub(crate) mode: RequestMode,
    pub(crate) redirect: RedirectPolicy,
    pub(crate) credentials: CredentialsPolicy,
}

impl Request {
    /// `GET` with default policies and no headers.
    pub fn get(uri: Uri) -> Self {
        Self {
            method: Method::GET,
            uri,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            mode: RequestMode::default(),
            redirect: RedirectPolicy::default(),
            credentials: CredentialsPolicy::default(),
        }
    }

    pub fn builder() -> RequestBuilder {
        RequestBuilder { request: Ok(Self::get(Uri::from_static("/"))) }
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &Bytes { &self.body }
    pub fn mode(&self) -> RequestMode { self.mode }
    pub fn redirect(&self) -> RedirectPolicy { self.redirect }
    pub fn credentials(&self) -> CredentialsPolicy { self.credentials }

    /// Case-insensitive header lookup. Returns the first value when the
    /// header repeats, `None` when it is absent or not visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Converts into an [`http::Request`]. Mode, redirect and credentials
    /// policies travel as request extensions.
    pub fn into_http(self) -> http::Request<Bytes> {
        let mut req = http::Request::new(self.body);
        *req.method_mut() = self.method;
        *req.uri_mut() = self.uri;
        *req.headers_mut() = self.headers;
        req.extensions_mut().insert(self.mode);
        req.extensions_mut().insert(self.redirect);
        req.extensions_mut().insert(self.credentials);
        req
    }
}

/// Reads policies back from extensions when present, defaults otherwise.
impl From<http::Request<Bytes>> for Request {
    fn from(req: http::Request<Bytes>) -> Self {
        let (parts, body) = req.into_parts();
        Self {
            mode: parts.extensions.get().copied().unwrap_or_default(),
            redirect: parts.extensions.get().copied().unwrap_or_default(),
            credentials: parts.extensions.get().copied().unwrap_or_default(),
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
        }
    }
}

// ── RequestBuilder ────────────────────────────────────────────────────────────

/// Fluent builder for [`Request`].
///
/// Obtain via [`Request::builder()`]. The first invalid URI or header is
/// remembered and reported by [`build`](RequestBuilder::build).
pub struct RequestBuilder {
    request: Result<Request, Error>,
}

impl RequestBuilder {
    pub fn method(self, method: Method) -> Self {
        self.map(|mut r| {
            r.method = method;
            Ok(r)
        })
    }

    pub fn uri<T>(self, uri: T) -> Self
    where
        T: TryInto<Uri>,
        T::Error: Into<http::Error>,
    {
        self.map(|mut r| {
            r.uri = uri.try_into().map_err(Into::<http::Error>::into)?;
            Ok(r)
        })
    }

    /// Appends a header; repeated names accumulate.
    pub fn header(self, name: &str, value: &str) -> Self {
        self.map(|mut r| {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(http::Error::from)?;
            let value = HeaderValue::from_str(value).map_err(http::Error::from)?;
            r.headers.append(name, value);
            Ok(r)
        })
    }

    pub fn body(self, body: impl Into<Bytes>) -> Self {
        self.map(|mut r| {
            r.body = body.into();
            Ok(r)
        })
    }

    pub fn mode(self, mode: RequestMode) -> Self {
        self.map(|mut r| {
            r.mode = mode;
            Ok(r)
        })
    }

    pub fn redirect(self, redirect: RedirectPolicy) -> Self {
        self.map(|mut r| {
            r.redirect = redirect;
            Ok(r)
        })
    }

    pub fn credentials(self, credentials: CredentialsPolicy) -> Self {
        self.map(|mut r| {
            r.credentials = credentials;
            Ok(r)
        })
    }

    pub fn build(self) -> Result<Request, Error> {
        self.request
    }

    fn map(self, f: impl FnOnce(Request) -> Result<Request, Error>) -> Self {
        Self { request: self.request.and_then(f) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_match_fetch() {
        let req = Request::builder().uri("https://example.com/").build().unwrap();
        assert_eq!(req.method(), Method::GET);
        assert_eq!(req.mode(), RequestMode::Cors);
        assert_eq!(req.redirect(), RedirectPolicy::Follow);
        assert_eq!(req.credentials(), CredentialsPolicy::SameOrigin);
        assert!(req.body().is_empty());
    }

    #[test]
    fn builder_keeps_repeated_headers() {
        let req = Request::builder()
            .uri("https://example.com/")
            .header("x-tag", "a")
            .header("x-tag", "b")
            .build()
            .unwrap();
        let tags: Vec<_> = req.headers().get_all("x-tag").iter().collect();
        assert_eq!(tags, ["a", "b"]);
    }

    #[test]
    fn builder_reports_the_first_invalid_part() {
        let err = Request::builder()
            .uri("https://example.com/")
            .header("bad header", "x")
            .uri("not a uri at all")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }

    #[test]
    fn policies_survive_the_http_round_trip() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("https://example.com/api")
            .body("{}")
            .mode(RequestMode::SameOrigin)
            .redirect(RedirectPolicy::Manual)
            .credentials(CredentialsPolicy::Include)
            .build()
            .unwrap();

        let back = Request::from(req.into_http());
        assert_eq!(back.method(), Method::POST);
        assert_eq!(back.mode(), RequestMode::SameOrigin);
        assert_eq!(back.redirect(), RedirectPolicy::Manual);
        assert_eq!(back.credentials(), CredentialsPolicy::Include);
        assert_eq!(back.body().as_ref(), b"{}");
    }

    #[test]
    fn plain_http_requests_get_default_policies() {
        let req = Request::from(http::Request::new(Bytes::new()));
        assert_eq!(req.mode(), RequestMode::Cors);
        assert_eq!(req.redirect(), RedirectPolicy::Follow);
    }
}
