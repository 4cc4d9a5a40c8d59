//! Incoming HTTP response type.
//!
//! Middleware only ever reads a [`Response`] or swaps it for another one.

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, StatusCode};

use crate::error::Error;

/// An HTTP response as seen by the pipeline.
///
/// ```rust
/// use http::StatusCode;
/// use tsu_bearer::Response;
///
/// let res = Response::builder()
///     .status(StatusCode::UNAUTHORIZED)
///     .header("www-authenticate", "Bearer")
///     .body("sign in first")
///     .unwrap();
///
/// assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
/// ```
#[derive(Clone, Debug)]
pub struct Response {
    pub(crate) status: StatusCode,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
}

impl Response {
    /// Response with no headers and no body.
    pub fn new(status: StatusCode) -> Self {
        Self { status, headers: HeaderMap::new(), body: Bytes::new() }
    }

    /// Builder for responses that need headers or a body. Defaults to `200 OK`.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: Vec::new(), status: StatusCode::OK }
    }

    pub fn status(&self) -> StatusCode { self.status }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &Bytes { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl From<http::Response<Bytes>> for Response {
    fn from(res: http::Response<Bytes>) -> Self {
        let (parts, body) = res.into_parts();
        Self { status: parts.status, headers: parts.headers, body }
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Terminated by [`body`](Self::body) or
/// [`no_body`](Self::no_body); both validate the collected headers.
pub struct ResponseBuilder {
    headers: Vec<(String, String)>,
    status: StatusCode,
}

impl ResponseBuilder {
    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn body(self, body: impl Into<Bytes>) -> Result<Response, Error> {
        let mut headers = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(http::Error::from)?;
            let value = HeaderValue::from_str(value).map_err(http::Error::from)?;
            headers.append(name, value);
        }
        Ok(Response { status: self.status, headers, body: body.into() })
    }

    pub fn no_body(self) -> Result<Response, Error> {
        self.body(Bytes::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_to_ok() {
        let res = Response::builder().no_body().unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().is_empty());
    }

    #[test]
    fn builder_rejects_invalid_header_names() {
        let err = Response::builder().header("no spaces", "x").no_body().unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }

    #[test]
    fn converts_from_http() {
        let res = http::Response::builder()
            .status(StatusCode::CREATED)
            .header("location", "/users/99")
            .body(Bytes::from_static(b"{}"))
            .unwrap();
        let res = Response::from(res);
        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(res.header("Location"), Some("/users/99"));
        assert_eq!(res.body().as_ref(), b"{}");
    }
}
