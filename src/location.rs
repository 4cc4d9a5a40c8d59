//! The context the middleware runs in.
//!
//! A worker-style fetch interceptor always lives at some URL: its scope.
//! Same-origin checks compare against that scope's origin, and the
//! transport-security check reads that scope's protocol and hostname.

use std::fmt;

use http::Uri;

use crate::error::Error;

/// A URL origin: scheme, host and port.
///
/// Scheme and host are lower-cased and the default port for the scheme is
/// elided, so `https://Example.com:443` and `https://example.com` compare
/// equal.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Origin {
    scheme: String,
    host: String,
    port: Option<u16>,
}

impl Origin {
    /// Returns the origin of an absolute URI, or `None` for relative ones.
    pub fn from_uri(uri: &Uri) -> Option<Self> {
        let scheme = uri.scheme_str()?.to_ascii_lowercase();
        let host = uri.host()?.to_ascii_lowercase();
        let port = uri.port_u16().filter(|&p| Some(p) != default_port(&scheme));
        Some(Self { scheme, host, port })
    }

    pub fn scheme(&self) -> &str { &self.scheme }
    pub fn host(&self) -> &str { &self.host }
    pub fn port(&self) -> Option<u16> { self.port }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.host)?;
        if let Some(port) = self.port {
            write!(f, ":{port}")?;
        }
        Ok(())
    }
}

fn default_port(scheme: &str) -> Option<u16> {
    match scheme {
        "http" => Some(80),
        "https" => Some(443),
        _ => None,
    }
}

/// The URL of the active context.
#[derive(Clone, Debug)]
pub struct Location {
    uri: Uri,
    origin: Origin,
}

impl Location {
    /// Parses an absolute `http` or `https` URL.
    ///
    /// ```rust
    /// use tsu_bearer::Location;
    ///
    /// let here = Location::parse("https://app.example.com/sw.js").unwrap();
    /// assert!(here.is_secure());
    /// assert_eq!(here.origin().to_string(), "https://app.example.com");
    /// ```
    pub fn parse(url: &str) -> Result<Self, Error> {
        let uri: Uri = url.parse().map_err(|_| Error::InvalidLocation(url.to_owned()))?;
        Self::from_uri(uri)
    }

    pub fn from_uri(uri: Uri) -> Result<Self, Error> {
        let origin = Origin::from_uri(&uri)
            .filter(|o| matches!(o.scheme(), "http" | "https"))
            .ok_or_else(|| Error::InvalidLocation(uri.to_string()))?;
        Ok(Self { uri, origin })
    }

    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn origin(&self) -> &Origin { &self.origin }
    pub fn hostname(&self) -> &str { self.origin.host() }

    /// `true` when the context was loaded over `https`.
    pub fn is_secure(&self) -> bool {
        self.origin.scheme() == "https"
    }
}
