//! Builds the authorized copy of a request.

use http::header::{AUTHORIZATION, HeaderValue};

use crate::error::Error;
use crate::request::{RedirectPolicy, Request, RequestMode};

/// Returns a new request carrying `Authorization: Bearer <token>`.
///
/// The original is left untouched. The copy keeps the URL, method, body,
/// credentials policy and every header, and differs in three ways:
///
/// - `Authorization: Bearer <token>` is **appended**. An `Authorization`
///   header already on the request stays, so the copy carries both.
/// - `mode` is [`RequestMode::SameOrigin`].
/// - `redirect` is [`RedirectPolicy::Manual`], so the token cannot be carried
///   along a redirect to some other host.
///
/// Fails only when `token` holds bytes a header value cannot carry.
pub fn authorize(original: &Request, token: &str) -> Result<Request, Error> {
    let mut bearer = HeaderValue::from_str(&format!("Bearer {token}"))?;
    bearer.set_sensitive(true);

    let mut headers = original.headers().clone();
    headers.append(AUTHORIZATION, bearer);

    Ok(Request {
        headers,
        mode: RequestMode::SameOrigin,
        redirect: RedirectPolicy::Manual,
        ..original.clone()
    })
}
