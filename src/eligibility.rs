//! Decides whether a request may carry a bearer token.
//!
//! Four independent checks, all of which must pass:
//!
//! | Check | Passes when |
//! |---|---|
//! | origin | `same_origin` is off, or the request targets the context origin |
//! | type | the `Accept` header is absent or empty, the type list is empty or holds `*`, or one accepted media type matches one glob |
//! | transport | `https` is off, or the context is `https`, or the context host is `localhost` |
//! | exclusion | no ignore rule matches the request path, dot segments removed |
//!
//! Evaluation is pure: the same request and constraints always give the same
//! answer.

use std::borrow::Cow;

use http::header::ACCEPT;

use crate::constraints::Constraints;
use crate::location::{Location, Origin};
use crate::request::Request;

/// Returns `true` when `request` passes every check in `constraints`.
pub fn is_eligible(request: &Request, constraints: &Constraints, location: &Location) -> bool {
    let same_origin = !constraints.same_origin() || is_same_origin(request, location);
    let type_ok = accepts_type(constraints.types(), accept_header(request).as_deref());
    let secure = !constraints.https() || location.is_secure() || location.hostname() == "localhost";
    let excluded = is_excluded(request, constraints);

    same_origin && type_ok && secure && !excluded
}

/// Relative request URLs resolve against the context, so they are same-origin.
fn is_same_origin(request: &Request, location: &Location) -> bool {
    let uri = request.uri();
    if uri.scheme().is_none() && uri.authority().is_none() {
        return true;
    }
    Origin::from_uri(uri).as_ref() == Some(location.origin())
}

/// All `Accept` values joined the way a fetch `Headers.get` would.
fn accept_header(request: &Request) -> Option<String> {
    let mut values = request.headers().get_all(ACCEPT).into_iter().peekable();
    values.peek()?;
    let joined = values
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .collect::<Vec<_>>()
        .join(", ");
    Some(joined)
}

fn is_excluded(request: &Request, constraints: &Constraints) -> bool {
    let path = remove_dot_segments(request.uri().path());
    constraints.ignore_paths().iter().any(|rule| rule.matches(&path))
}

/// Collapses `.` and `..` segments the way a URL parser does, so
/// `/api/public/../private` is judged as `/api/private`.
fn remove_dot_segments(path: &str) -> Cow<'_, str> {
    if !path.starts_with('/') || !path.split('/').any(|s| s == "." || s == "..") {
        return Cow::Borrowed(path);
    }

    let segments: Vec<&str> = path[1..].split('/').collect();
    let last = segments.len() - 1;
    let mut out: Vec<&str> = Vec::with_capacity(segments.len());
    for (i, segment) in segments.into_iter().enumerate() {
        match segment {
            "." => {}
            ".." => {
                out.pop();
            }
            s => {
                out.push(s);
                continue;
            }
        }
        // a trailing dot segment leaves a directory path behind
        if i == last {
            out.push("");
        }
    }
    Cow::Owned(format!("/{}", out.join("/")))
}

/// The type check on its own.
///
/// An empty header counts as absent. Otherwise the header is split on `,`;
/// each entry loses its `;` parameters and surrounding whitespace before it
/// is compared with the globs.
pub fn accepts_type(types: &[String], accept: Option<&str>) -> bool {
    let Some(accept) = accept.filter(|a| !a.is_empty()) else { return true };
    if types.is_empty() || types.iter().any(|t| t == "*") {
        return true;
    }
    accept
        .split(',')
        .map(|entry| entry.split(';').next().unwrap_or_default().trim())
        .any(|media| types.iter().any(|glob| glob_match(glob, media)))
}

/// Anchored, case-sensitive glob match where every `*` stands for zero or
/// more characters other than `/`. Everything else is literal.
pub fn glob_match(glob: &str, text: &str) -> bool {
    let text = text.as_bytes();
    // matched[j]: the glob prefix consumed so far matches text[..j]
    let mut matched = vec![false; text.len() + 1];
    matched[0] = true;

    for &g in glob.as_bytes() {
        let mut next = vec![false; text.len() + 1];
        if g == b'*' {
            next[0] = matched[0];
            for j in 1..=text.len() {
                next[j] = matched[j] || (next[j - 1] && text[j - 1] != b'/');
            }
        } else {
            for j in 1..=text.len() {
                next[j] = matched[j - 1] && text[j - 1] == g;
            }
        }
        matched = next;
    }

    matched[text.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConstraintOptions;
    use crate::constraints::PathRule;

    fn here() -> Location {
        Location::parse("https://app.example.com/sw.js").unwrap()
    }

    fn get(url: &str) -> Request {
        Request::builder().uri(url).build().unwrap()
    }

    fn accepting(url: &str, accept: &str) -> Request {
        Request::builder().uri(url).header("accept", accept).build().unwrap()
    }

    fn types(ts: &[&str]) -> Vec<String> {
        ts.iter().map(|t| t.to_string()).collect()
    }

    // ── glob ─────────────────────────────────────────────────────────────────

    #[test]
    fn star_covers_one_path_segment() {
        assert!(glob_match("application/*", "application/json"));
        assert!(glob_match("application/*", "application/vnd.api+json"));
        assert!(glob_match("application/*", "application/"));
        assert!(!glob_match("application/*", "text/plain"));
        assert!(!glob_match("*", "text/plain"));
        assert!(glob_match("*/*", "text/plain"));
    }

    #[test]
    fn glob_is_anchored_and_case_sensitive() {
        assert!(!glob_match("json", "application/json"));
        assert!(!glob_match("application/json", "application/json+x"));
        assert!(!glob_match("Application/json", "application/json"));
    }

    #[test]
    fn every_star_expands() {
        assert!(glob_match("application/*+*", "application/vnd.api+json"));
        assert!(glob_match("*/*+json", "application/ld+json"));
        assert!(!glob_match("*/*+json", "application/xml"));
    }

    #[test]
    fn non_star_characters_are_literal() {
        assert!(glob_match("application/vnd.api+json", "application/vnd.api+json"));
        assert!(!glob_match("application/vnd.api+json", "application/vndxapiijson"));
        assert!(!glob_match("text/(html)", "text/html"));
    }

    // ── type check ───────────────────────────────────────────────────────────

    #[test]
    fn wildcard_or_empty_types_accept_anything() {
        for accept in [Some("text/html"), Some("image/png;q=0.8"), None] {
            assert!(accepts_type(&types(&["*"]), accept));
            assert!(accepts_type(&types(&["text/plain", "*"]), accept));
            assert!(accepts_type(&[], accept));
        }
    }

    #[test]
    fn absent_accept_header_passes() {
        assert!(accepts_type(&types(&["application/json"]), None));
    }

    #[test]
    fn empty_accept_header_counts_as_absent() {
        assert!(accepts_type(&types(&["application/json"]), Some("")));

        let c = Constraints::resolve(ConstraintOptions::default().types("application/json"));
        assert!(is_eligible(&accepting("https://app.example.com/api", ""), &c, &here()));
    }

    #[test]
    fn parameters_and_whitespace_are_stripped() {
        let ts = types(&["application/json"]);
        assert!(accepts_type(&ts, Some("text/html, application/json; q=0.9")));
        assert!(accepts_type(&ts, Some("  application/json  ;charset=utf-8")));
        assert!(!accepts_type(&ts, Some("text/html, image/*")));
    }

    #[test]
    fn repeated_accept_headers_are_joined() {
        let req = Request::builder()
            .uri("https://app.example.com/api")
            .header("accept", "text/html")
            .header("accept", "application/json")
            .build()
            .unwrap();
        let c = Constraints::resolve(ConstraintOptions::default().types("application/json"));
        assert!(is_eligible(&req, &c, &here()));
    }

    // ── origin ───────────────────────────────────────────────────────────────

    #[test]
    fn cross_origin_is_refused_by_default() {
        let c = Constraints::default();
        assert!(is_eligible(&get("https://app.example.com/api"), &c, &here()));
        assert!(!is_eligible(&get("https://api.other.com/api"), &c, &here()));
        assert!(!is_eligible(&get("http://app.example.com/api"), &c, &here()));
    }

    #[test]
    fn cross_origin_is_allowed_when_same_origin_is_off() {
        let c = Constraints::resolve(ConstraintOptions::default().same_origin(false));
        assert!(is_eligible(&get("https://api.other.com/api"), &c, &here()));
    }

    #[test]
    fn relative_urls_are_same_origin() {
        assert!(is_eligible(&get("/api/me"), &Constraints::default(), &here()));
    }

    // ── transport ────────────────────────────────────────────────────────────

    #[test]
    fn https_constraint_reads_the_context_protocol() {
        let c = Constraints::resolve(ConstraintOptions::default().https(true));

        let insecure = Location::parse("http://app.example.com/").unwrap();
        assert!(!is_eligible(&get("http://app.example.com/api"), &c, &insecure));

        let secure = here();
        assert!(is_eligible(&get("https://app.example.com/api"), &c, &secure));
    }

    #[test]
    fn localhost_is_trusted_over_http() {
        let c = Constraints::resolve(ConstraintOptions::default().https(true));
        let local = Location::parse("http://localhost:3000/").unwrap();
        assert!(is_eligible(&get("http://localhost:3000/api"), &c, &local));
    }

    // ── exclusion ────────────────────────────────────────────────────────────

    #[test]
    fn ignored_prefixes_exclude() {
        let c = Constraints::resolve(ConstraintOptions::default().ignore_path(PathRule::prefix("/api/public")));
        assert!(!is_eligible(&get("https://app.example.com/api/public/x"), &c, &here()));
        assert!(is_eligible(&get("https://app.example.com/api/private"), &c, &here()));
    }

    #[test]
    fn patterns_see_only_the_path() {
        let c = Constraints::resolve(
            ConstraintOptions::default().ignore_path(PathRule::pattern(r"\.js$").unwrap()),
        );
        assert!(!is_eligible(&get("https://app.example.com/app.js"), &c, &here()));
        assert!(is_eligible(&get("https://app.example.com/api?file=app.js"), &c, &here()));
    }

    #[test]
    fn dot_segments_are_resolved_before_matching() {
        let c = Constraints::resolve(ConstraintOptions::default().ignore_path(PathRule::prefix("/api/public")));
        assert!(is_eligible(&get("https://app.example.com/api/public/../private"), &c, &here()));
        assert!(!is_eligible(&get("https://app.example.com/api/./public/x"), &c, &here()));
    }

    #[test]
    fn remove_dot_segments_follows_url_parsing() {
        assert_eq!(remove_dot_segments("/a/b/c"), "/a/b/c");
        assert_eq!(remove_dot_segments("/a/./b"), "/a/b");
        assert_eq!(remove_dot_segments("/a/b/../c"), "/a/c");
        assert_eq!(remove_dot_segments("/a/b/.."), "/a/");
        assert_eq!(remove_dot_segments("/a/."), "/a/");
        assert_eq!(remove_dot_segments("/../a"), "/a");
        assert_eq!(remove_dot_segments("/.."), "/");
        assert_eq!(remove_dot_segments("/a..b/.c"), "/a..b/.c");
    }

    // ── combined ─────────────────────────────────────────────────────────────

    #[test]
    fn one_failing_check_is_enough() {
        let c = Constraints::resolve(ConstraintOptions::default().types("application/json"));
        assert!(is_eligible(&accepting("https://app.example.com/api", "application/json"), &c, &here()));
        assert!(!is_eligible(&accepting("https://app.example.com/api", "text/html"), &c, &here()));
        assert!(!is_eligible(&accepting("https://other.example.com/api", "application/json"), &c, &here()));
    }

    #[test]
    fn evaluation_is_repeatable() {
        let c = Constraints::resolve(ConstraintOptions::default().types("application/*"));
        let req = accepting("https://app.example.com/api", "application/json");
        assert_eq!(is_eligible(&req, &c, &here()), is_eligible(&req, &c, &here()));
    }
}
