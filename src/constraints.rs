//! Resolved matching constraints.
//!
//! [`ConstraintOptions`] is what callers hand in, every field optional.
//! [`Constraints`] is what the eligibility check reads: every field set,
//! built once per middleware and never changed afterwards.

use regex::Regex;

use crate::config::{ConstraintOptions, Types};
use crate::error::Error;

/// A path exclusion.
#[derive(Clone, Debug)]
pub enum PathRule {
    /// Excludes every path starting with this string.
    Prefix(String),
    /// Excludes every path the regex finds a match in.
    Pattern(Regex),
}

impl PathRule {
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self::Prefix(prefix.into())
    }

    /// Compiles `pattern` with the `regex` crate syntax.
    pub fn pattern(pattern: &str) -> Result<Self, Error> {
        Ok(Self::Pattern(Regex::new(pattern)?))
    }

    /// Tests the path component of a URL (no query, no fragment).
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Prefix(prefix) => path.starts_with(prefix.as_str()),
            Self::Pattern(re) => re.is_match(path),
        }
    }
}

/// The canonical constraint set.
#[derive(Clone, Debug)]
pub struct Constraints {
    types: Vec<String>,
    https: bool,
    same_origin: bool,
    ignore_paths: Vec<PathRule>,
}

impl Constraints {
    /// Fills every missing option with its default. Cannot fail.
    ///
    /// | Option | Default |
    /// |---|---|
    /// | `types` | `["*"]` (a single string becomes a one-element list) |
    /// | `https` | `false` |
    /// | `same_origin` | `true` |
    /// | `ignore_paths` | none |
    pub fn resolve(options: ConstraintOptions) -> Self {
        let types = match options.types {
            Some(Types::One(t)) => vec![t],
            Some(Types::Many(ts)) => ts,
            None => vec!["*".to_owned()],
        };
        Self {
            types,
            https: options.https.unwrap_or(false),
            same_origin: options.same_origin.unwrap_or(true),
            ignore_paths: options.ignore_paths.unwrap_or_default(),
        }
    }

    /// Accepted media-type globs.
    pub fn types(&self) -> &[String] { &self.types }
    pub fn https(&self) -> bool { self.https }
    pub fn same_origin(&self) -> bool { self.same_origin }
    pub fn ignore_paths(&self) -> &[PathRule] { &self.ignore_paths }
}

impl Default for Constraints {
    fn default() -> Self {
        Self::resolve(ConstraintOptions::default())
    }
}

impl From<ConstraintOptions> for Constraints {
    fn from(options: ConstraintOptions) -> Self {
        Self::resolve(options)
    }
}
