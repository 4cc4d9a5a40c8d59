//! Construction-time options.
//!
//! Options can be built in code or loaded from JSON. The JSON shape uses the
//! same camelCase keys a fetch-plugin config file would carry:
//!
//! ```json
//! {
//!   "awaitResponse": false,
//!   "constraints": {
//!     "types": ["application/json", "text/*"],
//!     "https": true,
//!     "sameOrigin": true,
//!     "ignorePaths": ["/public", { "pattern": "^/static/.+\\.js$" }]
//!   }
//! }
//! ```
//!
//! Loading is forgiving: a value of the wrong shape falls back to the default
//! for that field instead of failing. Only an ignore-path pattern that does
//! not compile is reported as an error.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::constraints::PathRule;
use crate::error::Error;

/// Accepted media types: one glob or a list of them.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Types {
    One(String),
    Many(Vec<String>),
}

impl From<&str> for Types {
    fn from(t: &str) -> Self { Self::One(t.to_owned()) }
}

impl From<String> for Types {
    fn from(t: String) -> Self { Self::One(t) }
}

impl From<Vec<String>> for Types {
    fn from(ts: Vec<String>) -> Self { Self::Many(ts) }
}

impl From<Vec<&str>> for Types {
    fn from(ts: Vec<&str>) -> Self { Self::Many(ts.into_iter().map(str::to_owned).collect()) }
}

impl<const N: usize> From<[&str; N]> for Types {
    fn from(ts: [&str; N]) -> Self { Self::Many(ts.into_iter().map(str::to_owned).collect()) }
}

/// Matching options, every field optional.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintOptions {
    #[serde(default, deserialize_with = "lenient_types")]
    pub types: Option<Types>,
    #[serde(default, deserialize_with = "truthy")]
    pub https: Option<bool>,
    #[serde(default, deserialize_with = "strict_bool")]
    pub same_origin: Option<bool>,
    #[serde(default, deserialize_with = "lenient_paths")]
    pub ignore_paths: Option<Vec<PathRule>>,
}

impl ConstraintOptions {
    pub fn types(mut self, types: impl Into<Types>) -> Self {
        self.types = Some(types.into());
        self
    }

    pub fn https(mut self, https: bool) -> Self {
        self.https = Some(https);
        self
    }

    pub fn same_origin(mut self, same_origin: bool) -> Self {
        self.same_origin = Some(same_origin);
        self
    }

    /// Adds an exclusion; call repeatedly to add several.
    pub fn ignore_path(mut self, rule: PathRule) -> Self {
        self.ignore_paths.get_or_insert_with(Vec::new).push(rule);
        self
    }
}

/// Middleware options.
///
/// `await_response` selects the strategy: `false` attaches tokens before the
/// request is sent, `true` waits for a `401` and retries once.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    #[serde(default, deserialize_with = "truthy_flag")]
    pub await_response: bool,
    #[serde(default, deserialize_with = "lenient_constraints")]
    pub constraints: ConstraintOptions,
}

impl Options {
    pub fn await_response(mut self, await_response: bool) -> Self {
        self.await_response = await_response;
        self
    }

    pub fn constraints(mut self, constraints: ConstraintOptions) -> Self {
        self.constraints = constraints;
        self
    }

    /// Loads options from a JSON document.
    ///
    /// ```rust
    /// use tsu_bearer::Options;
    ///
    /// let opts = Options::from_json(r#"{ "constraints": { "types": "application/json" } }"#).unwrap();
    /// assert!(!opts.await_response);
    /// ```
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }
}

// ── Lenient field readers ─────────────────────────────────────────────────────

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn truthy<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
    Ok(Some(is_truthy(&Value::deserialize(d)?)))
}

fn truthy_flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(is_truthy(&Value::deserialize(d)?))
}

fn strict_bool<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
    Ok(Value::deserialize(d)?.as_bool())
}

fn lenient_types<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Types>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(t) => Some(Types::One(t)),
        Value::Array(items) => Some(Types::Many(
            items
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(t) => Some(t),
                    _ => None,
                })
                .collect(),
        )),
        _ => None,
    })
}

fn lenient_paths<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<PathRule>>, D::Error> {
    let Value::Array(items) = Value::deserialize(d)? else {
        return Ok(None);
    };
    let mut rules = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::String(prefix) => rules.push(PathRule::Prefix(prefix)),
            Value::Object(obj) => {
                if let Some(Value::String(pattern)) = obj.get("pattern") {
                    rules.push(PathRule::pattern(pattern).map_err(D::Error::custom)?);
                }
            }
            _ => {}
        }
    }
    Ok(Some(rules))
}

fn lenient_constraints<'de, D: Deserializer<'de>>(d: D) -> Result<ConstraintOptions, D::Error> {
    match Value::deserialize(d)? {
        v @ Value::Object(_) => ConstraintOptions::deserialize(v).map_err(D::Error::custom),
        _ => Ok(ConstraintOptions::default()),
    }
}
