//! Typed query parameters and per-endpoint allow-list schemas.
//!
//! The registry exposes two logical endpoints (bulk search and fetch by
//! identifier) that accept different parameter sets. Each set is described
//! by a [`QuerySchema`]: a key → accepted-type table plus optional
//! format patterns for string values. Callers assemble an ordered
//! [`QueryParams`] and the builder in [`crate::query`] validates it against
//! the schema for the endpoint being hit.

use std::sync::LazyLock;

use regex::Regex;

/// A single query parameter value: a string, an integer, or a list of
/// strings rendered comma-joined (`champs=nom,siren`).
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    List(Vec<String>),
}

impl ParamValue {
    /// Name of the runtime type, used in type-mismatch errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamValue::Str(_) => "string",
            ParamValue::Int(_) => "integer",
            ParamValue::List(_) => "list",
        }
    }

    /// Render the value as it appears on the right side of `key=`.
    pub fn render(&self) -> String {
        match self {
            ParamValue::Str(s) => s.clone(),
            ParamValue::Int(n) => n.to_string(),
            ParamValue::List(items) => items.join(","),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Str(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Str(s)
    }
}

impl From<i64> for ParamValue {
    fn from(n: i64) -> Self {
        ParamValue::Int(n)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(items: Vec<String>) -> Self {
        ParamValue::List(items)
    }
}

impl From<&[&str]> for ParamValue {
    fn from(items: &[&str]) -> Self {
        ParamValue::List(items.iter().map(|s| s.to_string()).collect())
    }
}

/// The type(s) a schema accepts for a key. `StrOrInt` mirrors parameters
/// like `nombre` that the registry takes as either form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Str,
    StrOrInt,
    List,
}

impl ParamKind {
    pub fn accepts(&self, value: &ParamValue) -> bool {
        match self {
            ParamKind::Str => matches!(value, ParamValue::Str(_)),
            ParamKind::StrOrInt => matches!(value, ParamValue::Str(_) | ParamValue::Int(_)),
            ParamKind::List => matches!(value, ParamValue::List(_)),
        }
    }

    /// Human name of the accepted type(s), used in type-mismatch errors.
    pub fn expected_name(&self) -> &'static str {
        match self {
            ParamKind::Str => "string",
            ParamKind::StrOrInt => "string or integer",
            ParamKind::List => "list",
        }
    }
}

/// An insertion-ordered collection of query parameters.
///
/// Order matters: fragments are joined in the order the caller supplied
/// them, so the built query string is reproducible.
#[derive(Debug, Clone, Default)]
pub struct QueryParams(Vec<(String, ParamValue)>);

impl QueryParams {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.push((key.into(), value.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").expect("date pattern compiles"));

static BOOL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:true|false)").expect("bool pattern compiles"));

/// Allow-list and format rules for one logical endpoint.
#[derive(Debug, Clone, Copy)]
pub struct QuerySchema {
    kinds: &'static [(&'static str, ParamKind)],
    patterns: &'static [(&'static str, &'static LazyLock<Regex>)],
}

const BULK_KINDS: &[(&str, ParamKind)] = &[
    ("q", ParamKind::Str),
    ("date", ParamKind::Str),
    ("curseur", ParamKind::Str),
    ("debut", ParamKind::Str),
    ("nombre", ParamKind::StrOrInt),
    ("tri", ParamKind::List),
    ("champs", ParamKind::List),
    ("facette", ParamKind::List),
    ("masquerValeursNulles", ParamKind::Str),
];

const BY_ID_KINDS: &[(&str, ParamKind)] = &[
    ("date", ParamKind::Str),
    ("champs", ParamKind::List),
    ("masquerValeursNulles", ParamKind::Str),
];

static STRING_PATTERNS: &[(&str, &LazyLock<Regex>)] = &[
    ("date", &DATE_PATTERN),
    ("masquerValeursNulles", &BOOL_PATTERN),
];

impl QuerySchema {
    /// Schema for the bulk search endpoint (`/{entity}?q=...`).
    pub fn bulk() -> Self {
        Self {
            kinds: BULK_KINDS,
            patterns: STRING_PATTERNS,
        }
    }

    /// Schema for the by-identifier endpoint (`/{entity}/{id}?...`).
    pub fn by_id() -> Self {
        Self {
            kinds: BY_ID_KINDS,
            patterns: STRING_PATTERNS,
        }
    }

    pub fn kind_of(&self, key: &str) -> Option<ParamKind> {
        self.kinds
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, kind)| *kind)
    }

    /// Format pattern for `key`, if one is registered. Patterns apply to
    /// string values only and must match from the start of the value.
    pub fn pattern_of(&self, key: &str) -> Option<&Regex> {
        self.patterns
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, re)| &***re)
    }
}
