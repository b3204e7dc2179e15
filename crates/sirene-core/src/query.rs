//! Query-string validation and assembly.
//!
//! Every parameter is checked against the endpoint's [`QuerySchema`] before
//! anything is rendered; a single bad entry fails the whole build so no
//! partial query string ever escapes. The assembled string is then
//! re-checked against the fragment grammar `(fragment (& fragment)*)?` as a
//! builder self-check.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, error};

use crate::error::QueryError;
use crate::params::{ParamValue, QueryParams, QuerySchema};

static FRAGMENT_GRAMMAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[^=&]+=[^=&]*&?)*$").expect("fragment grammar compiles"));

/// Validate one `(key, value)` pair against a schema.
///
/// Fails when the key is not in the allow-list, the value's type does not
/// match the declared kind, or a string value fails the registered format
/// pattern (matched from the start of the value).
pub fn validate(key: &str, value: &ParamValue, schema: &QuerySchema) -> Result<(), QueryError> {
    let kind = schema
        .kind_of(key)
        .ok_or_else(|| QueryError::UnknownParameter {
            key: key.to_string(),
        })?;

    if !kind.accepts(value) {
        return Err(QueryError::TypeMismatch {
            key: key.to_string(),
            expected: kind.expected_name(),
            got: value.type_name(),
        });
    }

    if let ParamValue::Str(s) = value
        && let Some(pattern) = schema.pattern_of(key)
        && !pattern.is_match(s)
    {
        return Err(QueryError::Format {
            key: key.to_string(),
            value: s.clone(),
            pattern: pattern.to_string(),
        });
    }

    Ok(())
}

/// Build a query string from ordered parameters.
///
/// Fragments are rendered as `key=value` (list values comma-joined) and
/// joined with `&` in the caller's supplied order. An empty input yields
/// `Ok("")`. Any validation failure propagates unchanged; a grammar failure
/// on the assembled string is a builder defect and surfaces as
/// [`QueryError::MalformedQuery`] rather than a silent empty string.
pub fn build_query_string(
    params: &QueryParams,
    schema: &QuerySchema,
) -> Result<String, QueryError> {
    let mut fragments = Vec::with_capacity(params.len());

    for (key, value) in params.iter() {
        validate(key, value, schema)?;
        fragments.push(format!("{key}={}", value.render()));
    }

    let query = fragments.join("&");
    if !FRAGMENT_GRAMMAR.is_match(&query) {
        error!(query = %query, "assembled query string failed grammar re-check");
        return Err(QueryError::MalformedQuery { query });
    }

    debug!(query = %query, "built query string");
    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bulk() -> QuerySchema {
        QuerySchema::bulk()
    }

    #[test]
    fn unknown_key_rejected() {
        let err = validate("sort_by", &ParamValue::Str("x".into()), &bulk()).unwrap_err();
        assert!(matches!(err, QueryError::UnknownParameter { key } if key == "sort_by"));
    }

    #[test]
    fn type_mismatch_rejected() {
        let err = validate("q", &ParamValue::Int(7), &bulk()).unwrap_err();
        assert!(matches!(
            err,
            QueryError::TypeMismatch { ref key, expected: "string", got: "integer" } if key == "q"
        ));
    }

    #[test]
    fn matching_type_passes() {
        validate("q", &ParamValue::Str("boulangerie".into()), &bulk()).unwrap();
        validate("nombre", &ParamValue::Int(50), &bulk()).unwrap();
        validate("nombre", &ParamValue::Str("50".into()), &bulk()).unwrap();
        validate(
            "tri",
            &ParamValue::List(vec!["siren".into(), "-dateCreation".into()]),
            &bulk(),
        )
        .unwrap();
    }

    #[test]
    fn bad_date_format_rejected() {
        let err = validate("date", &ParamValue::Str("31/01/2024".into()), &bulk()).unwrap_err();
        assert!(matches!(err, QueryError::Format { ref key, .. } if key == "date"));
    }

    #[test]
    fn bad_bool_format_rejected() {
        let err = validate(
            "masquerValeursNulles",
            &ParamValue::Str("yes".into()),
            &bulk(),
        )
        .unwrap_err();
        assert!(matches!(err, QueryError::Format { .. }));
    }

    #[test]
    fn good_formats_pass() {
        validate("date", &ParamValue::Str("2024-01-31".into()), &bulk()).unwrap();
        validate(
            "masquerValeursNulles",
            &ParamValue::Str("true".into()),
            &bulk(),
        )
        .unwrap();
    }

    #[test]
    fn round_trip_preserves_order() {
        let mut params = QueryParams::new();
        params.push("q", "boulangerie");
        params.push("champs", vec!["nom".to_string(), "siren".to_string()]);
        let query = build_query_string(&params, &bulk()).unwrap();
        assert_eq!(query, "q=boulangerie&champs=nom,siren");
    }

    #[test]
    fn build_is_idempotent() {
        let mut params = QueryParams::new();
        params.push("q", "carrefour");
        params.push("nombre", 100i64);
        params.push("curseur", "*");
        let first = build_query_string(&params, &bulk()).unwrap();
        let second = build_query_string(&params, &bulk()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, "q=carrefour&nombre=100&curseur=*");
    }

    #[test]
    fn empty_params_build_empty_string() {
        let query = build_query_string(&QueryParams::new(), &bulk()).unwrap();
        assert_eq!(query, "");
    }

    #[test]
    fn validation_failure_yields_no_partial_string() {
        let mut params = QueryParams::new();
        params.push("q", "boulangerie");
        params.push("unknown", "x");
        let err = build_query_string(&params, &bulk()).unwrap_err();
        assert!(matches!(err, QueryError::UnknownParameter { .. }));
    }

    #[test]
    fn grammar_accepts_built_fragments() {
        let mut params = QueryParams::new();
        params.push("q", "a b c");
        params.push("facette", vec!["one".to_string(), "two".to_string()]);
        params.push("masquerValeursNulles", "false");
        build_query_string(&params, &bulk()).unwrap();
    }

    #[test]
    fn reserved_characters_in_value_surface_as_malformed() {
        // Values are not percent-encoded, so a stray `&` breaks the
        // fragment grammar. The failure is a distinct error, never an
        // empty string a caller could mistake for "no filters".
        let mut params = QueryParams::new();
        params.push("q", "boulangerie&patisserie");
        let err = build_query_string(&params, &bulk()).unwrap_err();
        assert!(matches!(err, QueryError::MalformedQuery { .. }));
    }
}
