use thiserror::Error;

/// Failures raised while validating parameters or assembling a query string.
///
/// All variants are raised before any network call and carry the offending
/// key/value so the caller can correct its input.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("unexpected parameter: {key}")]
    UnknownParameter { key: String },

    #[error("invalid type for {key}: expected {expected}, got {got}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        got: &'static str,
    },

    #[error("invalid format for {key}: {value:?} does not match {pattern}")]
    Format {
        key: String,
        value: String,
        pattern: String,
    },

    /// The assembled string failed the fragment grammar re-check.
    ///
    /// Individual fragments are validated before joining, so this indicates
    /// a builder defect rather than bad caller input. It is surfaced as a
    /// distinct error instead of an empty string so callers cannot confuse
    /// it with "no filters requested".
    #[error("assembled query string is malformed: {query:?}")]
    MalformedQuery { query: String },
}
