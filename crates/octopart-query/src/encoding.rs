//! URL component escaping for query-string values.
//!
//! Octopart expects values escaped the way a browser escapes a URI
//! component:
//!
//! - ASCII alphanumerics and `- _ . ! ~ * ' ( )` pass through unchanged
//! - everything else (including `&`, `=`, `[`, `]`, `:` and spaces) is
//!   percent-encoded as UTF-8
//!
//! Field names are never escaped. They are caller-controlled identifiers
//! such as `parent_uid` and are used verbatim inside bracket notation.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters that must be percent-encoded in a query value.
const COMPONENT_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-escape a query value.
///
/// # Examples
///
/// ```
/// use octopart_query::escape;
///
/// assert_eq!(escape("a b"), "a%20b");
/// assert_eq!(escape("1:5"), "1%3A5");
/// assert_eq!(escape("LM358-N"), "LM358-N");
/// ```
#[must_use]
pub fn escape(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT_ESCAPE).to_string()
}

/// Reverse [`escape`].
///
/// # Errors
///
/// Returns error if the decoded bytes are not valid UTF-8.
///
/// # Examples
///
/// ```
/// use octopart_query::{escape, unescape};
///
/// let original = "[{\"mpn\":\"X\"}]";
/// assert_eq!(unescape(&escape(original)).unwrap(), original);
/// ```
pub fn unescape(encoded: &str) -> Result<String, EncodeError> {
    percent_decode_str(encoded)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|e| EncodeError::Utf8Decode(e.to_string()))
}

/// Errors that can occur while turning arguments into query fragments.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    /// A value had a shape the target encoding cannot express
    #[error("unsupported value shape for field `{field}`: {reason}")]
    UnsupportedShape {
        /// Offending field name
        field: String,
        /// What was wrong with it
        reason: String,
    },
    /// Sub-mapping values are not accepted by `filter[fields]` encoding
    #[error("nested filter values are not supported in field filters (field `{field}`)")]
    NestedFilterUnsupported {
        /// Offending field name
        field: String,
    },
    /// A required argument was not supplied
    #[error("missing required argument `{0}`")]
    MissingField(String),
    /// JSON serialization of an argument failed
    #[error("serialization error: {0}")]
    Serialize(String),
    /// Percent-decoding produced invalid UTF-8
    #[error("UTF-8 decode error: {0}")]
    Utf8Decode(String),
}
