//! Purpose: Scalar coercion and owned C-string extraction for ABI calls.
//! Exports: `ConfigValue`, `c_string`.
//! Invariants: Extraction either yields a fully owned NUL-terminated UTF-8
//! string or leaves nothing allocated behind.
//! Invariants: Interior NUL bytes are an encoding error, never truncation.

use std::ffi::CString;

use crate::core::error::{Error, ErrorKind};

/// A config value as handed over by a host embedding. Hosts with a native
/// string coercion (JS `ToString`, Python `str()`) apply it before crossing
/// into the core and pass `Str`; hosts without one pass the typed scalar and
/// the core renders the canonical form.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConfigValue {
    Str(String),
    Bool(bool),
    Int(i64),
}

impl ConfigValue {
    /// Canonical textual form crossing the boundary: `true`/`false` for
    /// booleans, decimal digits for integers, strings verbatim.
    pub fn into_text(self) -> String {
        match self {
            ConfigValue::Str(text) => text,
            ConfigValue::Bool(flag) => flag.to_string(),
            ConfigValue::Int(number) => number.to_string(),
        }
    }
}

/// Extracts `text` as an owned NUL-terminated C string. `what` names the
/// argument position in the error message.
pub fn c_string(text: &str, what: &str) -> Result<CString, Error> {
    CString::new(text).map_err(|err| {
        Error::new(
            ErrorKind::Encoding,
            format!("{what} contains an interior NUL byte"),
        )
        .with_source(err)
    })
}

#[cfg(test)]
mod tests {
    use super::{ConfigValue, c_string};
    use crate::core::error::ErrorKind;

    #[test]
    fn scalars_render_canonical_text() {
        assert_eq!(ConfigValue::Bool(true).into_text(), "true");
        assert_eq!(ConfigValue::Bool(false).into_text(), "false");
        assert_eq!(ConfigValue::Int(42).into_text(), "42");
        assert_eq!(ConfigValue::Int(-7).into_text(), "-7");
        assert_eq!(
            ConfigValue::Str("keep-whitespace".to_string()).into_text(),
            "keep-whitespace"
        );
    }

    #[test]
    fn extraction_preserves_bytes() {
        let extracted = c_string("text/css", "mediatype").expect("c_string");
        assert_eq!(extracted.as_bytes(), b"text/css");
        assert_eq!(extracted.as_bytes_with_nul(), b"text/css\0");
    }

    #[test]
    fn interior_nul_is_an_encoding_error() {
        let err = c_string("a\0b", "input").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Encoding);
        assert!(err.message().contains("input"));
    }
}
