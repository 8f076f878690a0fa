//! Argument Decoders
//!
//! Each decoder turns one raw token into a typed value or a [`DecodeError`].
//! Handlers call them in argument order and stop at the first failure.

use crate::store::Hash;
use std::num::ParseIntError;
use thiserror::Error;

/// Errors produced while decoding a single argument.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The token is not a base-10 integer literal
    #[error("invalid integer '{token}': {source}")]
    InvalidInteger {
        token: String,
        #[source]
        source: ParseIntError,
    },

    /// The token is not a JSON array of strings
    #[error("invalid array: {0}")]
    InvalidSequence(#[source] serde_json::Error),

    /// The token is not a JSON object with string values
    #[error("invalid hash: {0}")]
    InvalidMapping(#[source] serde_json::Error),

    #[error("name must not be empty")]
    EmptyName,
}

/// Decodes a base-10 integer such as `42`, `-7` or `+3`.
pub fn integer(token: &str) -> Result<i64, DecodeError> {
    token
        .parse()
        .map_err(|source| DecodeError::InvalidInteger {
            token: token.to_string(),
            source,
        })
}

/// Accepts any non-empty token verbatim.
pub fn name(token: &str) -> Result<&str, DecodeError> {
    if token.is_empty() {
        return Err(DecodeError::EmptyName);
    }
    Ok(token)
}

/// Strips one leading and one trailing double quote, if present.
///
/// Malformed quoting is accepted as-is: `"abc` decodes to `abc`.
pub fn string(token: &str) -> &str {
    let token = token.strip_prefix('"').unwrap_or(token);
    token.strip_suffix('"').unwrap_or(token)
}

/// Decodes a JSON array of strings: `["a","b"]`.
pub fn sequence(token: &str) -> Result<Vec<String>, DecodeError> {
    serde_json::from_str(token).map_err(DecodeError::InvalidSequence)
}

/// Decodes a JSON object with string keys and values: `{"k":"v"}`.
pub fn mapping(token: &str) -> Result<Hash, DecodeError> {
    serde_json::from_str(token).map_err(DecodeError::InvalidMapping)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer() {
        assert_eq!(integer("42").unwrap(), 42);
        assert_eq!(integer("-7").unwrap(), -7);
        assert_eq!(integer("+3").unwrap(), 3);

        let err = integer("abc").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidInteger { ref token, .. } if token == "abc"));
        assert!(integer("1.5").is_err());
        assert!(integer("").is_err());
    }

    #[test]
    fn test_name() {
        assert_eq!(name("user:101").unwrap(), "user:101");
        assert_eq!(name(r#""quoted""#).unwrap(), r#""quoted""#);
        assert!(matches!(name(""), Err(DecodeError::EmptyName)));
    }

    #[test]
    fn test_string() {
        assert_eq!(string(r#""Hello World!""#), "Hello World!");
        assert_eq!(string("plain"), "plain");
        assert_eq!(string(r#""open"#), "open");
        assert_eq!(string(r#"close""#), "close");
        assert_eq!(string(r#"""x"""#), r#""x""#);
        assert_eq!(string(r#"""#), "");
    }

    #[test]
    fn test_sequence() {
        assert_eq!(sequence(r#"["a", "b"]"#).unwrap(), vec!["a", "b"]);
        assert!(sequence("[]").unwrap().is_empty());
        assert!(matches!(
            sequence(r#"["a", 1]"#),
            Err(DecodeError::InvalidSequence(_))
        ));
        assert!(matches!(sequence("[a"), Err(DecodeError::InvalidSequence(_))));
    }

    #[test]
    fn test_mapping() {
        let hash = mapping(r#"{"k": "v", "n": "m"}"#).unwrap();
        assert_eq!(hash.len(), 2);
        assert_eq!(hash["k"], "v");

        assert!(matches!(
            mapping(r#"{"k": 1}"#),
            Err(DecodeError::InvalidMapping(_))
        ));
        assert!(matches!(mapping("{bad"), Err(DecodeError::InvalidMapping(_))));
        assert!(matches!(mapping(r#"["a"]"#), Err(DecodeError::InvalidMapping(_))));
    }
}
