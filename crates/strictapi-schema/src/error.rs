//! # Parse Errors
//!
//! A specification document is rejected at the first violation. The error
//! carries the location prefix of the offending node and a literal
//! description; the rendered text is part of the public contract and is
//! asserted verbatim by callers.

use thiserror::Error;

/// Result alias for parser operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// The specification document falls outside the supported dialect.
///
/// Rendered as `Broken schema: "<prefix>" <detail>`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Broken schema: \"{prefix}\" {detail}")]
pub struct ParseError {
    /// Location of the offending node, e.g. `/paths:/pets:get`.
    pub prefix: String,
    /// What is wrong with it.
    pub detail: String,
}

impl ParseError {
    /// Build an error for the node at `prefix`.
    pub fn at(prefix: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_quotes_prefix() {
        let err = ParseError::at("/info", "missed required keys [\"title\"]");
        assert_eq!(
            err.to_string(),
            r#"Broken schema: "/info" missed required keys ["title"]"#
        );
    }
}
