//! # Validation Errors
//!
//! Every outcome other than success is one of three kinds. The message text
//! is part of the public contract: callers and tests match on it verbatim.

use thiserror::Error;

/// Failure of a `validate_request` / `validate_response` call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The specification could not be fetched or parsed. Carries the
    /// retained failure message unchanged.
    #[error("{0}")]
    BrokenSchema(String),

    /// The request or response does not conform to the specification.
    #[error("{0}")]
    RequestValidation(String),

    /// The response status has neither an exact nor a `default` entry.
    #[error("{0}")]
    NotFoundSpecForStatus(String),
}

impl ValidationError {
    /// Message without the variant.
    pub fn message(&self) -> &str {
        match self {
            Self::BrokenSchema(m) | Self::RequestValidation(m) | Self::NotFoundSpecForStatus(m) => m,
        }
    }
}
