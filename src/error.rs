use thiserror::Error;

use crate::form::Field;

/// Failures of the relay client. Every variant ends an attempt; none is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// One or more credentials were absent or blank at initialization.
    #[error("relay credentials missing: {}", .missing.join(", "))]
    Configuration { missing: Vec<&'static str> },

    #[error("relay client is not initialized")]
    NotInitialized,

    /// The provider (or the local guard standing in for it) answered with a non-200 status.
    #[error("relay rejected the request with status {status}: {text}")]
    Rejected { status: u16, text: String },

    /// DNS, connect, timeout, reset or an unreadable response body.
    #[error("relay transport failed: {0}")]
    Transport(String),
}

/// Everything that can turn a submit into the `Error` status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("required fields are empty: {}", fields_list(.empty))]
    Validation { empty: Vec<Field> },

    #[error(transparent)]
    Relay(#[from] RelayError),
}

fn fields_list(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
