//! Validation errors for form fields

use thiserror::Error;

/// Errors raised locally, before anything reaches the network
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// Field name is not part of the configured field set
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// Field declared twice in one field set
    #[error("field {0} declared twice")]
    DuplicateField(String),

    /// Binary habit fields only take "0", "1" or empty
    #[error("field {field} only accepts 0 or 1 (got {value:?})")]
    NotBinary { field: String, value: String },

    /// Numeric fields must parse as a finite number
    #[error("field {field} expects a number (got {value:?})")]
    NotNumeric { field: String, value: String },

    /// Nothing filled in for the requested save
    #[error("{0}")]
    NothingToSave(&'static str),

    /// Date string could not be parsed
    #[error("invalid date {0:?} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    /// Assignment did not have the `name=value` shape
    #[error("invalid field assignment {0:?} (expected name=value)")]
    InvalidAssignment(String),
}
