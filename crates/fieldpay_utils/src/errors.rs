//! Errors and error-specific types for universal use.

/// A custom result type that wraps the error variant `<E>` into an
/// [`error_stack::Report`], allowing report-specific extendability.
///
/// Effectively equivalent to `Result<T, error_stack::Report<E>>`.
pub type CustomResult<T, E> = error_stack::Result<T, E>;

/// Validation errors.
#[allow(missing_docs)]
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// The provided input is missing a required field.
    #[error("Missing required field: {field_name}")]
    MissingRequiredField { field_name: String },

    /// An incorrect value was provided for the field specified by `field_name`.
    #[error("Incorrect value provided for field: {field_name}")]
    IncorrectValueProvided { field_name: &'static str },

    /// An invalid input was provided.
    #[error("{message}")]
    InvalidValue { message: String },
}

/// Parsing errors.
#[allow(missing_docs)]
#[derive(Debug, thiserror::Error)]
pub enum ParsingError {
    /// Failed to parse a response or stored value into the named structure.
    #[error("Failed to parse {0}")]
    StructParseFailure(&'static str),

    /// Failed to serialize the named structure into its wire form.
    #[error("Failed to serialize to {0} format")]
    EncodeError(&'static str),

    /// Failed to parse a numeric string.
    #[error("Failed to parse {0} as a number")]
    FloatParsingError(&'static str),
}
