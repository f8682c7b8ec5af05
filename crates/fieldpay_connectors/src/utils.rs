//! Helpers shared by connector implementations.

use error_stack::report;
use fieldpay_interfaces::errors::ConnectorError;

/// Error constructor for a required field the caller did not supply.
pub fn missing_field_err(
    message: &'static str,
) -> Box<dyn Fn() -> error_stack::Report<ConnectorError> + 'static> {
    Box::new(move || {
        report!(ConnectorError::MissingRequiredField {
            field_name: message,
        })
    })
}
