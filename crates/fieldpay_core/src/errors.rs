//! The core error taxonomy.

use fieldpay_interfaces::errors::ConnectorError;
pub use fieldpay_utils::errors::CustomResult;

/// Result alias for core operations.
pub type CoreResult<T> = CustomResult<T, CoreError>;

/// Errors surfaced by the payment core.
///
/// `ConfigurationError` and `CredentialError` are fatal for the affected
/// field; `ValidationError` blocks a single transition and is recoverable;
/// `ProviderError` is a gateway failure the buyer may retry.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The field configuration cannot be processed as written.
    #[error("Configuration error: {message}")]
    ConfigurationError {
        #[allow(missing_docs)]
        message: String,
    },

    /// A local check failed; nothing was sent to the gateway.
    #[error("Validation failed: {message}")]
    ValidationError {
        #[allow(missing_docs)]
        message: String,
    },

    /// The gateway (or the plan registry backing it) failed.
    #[error("{message}")]
    ProviderError {
        #[allow(missing_docs)]
        message: String,
    },

    /// Merchant credentials are missing, incomplete or inactive.
    #[error("Credential error: {message}")]
    CredentialError {
        #[allow(missing_docs)]
        message: String,
    },
}

impl CoreError {
    /// Whether the error permanently blocks checkout for the field.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConfigurationError { .. } | Self::CredentialError { .. }
        )
    }
}

/// Wraps a connector failure into a [`CoreError::ProviderError`] with an
/// operation-prefixed message, preserving the report chain.
pub fn provider_error(
    operation: &str,
    report: error_stack::Report<ConnectorError>,
) -> error_stack::Report<CoreError> {
    let message = format!("{operation}: {}", report.current_context());
    report.change_context(CoreError::ProviderError { message })
}
