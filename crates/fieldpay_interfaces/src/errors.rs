//! Connector-level errors.

/// Errors a gateway connector can produce while building requests, talking to
/// the gateway or interpreting its responses.
#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    /// The outbound request could not be constructed from the given inputs.
    #[error("Failed to build the gateway request")]
    RequestBuildFailed,

    /// The request never reached the gateway.
    #[error("Failed to send the request to the gateway: {0}")]
    RequestNotSent(String),

    /// The request was sent but no response arrived within the timeout.
    #[error("The gateway request timed out")]
    RequestTimeout,

    /// The gateway responded with a body that could not be deserialized.
    #[error("Failed to deserialize the gateway response")]
    ResponseDeserializationFailed,

    /// The gateway reported a failure of its own.
    #[error("Gateway returned an error: [{code}] {message}")]
    GatewayError {
        /// Gateway-assigned error code or name.
        code: String,
        /// Human-readable message passed through verbatim.
        message: String,
    },

    /// The merchant credentials could not be turned into gateway
    /// authentication.
    #[error("Failed to obtain the gateway authentication type")]
    FailedToObtainAuthType,

    /// A field required to perform the operation is missing.
    #[error("Missing required field: {field_name}")]
    MissingRequiredField {
        /// The absent field.
        field_name: &'static str,
    },

    /// The requested resource does not exist on the gateway.
    #[error("The requested resource was not found on the gateway")]
    NotFound,
}

impl ConnectorError {
    /// Whether retrying the same call later could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RequestNotSent(_) | Self::RequestTimeout)
    }
}
