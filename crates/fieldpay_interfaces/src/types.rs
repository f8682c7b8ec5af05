//! Raw response and configuration types shared by connectors.

use serde::Deserialize;

/// A raw HTTP response handed back to the connector for interpretation.
#[derive(Clone, Debug)]
pub struct Response {
    /// HTTP status code.
    pub status_code: u16,
    /// Raw body bytes.
    pub response: bytes::Bytes,
}

impl Response {
    /// Whether the status code is in the success range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// A parsed gateway error, normalized across connectors.
#[derive(Clone, Debug)]
pub struct ErrorResponse {
    /// HTTP status code the gateway answered with.
    pub status_code: u16,
    /// Gateway-assigned error code or name.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Further detail, when the gateway provides any.
    pub reason: Option<String>,
}

/// Base urls of a gateway, one per environment.
#[derive(Clone, Debug, Deserialize)]
pub struct GatewayUrlConfig {
    /// Production API host.
    pub base_url: String,
    /// Sandbox API host.
    pub sandbox_base_url: String,
    /// Partner id used for capability lookups and onboarding referrals.
    #[serde(default)]
    pub partner_id: Option<String>,
}

/// Base urls for every supported gateway.
#[derive(Clone, Debug, Deserialize)]
pub struct GatewayUrls {
    /// PayPal REST hosts.
    pub paypal: GatewayUrlConfig,
}
