//! Merchant credentials, capabilities and onboarding types.

use fieldpay_utils::errors::ValidationError;
use masking::Secret;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::enums::{GatewayEnvironment, PaymentMethodKind, PaymentProvider};

/// Capability flags a merchant account supports, as reported by the gateway.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MerchantCapabilities {
    #[allow(missing_docs)]
    pub cards: bool,
    #[allow(missing_docs)]
    pub venmo: bool,
    #[allow(missing_docs)]
    pub google_pay: bool,
    #[allow(missing_docs)]
    pub pay_later: bool,
}

impl Default for MerchantCapabilities {
    fn default() -> Self {
        Self {
            cards: true,
            venmo: false,
            google_pay: false,
            pay_later: false,
        }
    }
}

impl MerchantCapabilities {
    /// Whether the merchant can accept the given buyer-facing method.
    ///
    /// PayPal itself needs no capability flag; it is implied by the account
    /// being active.
    pub fn supports(&self, method: PaymentMethodKind) -> bool {
        match method {
            PaymentMethodKind::Paypal => true,
            PaymentMethodKind::Card => self.cards,
            PaymentMethodKind::Venmo => self.venmo,
            PaymentMethodKind::GooglePay => self.google_pay,
        }
    }
}

/// A merchant identity resolved from an account identifier.
#[derive(Clone, Debug, Deserialize)]
pub struct MerchantCredentials {
    /// Gateway these credentials belong to.
    pub provider: PaymentProvider,
    /// Gateway merchant id.
    pub merchant_id: String,
    /// OAuth client id, absent for direct-id merchants.
    pub client_id: Option<String>,
    /// OAuth client secret, absent for direct-id merchants.
    pub client_secret: Option<Secret<String>>,
    /// Environment the account operates in.
    pub environment: GatewayEnvironment,
    /// Whether the account is currently able to take payments.
    pub is_active: bool,
    /// Capability flags reported for the account.
    #[serde(default)]
    pub capabilities: MerchantCapabilities,
}

impl MerchantCredentials {
    /// Synthesizes minimal active credentials for a direct gateway merchant
    /// id, with default capabilities.
    pub fn direct(
        provider: PaymentProvider,
        merchant_id: impl Into<String>,
        environment: GatewayEnvironment,
    ) -> Self {
        Self {
            provider,
            merchant_id: merchant_id.into(),
            client_id: None,
            client_secret: None,
            environment,
            is_active: true,
            capabilities: MerchantCapabilities::default(),
        }
    }

    /// Rejects credentials that cannot be used for processing: inactive
    /// accounts and records with an empty merchant id.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.merchant_id.trim().is_empty() {
            return Err(ValidationError::MissingRequiredField {
                field_name: "merchant_id".to_owned(),
            });
        }
        if !self.is_active {
            return Err(ValidationError::InvalidValue {
                message: format!(
                    "merchant account {} is inactive for provider {}",
                    self.merchant_id, self.provider
                ),
            });
        }
        Ok(())
    }
}

/// A merchant account submitted for storage after gateway onboarding.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OnboardingSubmission {
    /// Operator-chosen unique account name.
    pub name: String,
    /// Gateway merchant id returned by onboarding.
    pub merchant_id: String,
    /// Gateway the account was onboarded with.
    pub provider: PaymentProvider,
    /// Environment the account operates in.
    pub environment: GatewayEnvironment,
    /// Tracking id correlating the onboarding flow.
    pub tracking_id: String,
}

/// Summary of a stored merchant account record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccountSummary {
    /// Secure-store record id.
    pub record_id: String,
    /// Operator-chosen account name.
    pub name: String,
    /// Gateway merchant id.
    pub merchant_id: String,
    /// Gateway of the account.
    pub provider: PaymentProvider,
    /// Environment of the account.
    pub environment: GatewayEnvironment,
    /// Whether the account is currently active.
    pub is_active: bool,
    /// When the record was stored.
    #[serde(with = "time::serde::rfc3339::option", default)]
    pub created_at: Option<OffsetDateTime>,
}

/// Request to start a gateway onboarding flow.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OnboardingUrlRequest {
    /// Tracking id correlating the flow across redirects.
    pub tracking_id: String,
    /// Where the gateway sends the operator after consent.
    pub return_url: String,
}

/// A generated gateway onboarding url.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OnboardingUrl {
    /// The url the operator must visit.
    pub url: String,
    /// Tracking id the url was generated for.
    pub tracking_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_credentials_fail_validation() {
        let mut credentials = MerchantCredentials::direct(
            PaymentProvider::Paypal,
            "M-1",
            GatewayEnvironment::Sandbox,
        );
        assert!(credentials.validate().is_ok());

        credentials.is_active = false;
        assert!(credentials.validate().is_err());
    }

    #[test]
    fn empty_merchant_id_fails_validation() {
        let credentials = MerchantCredentials::direct(
            PaymentProvider::Paypal,
            "  ",
            GatewayEnvironment::Sandbox,
        );
        assert!(credentials.validate().is_err());
    }
}
