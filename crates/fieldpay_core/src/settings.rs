//! Layered configuration: built-in defaults, an environment-selected TOML
//! file, then `FIELDPAY__` environment variable overrides.

use std::path::PathBuf;

use config::{Config, Environment, File};
use error_stack::{report, ResultExt};
use fieldpay_env::logger::LogConfig;
use fieldpay_interfaces::types::{GatewayUrlConfig, GatewayUrls};
use fieldpay_types::enums::GatewayEnvironment;
use fieldpay_utils::{consts, errors::CustomResult};
use masking::Secret;
use serde::Deserialize;

/// Errors raised while loading or validating the configuration.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The configuration sources could not be read or merged.
    #[error("failed to load configuration")]
    Load,
    /// A loaded value is unusable.
    #[error("invalid configuration value: {message}")]
    Invalid {
        #[allow(missing_docs)]
        message: &'static str,
    },
}

/// Outbound HTTP client settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: consts::REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Merchant resolution settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MerchantsConfig {
    /// How long resolved credentials stay cached, in seconds.
    pub cache_ttl_secs: u64,
    /// Environment assumed for direct merchant ids, which carry none.
    pub default_environment: GatewayEnvironment,
}

impl Default for MerchantsConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 300,
            default_environment: GatewayEnvironment::Sandbox,
        }
    }
}

/// Secure credential store endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CredentialStoreConfig {
    /// Base url of the record-id-keyed credential lookup API.
    pub base_url: String,
}

impl Default for CredentialStoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8787/accounts".to_owned(),
        }
    }
}

/// Buyer redirect settings for checkout flows.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CheckoutConfig {
    /// Where the buyer lands after approving a payment. `formId` and
    /// `fieldId` query parameters are appended per attempt.
    pub return_url: String,
    /// Where the buyer lands after cancelling.
    pub cancel_url: String,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            return_url: "https://forms.localhost/payment/return".to_owned(),
            cancel_url: "https://forms.localhost/payment/cancel".to_owned(),
        }
    }
}

/// Platform (partner) API credentials, used for onboarding referrals and as
/// the authentication fallback for direct-id merchants.
#[derive(Debug, Clone, Deserialize)]
pub struct PartnerAccount {
    /// Partner OAuth client id.
    pub client_id: String,
    /// Partner OAuth client secret.
    pub client_secret: Secret<String>,
    /// Environment the partner account operates in.
    pub environment: GatewayEnvironment,
}

/// Application settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Logging sinks.
    pub log: LogConfig,
    /// Outbound HTTP client.
    pub http_client: HttpClientConfig,
    /// Merchant resolution.
    pub merchants: MerchantsConfig,
    /// Gateway API hosts.
    pub gateways: GatewayUrls,
    /// Secure credential store endpoint.
    pub credential_store: CredentialStoreConfig,
    /// Checkout redirect urls.
    pub checkout: CheckoutConfig,
    /// Optional partner account.
    pub partner: Option<PartnerAccount>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log: LogConfig::default(),
            http_client: HttpClientConfig::default(),
            merchants: MerchantsConfig::default(),
            gateways: GatewayUrls {
                paypal: GatewayUrlConfig {
                    base_url: "https://api-m.paypal.com".to_owned(),
                    sandbox_base_url: "https://api-m.sandbox.paypal.com".to_owned(),
                    partner_id: None,
                },
            },
            credential_store: CredentialStoreConfig::default(),
            checkout: CheckoutConfig::default(),
            partner: None,
        }
    }
}

impl Settings {
    /// Loads settings for the current run environment.
    pub fn new() -> CustomResult<Self, SettingsError> {
        Self::with_config_path(None)
    }

    /// Loads settings from an explicit file path, falling back to the
    /// environment-selected file under `config/` when none is given.
    pub fn with_config_path(explicit_path: Option<PathBuf>) -> CustomResult<Self, SettingsError> {
        let environment = fieldpay_env::which();
        let config_path = explicit_path.unwrap_or_else(|| {
            let mut path = fieldpay_env::workspace_path();
            path.push("config");
            path.push(format!("{}.toml", environment.config_file_stem()));
            path
        });

        let config = Config::builder()
            .add_source(File::from(config_path).required(false))
            .add_source(Environment::with_prefix("FIELDPAY").separator("__"))
            .build()
            .change_context(SettingsError::Load)?;

        let settings: Self = config
            .try_deserialize()
            .change_context(SettingsError::Load)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Rejects settings that cannot work at runtime.
    pub fn validate(&self) -> CustomResult<(), SettingsError> {
        if self.http_client.request_timeout_secs == 0 {
            return Err(report!(SettingsError::Invalid {
                message: "http_client.request_timeout_secs must be non-zero",
            }));
        }
        if self.merchants.cache_ttl_secs == 0 {
            return Err(report!(SettingsError::Invalid {
                message: "merchants.cache_ttl_secs must be non-zero",
            }));
        }
        for url in [
            self.gateways.paypal.base_url.as_str(),
            self.gateways.paypal.sandbox_base_url.as_str(),
            self.checkout.return_url.as_str(),
            self.checkout.cancel_url.as_str(),
        ] {
            url::Url::parse(url).change_context(SettingsError::Invalid {
                message: "configured urls must be absolute",
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_pass_validation() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut settings = Settings::default();
        settings.http_client.request_timeout_secs = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn relative_redirect_urls_are_rejected() {
        let mut settings = Settings::default();
        settings.checkout.return_url = "/payment/return".to_owned();
        assert!(settings.validate().is_err());
    }
}
