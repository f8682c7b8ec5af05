//! Merchant onboarding orchestration over the gateway and the credential
//! store.

use error_stack::{report, ResultExt};
use fieldpay_env::logger;
use fieldpay_types::{
    enums::PaymentProvider,
    merchants::{AccountSummary, OnboardingSubmission, OnboardingUrl, OnboardingUrlRequest},
};

use crate::{
    errors::{provider_error, CoreError, CoreResult},
    state::PaymentState,
};

/// Onboards merchant accounts: generates gateway referral urls, stores
/// completed onboardings and answers account-name uniqueness checks.
#[derive(Clone, Debug)]
pub struct OnboardingService {
    state: PaymentState,
}

impl OnboardingService {
    #[allow(missing_docs)]
    pub fn new(state: &PaymentState) -> Self {
        Self {
            state: state.clone(),
        }
    }

    /// Generates a gateway onboarding url under the configured partner
    /// account.
    pub async fn generate_onboarding_url(
        &self,
        request: OnboardingUrlRequest,
    ) -> CoreResult<OnboardingUrl> {
        let partner = self.state.partner_credentials().ok_or_else(|| {
            report!(CoreError::ConfigurationError {
                message: "no partner account is configured for onboarding".to_owned(),
            })
        })?;
        let urls = self
            .state
            .gateway_urls(PaymentProvider::Paypal)
            .ok_or_else(|| {
                report!(CoreError::ConfigurationError {
                    message: "no gateway urls configured".to_owned(),
                })
            })?;
        self.state
            .gateway
            .generate_onboarding_url(self.state.dispatch.as_ref(), urls, &partner, request)
            .await
            .map_err(|err| provider_error("Failed to generate onboarding url", err))
    }

    /// Stores a completed onboarding, enforcing account-name uniqueness.
    pub async fn store_onboarding(
        &self,
        submission: OnboardingSubmission,
    ) -> CoreResult<AccountSummary> {
        if !self.check_name(&submission.name).await? {
            return Err(report!(CoreError::ValidationError {
                message: format!("an account named \"{}\" already exists", submission.name),
            }));
        }
        let summary = self
            .state
            .credential_store
            .store_onboarding(submission)
            .await
            .map_err(|err| provider_error("Failed to store onboarded account", err))?;
        logger::info!(record_id = %summary.record_id, "merchant account stored");
        Ok(summary)
    }

    /// Lists every stored merchant account.
    pub async fn list_accounts(&self) -> CoreResult<Vec<AccountSummary>> {
        self.state
            .credential_store
            .list_accounts()
            .await
            .change_context(CoreError::ProviderError {
                message: "Failed to list merchant accounts".to_owned(),
            })
    }

    /// Whether the given account name is free (case-insensitive).
    pub async fn check_name(&self, name: &str) -> CoreResult<bool> {
        let accounts = self.list_accounts().await?;
        let wanted = name.trim();
        Ok(!accounts
            .iter()
            .any(|account| account.name.eq_ignore_ascii_case(wanted)))
    }
}
