//! Shared state wiring the core components together.

use std::{sync::Arc, time::Duration};

use error_stack::ResultExt;
use fieldpay_interfaces::{
    api::{HttpDispatch, PaymentGateway},
    types::GatewayUrlConfig,
};
use fieldpay_types::{
    enums::PaymentProvider,
    merchants::{MerchantCapabilities, MerchantCredentials},
};

use crate::{
    errors::{CoreError, CoreResult},
    merchants::{CredentialStore, HttpCredentialStore, MerchantResolver},
    plan_registry::{InMemoryPlanStore, PlanStore},
    services::HttpDispatcher,
    settings::Settings,
};

/// Everything a processing or checkout flow needs: settings, the gateway,
/// the credential store, the HTTP dispatcher, the plan registry and the
/// merchant resolver. Cheap to clone; clones share the same stores.
#[derive(Clone)]
pub struct PaymentState {
    #[allow(missing_docs)]
    pub settings: Arc<Settings>,
    #[allow(missing_docs)]
    pub gateway: Arc<dyn PaymentGateway>,
    #[allow(missing_docs)]
    pub credential_store: Arc<dyn CredentialStore>,
    #[allow(missing_docs)]
    pub dispatch: Arc<dyn HttpDispatch>,
    #[allow(missing_docs)]
    pub plan_store: Arc<dyn PlanStore>,
    #[allow(missing_docs)]
    pub merchant_resolver: Arc<MerchantResolver>,
}

impl std::fmt::Debug for PaymentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentState")
            .field("settings", &self.settings)
            .finish()
    }
}

impl PaymentState {
    /// Wires up the state with an in-memory plan registry.
    pub fn new(
        settings: Settings,
        gateway: Arc<dyn PaymentGateway>,
        credential_store: Arc<dyn CredentialStore>,
        dispatch: Arc<dyn HttpDispatch>,
    ) -> Self {
        let settings = Arc::new(settings);
        let merchant_resolver = Arc::new(MerchantResolver::new(
            Arc::clone(&credential_store),
            Duration::from_secs(settings.merchants.cache_ttl_secs),
            settings.merchants.default_environment,
        ));
        Self {
            settings,
            gateway,
            credential_store,
            dispatch,
            plan_store: Arc::new(InMemoryPlanStore::new()),
            merchant_resolver,
        }
    }

    /// Production wiring: the PayPal connector over a shared HTTP dispatcher
    /// and the configured credential store endpoint.
    pub fn production(settings: Settings) -> CoreResult<Self> {
        let dispatch: Arc<dyn HttpDispatch> = Arc::new(
            HttpDispatcher::new(&settings.http_client).change_context(
                CoreError::ConfigurationError {
                    message: "failed to construct the HTTP client".to_owned(),
                },
            )?,
        );
        let credential_store: Arc<dyn CredentialStore> = Arc::new(HttpCredentialStore::new(
            Arc::clone(&dispatch),
            &settings.credential_store,
        ));
        Ok(Self::new(
            settings,
            Arc::new(fieldpay_connectors::Paypal),
            credential_store,
            dispatch,
        ))
    }

    /// The configured urls for the given provider's gateway.
    pub fn gateway_urls(&self, provider: PaymentProvider) -> Option<&GatewayUrlConfig> {
        match provider {
            PaymentProvider::Paypal => Some(&self.settings.gateways.paypal),
            PaymentProvider::Stripe | PaymentProvider::Razorpay | PaymentProvider::Square => None,
        }
    }

    /// Credentials to authenticate a gateway call with.
    ///
    /// Resolved credentials that carry their own client secret are used
    /// as-is; direct-id merchants fall back to the configured partner
    /// account, keeping the merchant id as the payee.
    pub fn gateway_credentials(&self, resolved: &MerchantCredentials) -> MerchantCredentials {
        if resolved.client_secret.is_some() {
            return resolved.clone();
        }
        match &self.settings.partner {
            Some(partner) => MerchantCredentials {
                client_id: Some(partner.client_id.clone()),
                client_secret: Some(partner.client_secret.clone()),
                ..resolved.clone()
            },
            None => resolved.clone(),
        }
    }

    /// The partner account as gateway credentials, for onboarding calls.
    pub fn partner_credentials(&self) -> Option<MerchantCredentials> {
        self.settings.partner.as_ref().map(|partner| MerchantCredentials {
            provider: PaymentProvider::Paypal,
            merchant_id: self
                .settings
                .gateways
                .paypal
                .partner_id
                .clone()
                .unwrap_or_default(),
            client_id: Some(partner.client_id.clone()),
            client_secret: Some(partner.client_secret.clone()),
            environment: partner.environment,
            is_active: true,
            capabilities: MerchantCapabilities::default(),
        })
    }
}
