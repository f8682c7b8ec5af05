//! Merchant account resolution: the secure credential store boundary and the
//! time-boxed resolver cache.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use error_stack::{report, ResultExt};
use fieldpay_env::{instrument, logger, tracing};
use fieldpay_interfaces::{api::HttpDispatch, errors::ConnectorError};
use fieldpay_types::{
    enums::{GatewayEnvironment, PaymentProvider},
    merchants::{AccountSummary, MerchantCredentials, OnboardingSubmission},
    payment_fields::AccountIdentifier,
};
use fieldpay_utils::{
    errors::CustomResult,
    ext_traits::BytesExt,
    request::{Method, RequestBuilder},
};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::{
    errors::{CoreError, CoreResult},
    settings::CredentialStoreConfig,
};

/// The secure store holding merchant account records, keyed by record id.
#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fetches the credentials stored under a record id.
    async fn fetch_credentials(
        &self,
        record_id: &str,
    ) -> CustomResult<MerchantCredentials, ConnectorError>;

    /// Persists an onboarded merchant account.
    async fn store_onboarding(
        &self,
        submission: OnboardingSubmission,
    ) -> CustomResult<AccountSummary, ConnectorError>;

    /// Lists every stored merchant account.
    async fn list_accounts(&self) -> CustomResult<Vec<AccountSummary>, ConnectorError>;
}

#[derive(Debug, Deserialize)]
struct StoreEnvelope<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

/// [`CredentialStore`] over the HTTP record API: a single action-dispatching
/// endpoint answering `{success, data, error}` envelopes.
pub struct HttpCredentialStore {
    dispatch: Arc<dyn HttpDispatch>,
    base_url: String,
}

impl std::fmt::Debug for HttpCredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCredentialStore")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl HttpCredentialStore {
    #[allow(missing_docs)]
    pub fn new(dispatch: Arc<dyn HttpDispatch>, config: &CredentialStoreConfig) -> Self {
        Self {
            dispatch,
            base_url: config.base_url.clone(),
        }
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        payload: serde_json::Value,
        type_name: &'static str,
    ) -> CustomResult<T, ConnectorError> {
        let request = RequestBuilder::new()
            .method(Method::Post)
            .url(&self.base_url)
            .header("Content-Type", "application/json")
            .set_body(payload)
            .build();
        let response = self.dispatch.send(request).await?;
        let envelope: StoreEnvelope<T> = response
            .response
            .parse_struct(type_name)
            .change_context(ConnectorError::ResponseDeserializationFailed)?;
        if !envelope.success {
            return Err(report!(ConnectorError::GatewayError {
                code: "CREDENTIAL_STORE_ERROR".to_owned(),
                message: envelope
                    .error
                    .unwrap_or_else(|| "credential store reported a failure".to_owned()),
            }));
        }
        envelope
            .data
            .ok_or_else(|| report!(ConnectorError::NotFound))
    }
}

#[async_trait::async_trait]
impl CredentialStore for HttpCredentialStore {
    async fn fetch_credentials(
        &self,
        record_id: &str,
    ) -> CustomResult<MerchantCredentials, ConnectorError> {
        self.call(
            serde_json::json!({ "action": "get-credentials", "recordId": record_id }),
            "MerchantCredentials",
        )
        .await
    }

    async fn store_onboarding(
        &self,
        submission: OnboardingSubmission,
    ) -> CustomResult<AccountSummary, ConnectorError> {
        let mut payload = serde_json::to_value(&submission)
            .change_context(ConnectorError::RequestBuildFailed)?;
        if let Some(map) = payload.as_object_mut() {
            map.insert(
                "action".to_owned(),
                serde_json::Value::String("store-onboarding".to_owned()),
            );
        }
        self.call(payload, "AccountSummary").await
    }

    async fn list_accounts(&self) -> CustomResult<Vec<AccountSummary>, ConnectorError> {
        self.call(
            serde_json::json!({ "action": "list-accounts" }),
            "Vec<AccountSummary>",
        )
        .await
    }
}

struct CachedCredentials {
    credentials: MerchantCredentials,
    fetched_at: Instant,
}

/// Resolves an account identifier into usable merchant credentials, caching
/// successful lookups for a fixed window.
///
/// The cache is an implementation detail: callers must tolerate credentials
/// that are stale within the window.
pub struct MerchantResolver {
    store: Arc<dyn CredentialStore>,
    cache: Mutex<HashMap<String, CachedCredentials>>,
    ttl: Duration,
    default_environment: GatewayEnvironment,
}

impl std::fmt::Debug for MerchantResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MerchantResolver")
            .field("ttl", &self.ttl)
            .field("default_environment", &self.default_environment)
            .finish()
    }
}

impl MerchantResolver {
    #[allow(missing_docs)]
    pub fn new(
        store: Arc<dyn CredentialStore>,
        ttl: Duration,
        default_environment: GatewayEnvironment,
    ) -> Self {
        Self {
            store,
            cache: Mutex::new(HashMap::new()),
            ttl,
            default_environment,
        }
    }

    /// Resolves the identifier, consulting the cache first.
    ///
    /// Direct identifiers synthesize minimal active credentials; secure
    /// record ids go through the credential store. Either way the result is
    /// validated before being cached and returned.
    #[instrument(skip(self))]
    pub async fn resolve(
        &self,
        provider: PaymentProvider,
        identifier: &AccountIdentifier,
    ) -> CoreResult<MerchantCredentials> {
        let cache_key = identifier.raw().to_owned();
        {
            let mut cache = self.cache.lock().await;
            if let Some(cached) = cache.get(&cache_key) {
                if cached.fetched_at.elapsed() < self.ttl {
                    return Ok(cached.credentials.clone());
                }
                cache.remove(&cache_key);
            }
        }

        let credentials = match identifier {
            AccountIdentifier::Direct(merchant_id) => MerchantCredentials::direct(
                provider,
                merchant_id.clone(),
                self.default_environment,
            ),
            AccountIdentifier::SecureRecord(record_id) => self
                .store
                .fetch_credentials(record_id)
                .await
                .map_err(|err| {
                    let message =
                        format!("failed to fetch credentials for record {record_id}: {}", err.current_context());
                    err.change_context(CoreError::CredentialError { message })
                })?,
        };

        credentials.validate().map_err(|err| {
            report!(CoreError::CredentialError {
                message: err.to_string(),
            })
        })?;
        if credentials.provider != provider {
            return Err(report!(CoreError::CredentialError {
                message: format!(
                    "account {} belongs to provider {}, not {provider}",
                    identifier.raw(),
                    credentials.provider
                ),
            }));
        }
        logger::debug!(merchant_id = %credentials.merchant_id, "merchant resolved");

        self.cache.lock().await.insert(
            cache_key,
            CachedCredentials {
                credentials: credentials.clone(),
                fetched_at: Instant::now(),
            },
        );
        Ok(credentials)
    }
}
