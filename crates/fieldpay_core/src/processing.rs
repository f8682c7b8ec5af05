//! Per-field payment configuration processing.
//!
//! Subscription fields drive the plan lifecycle on the gateway (link an
//! existing plan, create a new one, or update in place); every other payment
//! type validates its sub-fields and echoes the resolved configuration for
//! checkout time. Multi-field processing is fail-fast: the first failing
//! field aborts the save, and the error carries the per-field results already
//! produced.

use error_stack::{report, ResultExt};
use fieldpay_env::{instrument, logger, tracing};
use fieldpay_types::{
    enums::{PaymentProvider, PaymentTypeKind, PlanSource, PlanStatus, ProcessAction},
    merchants::MerchantCredentials,
    plans::{
        CreatedPlan, MerchantKey, PlanKey, PlanRegistryEntry, PlanUpdateRequest,
        SubscriptionPlanRequest,
    },
    payment_fields::{PaymentFieldConfig, PaymentTypeConfig, SubscriptionConfig},
};
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    errors::{provider_error, CoreError, CoreResult},
    state::PaymentState,
    validation,
};

/// Result of processing a subscription field.
#[derive(Clone, Debug, Serialize)]
pub struct SubscriptionOutcome {
    /// What the decision procedure did.
    pub action: ProcessAction,
    #[allow(missing_docs)]
    pub plan_id: String,
    #[allow(missing_docs)]
    pub plan_name: String,
    #[allow(missing_docs)]
    pub status: PlanStatus,
    #[allow(missing_docs)]
    pub merchant_id: String,
    #[allow(missing_docs)]
    pub provider: PaymentProvider,
    /// Set when an in-place update failed and the plan was re-created
    /// instead; surfaced so operators can detect drift.
    pub recreated_after_update_failure: bool,
}

/// Acknowledgment for payment types that need no upfront gateway call.
#[derive(Clone, Debug, Serialize)]
pub struct ConfiguredOutcome {
    #[allow(missing_docs)]
    pub payment_type: PaymentTypeKind,
    #[allow(missing_docs)]
    pub merchant_id: String,
    #[allow(missing_docs)]
    pub provider: PaymentProvider,
    /// The type-specific configuration, consumed at checkout time.
    pub config: PaymentTypeConfig,
}

/// Outcome of processing one payment field.
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum ProcessOutcome {
    #[allow(missing_docs)]
    Subscription(SubscriptionOutcome),
    #[allow(missing_docs)]
    Configured(ConfiguredOutcome),
}

impl ProcessOutcome {
    /// The subscription outcome, when this field was a subscription.
    pub fn as_subscription(&self) -> Option<&SubscriptionOutcome> {
        match self {
            Self::Subscription(outcome) => Some(outcome),
            Self::Configured(_) => None,
        }
    }
}

/// One processed field of a form save.
#[derive(Clone, Debug, Serialize)]
pub struct ProcessedField {
    #[allow(missing_docs)]
    pub field_id: String,
    #[allow(missing_docs)]
    pub outcome: ProcessOutcome,
}

/// A form save aborted at its first failing field.
#[derive(Debug)]
pub struct FormProcessingError {
    /// The field that failed.
    pub field_id: String,
    /// Fields processed successfully before the failure.
    pub processed: Vec<ProcessedField>,
    /// The underlying failure.
    pub source: error_stack::Report<CoreError>,
}

impl std::fmt::Display for FormProcessingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "payment processing aborted at field {}: {}",
            self.field_id,
            self.source.current_context()
        )
    }
}

impl std::error::Error for FormProcessingError {}

/// Drives the per-field decision procedure against the gateway and the plan
/// registry.
#[derive(Clone, Debug)]
pub struct PaymentProcessor {
    state: PaymentState,
}

impl PaymentProcessor {
    #[allow(missing_docs)]
    pub fn new(state: &PaymentState) -> Self {
        Self {
            state: state.clone(),
        }
    }

    /// Processes every payment field of a form save, fail-fast.
    pub async fn process_form_payments(
        &self,
        fields: &[PaymentFieldConfig],
    ) -> Result<Vec<ProcessedField>, FormProcessingError> {
        let mut processed = Vec::with_capacity(fields.len());
        for field in fields {
            match self.process_field(field).await {
                Ok(result) => processed.push(result),
                Err(source) => {
                    logger::error!(
                        field_id = %field.field_id,
                        error = ?source,
                        "payment field processing aborted"
                    );
                    return Err(FormProcessingError {
                        field_id: field.field_id.clone(),
                        processed,
                        source,
                    });
                }
            }
        }
        Ok(processed)
    }

    /// Processes a single payment field: validate, resolve the merchant,
    /// then dispatch on the payment type.
    #[instrument(skip_all, fields(field_id = %field.field_id))]
    pub async fn process_field(&self, field: &PaymentFieldConfig) -> CoreResult<ProcessedField> {
        let outcome = validation::validate_field(field);
        for warning in &outcome.warnings {
            logger::warn!(field_id = %field.field_id, %warning, "payment field warning");
        }
        if !outcome.is_valid {
            return Err(report!(CoreError::ValidationError {
                message: outcome.error_message(),
            }));
        }
        if self.state.gateway_urls(field.provider).is_none() {
            return Err(report!(CoreError::ConfigurationError {
                message: format!("provider {} is not supported yet", field.provider),
            }));
        }

        let credentials = self
            .state
            .merchant_resolver
            .resolve(field.provider, &field.account_identifier)
            .await?;

        match &field.payment_type {
            PaymentTypeConfig::Subscription(config) => {
                self.process_subscription(field, config, &credentials).await
            }
            other => Ok(ProcessedField {
                field_id: field.field_id.clone(),
                outcome: ProcessOutcome::Configured(ConfiguredOutcome {
                    payment_type: other.kind(),
                    merchant_id: credentials.merchant_id.clone(),
                    provider: field.provider,
                    config: other.clone(),
                }),
            }),
        }
    }

    /// The subscription decision procedure: link an existing plan, or decide
    /// create-vs-update based on the registry and merchant-change detection.
    async fn process_subscription(
        &self,
        field: &PaymentFieldConfig,
        config: &SubscriptionConfig,
        credentials: &MerchantCredentials,
    ) -> CoreResult<ProcessedField> {
        let key = PlanKey::new(
            field.field_id.as_str(),
            credentials.merchant_id.as_str(),
            field.provider,
        );

        if config.use_existing_plan {
            return self
                .link_existing_plan(field, config, credentials, &key)
                .await;
        }

        let merchant_changed = field
            .previous_merchant_id
            .as_deref()
            .is_some_and(|previous| previous != credentials.merchant_id);
        let existing = self
            .state
            .plan_store
            .find(&key)
            .await
            .change_context(CoreError::ProviderError {
                message: "plan registry lookup failed".to_owned(),
            })?;
        let should_create_new = existing.is_none() || merchant_changed;

        if should_create_new {
            if merchant_changed {
                self.drop_previous_plan_reference(field, &credentials.merchant_id)
                    .await?;
            }
            let created = self.create_plan(field, config, credentials).await?;
            self.register_plan(&key, &created, PlanSource::FormCreated, false)
                .await?;
            return Ok(subscription_result(field, credentials, ProcessAction::Created, created, false));
        }

        // Reuse path: update the existing plan in place; if the gateway
        // rejects the update, re-create instead of surfacing the update
        // error.
        let existing_entry = existing.ok_or_else(|| {
            report!(CoreError::ProviderError {
                message: "plan registry entry disappeared mid-processing".to_owned(),
            })
        })?;
        let update = PlanUpdateRequest::from_config(config);
        let gateway_credentials = self.state.gateway_credentials(credentials);
        let urls = self.paypal_urls()?;
        match self
            .state
            .gateway
            .update_plan(
                self.state.dispatch.as_ref(),
                urls,
                &gateway_credentials,
                &existing_entry.plan_id,
                update,
            )
            .await
        {
            Ok(()) => {
                let refreshed = PlanRegistryEntry {
                    plan_name: config
                        .name
                        .clone()
                        .unwrap_or_else(|| existing_entry.plan_name.clone()),
                    ..existing_entry.clone()
                };
                let plan = CreatedPlan {
                    plan_id: refreshed.plan_id.clone(),
                    product_id: refreshed.product_id.clone(),
                    plan_name: refreshed.plan_name.clone(),
                    status: refreshed.status,
                };
                self.state
                    .plan_store
                    .upsert(&key, refreshed)
                    .await
                    .change_context(CoreError::ProviderError {
                        message: "plan registry write failed".to_owned(),
                    })?;
                Ok(subscription_result(field, credentials, ProcessAction::Updated, plan, false))
            }
            Err(update_error) => {
                logger::warn!(
                    field_id = %field.field_id,
                    plan_id = %existing_entry.plan_id,
                    error = ?update_error,
                    "plan update failed; re-creating the plan"
                );
                let created = self.create_plan(field, config, credentials).await?;
                self.register_plan(&key, &created, PlanSource::FormCreated, false)
                    .await?;
                Ok(subscription_result(field, credentials, ProcessAction::Created, created, true))
            }
        }
    }

    /// Links the field to a pre-existing gateway plan without any
    /// create/update call.
    async fn link_existing_plan(
        &self,
        field: &PaymentFieldConfig,
        config: &SubscriptionConfig,
        credentials: &MerchantCredentials,
        key: &PlanKey,
    ) -> CoreResult<ProcessedField> {
        let plan_id = config
            .selected_existing_plan
            .clone()
            .ok_or_else(|| {
                report!(CoreError::ValidationError {
                    message: "Existing plan selection is required".to_owned(),
                })
            })?;
        self.drop_previous_plan_reference(field, &credentials.merchant_id)
            .await?;

        // A lookup is allowed here (it is not a create/update); linking still
        // succeeds if the gateway cannot confirm the plan right now.
        let gateway_credentials = self.state.gateway_credentials(credentials);
        let (plan_name, status) = match self
            .state
            .gateway
            .find_plan(
                self.state.dispatch.as_ref(),
                self.paypal_urls()?,
                &gateway_credentials,
                &plan_id,
            )
            .await
        {
            Ok(found) if !found.name.is_empty() => (found.name, found.status),
            Ok(found) => (plan_id.clone(), found.status),
            Err(error) => {
                logger::warn!(
                    plan_id = %plan_id,
                    error = ?error,
                    "existing plan lookup failed; linking without verification"
                );
                (
                    config.name.clone().unwrap_or_else(|| plan_id.clone()),
                    PlanStatus::Active,
                )
            }
        };

        let entry = PlanRegistryEntry {
            plan_id: plan_id.clone(),
            product_id: None,
            plan_name: plan_name.clone(),
            status,
            is_existing: true,
            source: PlanSource::GatewayExisting,
            created_at: OffsetDateTime::now_utc(),
        };
        self.state
            .plan_store
            .upsert(key, entry)
            .await
            .change_context(CoreError::ProviderError {
                message: "plan registry write failed".to_owned(),
            })?;

        let plan = CreatedPlan {
            plan_id,
            product_id: None,
            plan_name,
            status,
        };
        Ok(subscription_result(
            field,
            credentials,
            ProcessAction::LinkedExisting,
            plan,
            false,
        ))
    }

    /// De-references the plan registered under the field's previous merchant,
    /// cleaning the reverse index. The old gateway plan itself is left
    /// untouched.
    async fn drop_previous_plan_reference(
        &self,
        field: &PaymentFieldConfig,
        current_merchant_id: &str,
    ) -> CoreResult<()> {
        let Some(previous) = field.previous_merchant_id.as_deref() else {
            return Ok(());
        };
        if previous == current_merchant_id {
            return Ok(());
        }
        let old_key = PlanKey::new(field.field_id.as_str(), previous, field.provider);
        let removed = self
            .state
            .plan_store
            .delete(&old_key)
            .await
            .change_context(CoreError::ProviderError {
                message: "plan registry delete failed".to_owned(),
            })?;
        if let Some(old_entry) = removed {
            logger::info!(
                field_id = %field.field_id,
                old_plan_id = %old_entry.plan_id,
                "merchant changed; dropped previous plan reference"
            );
        }
        Ok(())
    }

    async fn create_plan(
        &self,
        field: &PaymentFieldConfig,
        config: &SubscriptionConfig,
        credentials: &MerchantCredentials,
    ) -> CoreResult<CreatedPlan> {
        let request = SubscriptionPlanRequest::from_config(field, config).map_err(|err| {
            report!(CoreError::ConfigurationError {
                message: err.to_string(),
            })
        })?;
        let gateway_credentials = self.state.gateway_credentials(credentials);
        self.state
            .gateway
            .create_plan(
                self.state.dispatch.as_ref(),
                self.paypal_urls()?,
                &gateway_credentials,
                request,
            )
            .await
            .map_err(|err| provider_error("Failed to create subscription", err))
    }

    async fn register_plan(
        &self,
        key: &PlanKey,
        plan: &CreatedPlan,
        source: PlanSource,
        is_existing: bool,
    ) -> CoreResult<()> {
        let entry = PlanRegistryEntry {
            plan_id: plan.plan_id.clone(),
            product_id: plan.product_id.clone(),
            plan_name: plan.plan_name.clone(),
            status: plan.status,
            is_existing,
            source,
            created_at: OffsetDateTime::now_utc(),
        };
        self.state
            .plan_store
            .upsert(key, entry)
            .await
            .change_context(CoreError::ProviderError {
                message: "plan registry write failed".to_owned(),
            })
    }

    /// Plan ids currently registered under a merchant.
    pub async fn existing_subscriptions(
        &self,
        merchant_id: &str,
        provider: PaymentProvider,
    ) -> CoreResult<Vec<String>> {
        self.state
            .plan_store
            .plans_for_merchant(&MerchantKey::new(merchant_id, provider))
            .await
            .change_context(CoreError::ProviderError {
                message: "plan registry lookup failed".to_owned(),
            })
    }

    fn paypal_urls(&self) -> CoreResult<&fieldpay_interfaces::types::GatewayUrlConfig> {
        self.state
            .gateway_urls(PaymentProvider::Paypal)
            .ok_or_else(|| {
                report!(CoreError::ConfigurationError {
                    message: "no gateway urls configured".to_owned(),
                })
            })
    }
}

fn subscription_result(
    field: &PaymentFieldConfig,
    credentials: &MerchantCredentials,
    action: ProcessAction,
    plan: CreatedPlan,
    recreated_after_update_failure: bool,
) -> ProcessedField {
    ProcessedField {
        field_id: field.field_id.clone(),
        outcome: ProcessOutcome::Subscription(SubscriptionOutcome {
            action,
            plan_id: plan.plan_id,
            plan_name: plan.plan_name,
            status: plan.status,
            merchant_id: credentials.merchant_id.clone(),
            provider: field.provider,
            recreated_after_update_failure,
        }),
    }
}
