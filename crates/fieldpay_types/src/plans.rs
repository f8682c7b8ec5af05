//! Subscription plan payloads and registry records.

use fieldpay_utils::{errors::ValidationError, types::MajorUnit};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    enums::{
        BillingIntervalUnit, Currency, PaymentProvider, PlanSource, PlanStatus, TenureType,
    },
    payment_fields::{PaymentFieldConfig, PricingTier, SubscriptionConfig},
};

/// Registry key of a plan entry: one plan per field per merchant per gateway.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct PlanKey {
    #[allow(missing_docs)]
    pub field_id: String,
    #[allow(missing_docs)]
    pub merchant_id: String,
    #[allow(missing_docs)]
    pub provider: PaymentProvider,
}

impl PlanKey {
    #[allow(missing_docs)]
    pub fn new(
        field_id: impl Into<String>,
        merchant_id: impl Into<String>,
        provider: PaymentProvider,
    ) -> Self {
        Self {
            field_id: field_id.into(),
            merchant_id: merchant_id.into(),
            provider,
        }
    }

    /// The merchant-scoped part of this key.
    pub fn merchant_key(&self) -> MerchantKey {
        MerchantKey {
            merchant_id: self.merchant_id.clone(),
            provider: self.provider,
        }
    }
}

impl std::fmt::Display for PlanKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}-{}", self.field_id, self.merchant_id, self.provider)
    }
}

/// Reverse-index key grouping plans by merchant and gateway.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct MerchantKey {
    #[allow(missing_docs)]
    pub merchant_id: String,
    #[allow(missing_docs)]
    pub provider: PaymentProvider,
}

impl MerchantKey {
    #[allow(missing_docs)]
    pub fn new(merchant_id: impl Into<String>, provider: PaymentProvider) -> Self {
        Self {
            merchant_id: merchant_id.into(),
            provider,
        }
    }
}

impl std::fmt::Display for MerchantKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.merchant_id, self.provider)
    }
}

/// Lifecycle record for a created or linked subscription plan.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlanRegistryEntry {
    /// Gateway plan id.
    pub plan_id: String,
    /// Gateway catalog product the plan hangs off, when the gateway has one.
    pub product_id: Option<String>,
    /// Display name of the plan.
    pub plan_name: String,
    /// Plan status on the gateway.
    pub status: PlanStatus,
    /// True when the entry links a pre-existing gateway plan rather than one
    /// created from the field configuration.
    pub is_existing: bool,
    /// How the entry came to reference its plan.
    pub source: PlanSource,
    /// When the entry was written.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Billing frequency of a subscription cycle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BillingFrequency {
    #[allow(missing_docs)]
    pub unit: BillingIntervalUnit,
    #[allow(missing_docs)]
    pub interval_count: u32,
}

/// Price of a billing cycle: a single fixed price or a tiered schedule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum PricingModel {
    /// One fixed price per cycle.
    Fixed {
        #[allow(missing_docs)]
        price: MajorUnit,
    },
    /// Quantity-bracketed prices.
    Tiered {
        #[allow(missing_docs)]
        tiers: Vec<PricingTier>,
    },
}

/// One phase of a subscription's billing schedule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BillingCycle {
    /// Trial or regular.
    pub tenure_type: TenureType,
    /// Position of the cycle within the schedule, starting at 1.
    pub sequence: u32,
    /// How often the cycle bills.
    pub frequency: BillingFrequency,
    /// Number of times the cycle runs; zero means until cancelled.
    pub total_cycles: u32,
    /// What the cycle charges.
    pub pricing: PricingModel,
}

/// Payment collection preferences of a plan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentPreferences {
    #[allow(missing_docs)]
    pub auto_bill_outstanding: bool,
    /// One-off fee collected on activation.
    pub setup_fee: Option<MajorUnit>,
    /// What to do when the setup fee fails.
    pub setup_fee_failure_action: crate::enums::SetupFeeFailureAction,
    /// Consecutive failures tolerated before suspension.
    pub payment_failure_threshold: u32,
}

/// Tax applied on top of each charge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaxDetails {
    /// Percentage, e.g. `7.5`.
    pub percentage: f64,
    /// Whether the percentage is already included in the cycle price.
    pub inclusive: bool,
}

/// Provider-agnostic payload for creating a subscription plan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionPlanRequest {
    /// Plan display name.
    pub name: String,
    /// Optional description shown in the gateway dashboard.
    pub description: Option<String>,
    /// Name of the catalog product the plan is registered under.
    pub product_name: String,
    /// Billing schedule: an optional trial cycle followed by exactly one
    /// regular cycle.
    pub billing_cycles: Vec<BillingCycle>,
    /// Collection preferences.
    pub payment_preferences: PaymentPreferences,
    /// Optional tax percentage.
    pub taxes: Option<TaxDetails>,
    /// Currency of every amount in the payload.
    pub currency: Currency,
}

impl SubscriptionPlanRequest {
    /// Translates a field's subscription configuration into the abstract
    /// billing-cycle model: an optional TRIAL cycle followed by exactly one
    /// REGULAR cycle, with either a fixed price or a tiered schedule.
    pub fn from_config(
        field: &PaymentFieldConfig,
        config: &SubscriptionConfig,
    ) -> Result<Self, ValidationError> {
        let name = config
            .name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .ok_or(ValidationError::MissingRequiredField {
                field_name: "subscription name".to_owned(),
            })?;
        let frequency_unit =
            config
                .frequency
                .ok_or(ValidationError::MissingRequiredField {
                    field_name: "billing frequency".to_owned(),
                })?;
        let price = config
            .price
            .or(field.amount.value)
            .ok_or(ValidationError::MissingRequiredField {
                field_name: "subscription price".to_owned(),
            })?;
        if !price.is_positive() {
            return Err(ValidationError::InvalidValue {
                message: "subscription price must be greater than zero".to_owned(),
            });
        }

        let mut billing_cycles = Vec::with_capacity(2);
        let mut sequence = 1;
        if let Some(trial) = &config.trial_period {
            billing_cycles.push(BillingCycle {
                tenure_type: TenureType::Trial,
                sequence,
                frequency: BillingFrequency {
                    unit: trial.unit,
                    interval_count: 1,
                },
                total_cycles: trial.count,
                pricing: PricingModel::Fixed {
                    price: trial.price.unwrap_or(MajorUnit::zero()),
                },
            });
            sequence += 1;
        }

        let pricing = match &config.tiered_pricing {
            Some(tiers) if !tiers.is_empty() => PricingModel::Tiered {
                tiers: tiers.clone(),
            },
            _ => PricingModel::Fixed { price },
        };
        billing_cycles.push(BillingCycle {
            tenure_type: TenureType::Regular,
            sequence,
            frequency: BillingFrequency {
                unit: frequency_unit,
                interval_count: config.interval_count.unwrap_or(1),
            },
            total_cycles: config.total_cycles.unwrap_or(0),
            pricing,
        });

        Ok(Self {
            name: name.clone(),
            description: Some(name),
            product_name: format!("{} ({})", field.form_id, field.field_id),
            billing_cycles,
            payment_preferences: PaymentPreferences {
                auto_bill_outstanding: config.advanced_settings.auto_bill_outstanding,
                setup_fee: config.setup_fee,
                setup_fee_failure_action: config.advanced_settings.setup_fee_failure_action,
                payment_failure_threshold: config.advanced_settings.payment_failure_threshold,
            },
            taxes: config.tax_percentage.map(|percentage| TaxDetails {
                percentage,
                inclusive: false,
            }),
            currency: config.currency.unwrap_or(field.amount.currency),
        })
    }

    /// The fixed or first-tier price of the regular cycle.
    pub fn regular_price(&self) -> Option<MajorUnit> {
        self.billing_cycles
            .iter()
            .find(|cycle| cycle.tenure_type == TenureType::Regular)
            .map(|cycle| match &cycle.pricing {
                PricingModel::Fixed { price } => *price,
                PricingModel::Tiered { tiers } => tiers
                    .first()
                    .map(|tier| tier.amount)
                    .unwrap_or(MajorUnit::zero()),
            })
    }
}

/// The narrow set of plan attributes gateways allow updating in place.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanUpdateRequest {
    /// New description.
    pub description: Option<String>,
    /// New failure threshold.
    pub payment_failure_threshold: Option<u32>,
}

impl PlanUpdateRequest {
    /// The update payload derivable from a field's subscription
    /// configuration.
    pub fn from_config(config: &SubscriptionConfig) -> Self {
        Self {
            description: config.name.clone(),
            payment_failure_threshold: Some(config.advanced_settings.payment_failure_threshold),
        }
    }
}

/// A plan freshly created on the gateway.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreatedPlan {
    #[allow(missing_docs)]
    pub plan_id: String,
    #[allow(missing_docs)]
    pub product_id: Option<String>,
    #[allow(missing_docs)]
    pub plan_name: String,
    #[allow(missing_docs)]
    pub status: PlanStatus,
}

/// A plan looked up on the gateway.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FoundPlan {
    #[allow(missing_docs)]
    pub plan_id: String,
    #[allow(missing_docs)]
    pub name: String,
    #[allow(missing_docs)]
    pub status: PlanStatus,
}

#[cfg(test)]
mod tests {
    use fieldpay_utils::types::MajorUnit;

    use super::*;
    use crate::{
        enums::{AmountType, PaymentProvider},
        payment_fields::{
            AccountIdentifier, AmountConfig, EnabledMethods, PaymentTypeConfig, TrialPeriod,
        },
    };

    fn subscription_field(config: SubscriptionConfig) -> PaymentFieldConfig {
        PaymentFieldConfig {
            field_id: "field1".to_owned(),
            form_id: "form1".to_owned(),
            provider: PaymentProvider::Paypal,
            account_identifier: AccountIdentifier::Direct("M-1".to_owned()),
            amount: AmountConfig {
                kind: AmountType::Static,
                value: Some(MajorUnit::new(15.0)),
                currency: Currency::Usd,
                min_amount: None,
                max_amount: None,
                suggested_amounts: Vec::new(),
            },
            payment_type: PaymentTypeConfig::Subscription(config.clone()),
            previous_merchant_id: None,
            enabled_methods: EnabledMethods::default(),
        }
    }

    #[test]
    fn builds_trial_then_regular_cycles() {
        let config = SubscriptionConfig {
            name: Some("Pro".to_owned()),
            frequency: Some(BillingIntervalUnit::Month),
            price: Some(MajorUnit::new(20.0)),
            trial_period: Some(TrialPeriod {
                unit: BillingIntervalUnit::Week,
                count: 2,
                price: None,
            }),
            ..Default::default()
        };
        let request =
            SubscriptionPlanRequest::from_config(&subscription_field(config.clone()), &config)
                .unwrap();

        assert_eq!(request.billing_cycles.len(), 2);
        assert_eq!(request.billing_cycles[0].tenure_type, TenureType::Trial);
        assert_eq!(request.billing_cycles[0].sequence, 1);
        assert_eq!(
            request.billing_cycles[0].pricing,
            PricingModel::Fixed {
                price: MajorUnit::zero()
            }
        );
        assert_eq!(request.billing_cycles[1].tenure_type, TenureType::Regular);
        assert_eq!(request.billing_cycles[1].sequence, 2);
        assert_eq!(request.billing_cycles[1].total_cycles, 0);
    }

    #[test]
    fn price_falls_back_to_field_amount() {
        let config = SubscriptionConfig {
            name: Some("Basic".to_owned()),
            frequency: Some(BillingIntervalUnit::Month),
            ..Default::default()
        };
        let request =
            SubscriptionPlanRequest::from_config(&subscription_field(config.clone()), &config)
                .unwrap();
        assert_eq!(request.regular_price(), Some(MajorUnit::new(15.0)));
    }

    #[test]
    fn missing_frequency_is_rejected() {
        let config = SubscriptionConfig {
            name: Some("Basic".to_owned()),
            price: Some(MajorUnit::new(5.0)),
            ..Default::default()
        };
        assert!(
            SubscriptionPlanRequest::from_config(&subscription_field(config.clone()), &config)
                .is_err()
        );
    }

    #[test]
    fn tiered_pricing_replaces_fixed_price() {
        let config = SubscriptionConfig {
            name: Some("Team".to_owned()),
            frequency: Some(BillingIntervalUnit::Month),
            price: Some(MajorUnit::new(10.0)),
            tiered_pricing: Some(vec![PricingTier {
                starting_quantity: 1,
                ending_quantity: None,
                amount: MajorUnit::new(8.0),
            }]),
            ..Default::default()
        };
        let request =
            SubscriptionPlanRequest::from_config(&subscription_field(config.clone()), &config)
                .unwrap();
        assert!(matches!(
            request.billing_cycles[0].pricing,
            PricingModel::Tiered { .. }
        ));
    }
}
