//! Per-field payment configuration model.

use fieldpay_utils::{types::MajorUnit, validation};
use serde::{Deserialize, Serialize};

use crate::enums::{
    AmountType, BillingIntervalUnit, Currency, PaymentMethodKind, PaymentProvider,
    PaymentTypeKind, SetupFeeFailureAction,
};

/// How a field references the merchant account it charges into.
///
/// Either a direct gateway merchant id, or an opaque record id pointing into
/// the secure credential store.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AccountIdentifier {
    /// A gateway merchant id used as-is.
    Direct(String),
    /// A record id resolved through the secure credential store.
    SecureRecord(String),
}

impl AccountIdentifier {
    /// Classifies a stored identifier string.
    ///
    /// 15- and 18-character alphanumeric tokens are record ids in the secure
    /// store; anything else is treated as a direct gateway merchant id.
    pub fn parse(value: &str) -> Self {
        if validation::is_secure_record_token(value) {
            Self::SecureRecord(value.to_owned())
        } else {
            Self::Direct(value.to_owned())
        }
    }

    /// The raw identifier string, whichever kind it is.
    pub fn raw(&self) -> &str {
        match self {
            Self::Direct(value) | Self::SecureRecord(value) => value,
        }
    }
}

/// Amount behavior of a payment field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AmountConfig {
    /// Static (configured) or variable (buyer-entered) amount.
    #[serde(rename = "type")]
    pub kind: AmountType,
    /// Configured amount for static fields, fallback price for others.
    pub value: Option<MajorUnit>,
    /// Currency all amounts of this field are denominated in.
    pub currency: Currency,
    /// Lower bound for buyer-entered amounts.
    pub min_amount: Option<MajorUnit>,
    /// Upper bound for buyer-entered amounts.
    pub max_amount: Option<MajorUnit>,
    /// Amounts offered as one-click suggestions for variable fields.
    #[serde(default)]
    pub suggested_amounts: Vec<MajorUnit>,
}

/// Trial phase of a subscription.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrialPeriod {
    /// Billing interval unit of the trial cycle.
    pub unit: BillingIntervalUnit,
    /// Number of intervals the trial runs for.
    pub count: u32,
    /// Price charged during the trial; free when absent.
    pub price: Option<MajorUnit>,
}

/// One quantity bracket of a tiered pricing schedule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricingTier {
    /// First quantity this bracket applies to.
    pub starting_quantity: u32,
    /// Last quantity this bracket applies to; open-ended when absent.
    pub ending_quantity: Option<u32>,
    /// Price per unit within the bracket.
    pub amount: MajorUnit,
}

/// Advanced subscription behavior knobs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedSettings {
    /// Collect outstanding balance automatically on the next cycle.
    pub auto_bill_outstanding: bool,
    /// What to do when the setup fee fails to collect.
    pub setup_fee_failure_action: SetupFeeFailureAction,
    /// Consecutive payment failures tolerated before suspension.
    pub payment_failure_threshold: u32,
    /// Override for the post-approval return url.
    pub return_url: Option<String>,
    /// Override for the buyer-cancel url.
    pub cancel_url: Option<String>,
}

impl Default for AdvancedSettings {
    fn default() -> Self {
        Self {
            auto_bill_outstanding: true,
            setup_fee_failure_action: SetupFeeFailureAction::default(),
            payment_failure_threshold: 3,
            return_url: None,
            cancel_url: None,
        }
    }
}

/// Subscription behavior of a field.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriptionConfig {
    /// Link the field to a plan that already exists on the gateway instead of
    /// creating one.
    pub use_existing_plan: bool,
    /// The pre-existing plan id, required when `use_existing_plan` is set.
    pub selected_existing_plan: Option<String>,
    /// Plan display name.
    pub name: Option<String>,
    /// Billing frequency unit of the regular cycle.
    pub frequency: Option<BillingIntervalUnit>,
    /// Number of frequency units between charges.
    pub interval_count: Option<u32>,
    /// Total number of regular cycles; zero or absent means infinite.
    pub total_cycles: Option<u32>,
    /// Fixed price of the regular cycle. Falls back to the field's
    /// `amount.value` when absent.
    pub price: Option<MajorUnit>,
    /// Currency override; falls back to the field's amount currency.
    pub currency: Option<Currency>,
    /// One-off fee collected on activation.
    pub setup_fee: Option<MajorUnit>,
    /// Tax percentage applied on top of each charge.
    pub tax_percentage: Option<f64>,
    /// Optional trial phase preceding the regular cycle.
    pub trial_period: Option<TrialPeriod>,
    /// Tiered pricing schedule replacing the fixed price.
    pub tiered_pricing: Option<Vec<PricingTier>>,
    /// Advanced behavior knobs.
    pub advanced_settings: AdvancedSettings,
}

/// Donation behavior of a field; the amount is buyer-entered.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DonationConfig {
    /// Campaign or purpose label shown to the buyer.
    pub purpose: Option<String>,
}

/// Hosted donation-button behavior of a field.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DonationButtonConfig {
    /// Id of the gateway-hosted donation button.
    pub donation_button_id: Option<String>,
}

/// One purchasable product of a product-wise field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Stable product id within the form.
    pub product_id: String,
    /// Display name.
    pub name: String,
    /// Unit price.
    pub price: MajorUnit,
}

/// Product-selection behavior of a field.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductConfig {
    /// Products the buyer can select from.
    pub products: Vec<Product>,
    /// Whether more than one product may be selected.
    pub allow_multiple: bool,
}

/// Buyer-entered custom amount behavior of a field.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomAmountConfig {
    /// Label shown next to the amount input.
    pub label: Option<String>,
}

/// Fixed one-time payment behavior of a field.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OneTimeConfig {
    /// Description attached to the charge.
    pub description: Option<String>,
}

/// The payment behavior of a field, exactly one per field by construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "payment_type", content = "config", rename_all = "snake_case")]
pub enum PaymentTypeConfig {
    Subscription(SubscriptionConfig),
    Donation(DonationConfig),
    DonationButton(DonationButtonConfig),
    ProductWise(ProductConfig),
    CustomAmount(CustomAmountConfig),
    OneTime(OneTimeConfig),
}

impl PaymentTypeConfig {
    /// The kind tag of this configuration.
    pub fn kind(&self) -> PaymentTypeKind {
        match self {
            Self::Subscription(_) => PaymentTypeKind::Subscription,
            Self::Donation(_) => PaymentTypeKind::Donation,
            Self::DonationButton(_) => PaymentTypeKind::DonationButton,
            Self::ProductWise(_) => PaymentTypeKind::ProductWise,
            Self::CustomAmount(_) => PaymentTypeKind::CustomAmount,
            Self::OneTime(_) => PaymentTypeKind::OneTime,
        }
    }

    /// Whether the buyer types the amount for this payment type.
    pub fn has_buyer_entered_amount(&self, amount: &AmountConfig) -> bool {
        match self {
            Self::Donation(_) => true,
            Self::CustomAmount(_) => amount.kind == AmountType::Variable,
            Self::Subscription(_)
            | Self::DonationButton(_)
            | Self::ProductWise(_)
            | Self::OneTime(_) => false,
        }
    }
}

/// Payment methods enabled on a field by the form author.
///
/// PayPal and cards are on by default; Venmo and Google Pay are opt-in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnabledMethods {
    #[allow(missing_docs)]
    pub paypal: bool,
    #[allow(missing_docs)]
    pub cards: bool,
    #[allow(missing_docs)]
    pub venmo: bool,
    #[allow(missing_docs)]
    pub google_pay: bool,
}

impl Default for EnabledMethods {
    fn default() -> Self {
        Self {
            paypal: true,
            cards: true,
            venmo: false,
            google_pay: false,
        }
    }
}

impl EnabledMethods {
    /// Whether the given method is enabled on the field.
    pub fn allows(&self, method: PaymentMethodKind) -> bool {
        match method {
            PaymentMethodKind::Paypal => self.paypal,
            PaymentMethodKind::Card => self.cards,
            PaymentMethodKind::Venmo => self.venmo,
            PaymentMethodKind::GooglePay => self.google_pay,
        }
    }
}

/// Immutable-per-save description of a form field's payment behavior.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentFieldConfig {
    /// Opaque field id, unique within a form version.
    pub field_id: String,
    /// Id of the form the field belongs to.
    pub form_id: String,
    /// Gateway the field charges through.
    pub provider: PaymentProvider,
    /// Merchant account reference.
    pub account_identifier: AccountIdentifier,
    /// Amount behavior.
    pub amount: AmountConfig,
    /// Payment behavior, exactly one kind per field.
    #[serde(flatten)]
    pub payment_type: PaymentTypeConfig,
    /// Last-known merchant id, used to detect merchant reassignment between
    /// saves.
    pub previous_merchant_id: Option<String>,
    /// Methods the form author enabled on this field.
    #[serde(default)]
    pub enabled_methods: EnabledMethods,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_identifiers_by_shape() {
        assert_eq!(
            AccountIdentifier::parse("001Ab00001CdEfG"),
            AccountIdentifier::SecureRecord("001Ab00001CdEfG".to_owned())
        );
        assert_eq!(
            AccountIdentifier::parse("MERCHANT-42"),
            AccountIdentifier::Direct("MERCHANT-42".to_owned())
        );
    }

    #[test]
    fn payment_type_tags_round_trip() {
        let config = PaymentTypeConfig::DonationButton(DonationButtonConfig {
            donation_button_id: Some("BTN-1".to_owned()),
        });
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["payment_type"], "donation_button");
        let back: PaymentTypeConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back.kind(), PaymentTypeKind::DonationButton);
    }
}
