//! Enums shared across the workspace.

use serde::{Deserialize, Serialize};

/// Payment gateways a field can be configured against.
///
/// Only PayPal has a connector implementation today; the remaining variants
/// are accepted in configuration and rejected at processing time.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentProvider {
    Paypal,
    Stripe,
    Razorpay,
    Square,
}

/// Gateway environment a merchant account operates in.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    Hash,
    PartialEq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GatewayEnvironment {
    #[default]
    Sandbox,
    Production,
}

/// The payment behavior kind of a field, used for dispatch keys, wire
/// payloads and registry bookkeeping.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentTypeKind {
    Subscription,
    Donation,
    DonationButton,
    ProductWise,
    CustomAmount,
    OneTime,
}

/// Buyer-facing payment methods offered at checkout.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentMethodKind {
    Paypal,
    Card,
    Venmo,
    GooglePay,
}

/// Whether a field's amount is fixed at configuration time or entered by the
/// buyer.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountType {
    #[default]
    Static,
    Variable,
}

/// Billing interval unit of a subscription cycle.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    PartialEq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum BillingIntervalUnit {
    Day,
    Week,
    Month,
    Year,
}

/// Phase of a subscription's billing schedule.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TenureType {
    Trial,
    Regular,
}

/// Lifecycle status of a subscription plan on the gateway.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    PartialEq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum PlanStatus {
    Created,
    Active,
    Inactive,
}

/// How a registry entry came to reference its plan.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PlanSource {
    /// The plan was created by processing this field's configuration.
    FormCreated,
    /// The field was linked to a plan that already existed on the gateway.
    GatewayExisting,
}

/// What to do when a subscription's setup fee fails to collect.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SetupFeeFailureAction {
    #[default]
    Continue,
    Cancel,
}

/// Outcome kind of processing a payment field's configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProcessAction {
    /// A new plan was created on the gateway.
    Created,
    /// The existing plan was updated in place.
    Updated,
    /// The field was linked to a pre-existing gateway plan.
    LinkedExisting,
    /// No upfront gateway call was needed; configuration was echoed for
    /// checkout time.
    Configured,
}

/// State of a buyer's checkout attempt.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CheckoutState {
    Idle,
    AmountPending,
    MethodSelection,
    AwaitingProviderOrder,
    AwaitingBuyerApproval,
    Capturing,
    Completed,
    Cancelled,
    Failed,
}

/// Currencies accepted for PayPal-routed payments.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
#[allow(missing_docs)]
pub enum Currency {
    Aud,
    Brl,
    Cad,
    Chf,
    Czk,
    Dkk,
    Eur,
    Gbp,
    Hkd,
    Huf,
    Ils,
    Jpy,
    Mxn,
    Nok,
    Nzd,
    Php,
    Pln,
    Sek,
    Sgd,
    Thb,
    Twd,
    Usd,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&Currency::Usd).ok().as_deref(),
            Some("\"USD\"")
        );
        assert_eq!(Currency::Usd.to_string(), "USD");
    }

    #[test]
    fn payment_type_kind_uses_snake_case() {
        assert_eq!(PaymentTypeKind::DonationButton.to_string(), "donation_button");
        assert_eq!(
            "custom_amount".parse::<PaymentTypeKind>().ok(),
            Some(PaymentTypeKind::CustomAmount)
        );
    }
}
