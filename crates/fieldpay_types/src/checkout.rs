//! Checkout API contracts and the normalized payment result.

use fieldpay_utils::types::MajorUnit;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    enums::{Currency, PaymentMethodKind, PaymentTypeKind},
    payment_fields::Product,
};

/// Type-specific payload of a payment initiation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "detail", rename_all = "snake_case")]
pub enum PaymentDetail {
    /// Products the buyer selected.
    Products {
        #[allow(missing_docs)]
        products: Vec<Product>,
    },
    /// The subscription plan being signed up for.
    Subscription {
        #[allow(missing_docs)]
        plan_id: String,
    },
    /// No extra payload (donations, custom amounts, one-time charges).
    None,
}

/// Provider-agnostic payment-initiation request, built at `createOrder` time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InitiatePaymentRequest {
    /// Merchant the payment settles into.
    pub merchant_id: String,
    /// Payment behavior kind of the originating field.
    pub payment_type: PaymentTypeKind,
    /// Total amount to authorize.
    pub amount: MajorUnit,
    #[allow(missing_docs)]
    pub currency: Currency,
    /// Advisory reference correlating the attempt to a form field.
    pub item_number: String,
    /// Deduplication key for the gateway call.
    pub idempotency_key: String,
    /// Where the buyer lands after approving.
    pub return_url: String,
    /// Where the buyer lands after cancelling.
    pub cancel_url: String,
    /// Type-specific payload.
    pub detail: PaymentDetail,
}

/// An order successfully created on the gateway.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreatedOrder {
    /// Opaque gateway order id, handed back to the buyer-approval flow.
    pub order_id: String,
}

/// Request to capture an approved order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CaptureRequest {
    #[allow(missing_docs)]
    pub merchant_id: String,
    #[allow(missing_docs)]
    pub order_id: String,
    #[allow(missing_docs)]
    pub payment_type: PaymentTypeKind,
    #[allow(missing_docs)]
    pub item_number: String,
}

/// A settled capture as reported by the gateway.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CapturedPayment {
    /// Gateway transaction id of the settled capture.
    pub transaction_id: String,
    /// Raw payer object, when the gateway returns one.
    pub payer: Option<serde_json::Value>,
    /// Full raw capture payload for downstream consumers.
    pub raw: serde_json::Value,
}

/// Postal address attached to a completed payment.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    #[allow(missing_docs)]
    pub line1: Option<String>,
    #[allow(missing_docs)]
    pub line2: Option<String>,
    #[allow(missing_docs)]
    pub city: Option<String>,
    #[allow(missing_docs)]
    pub state: Option<String>,
    #[allow(missing_docs)]
    pub postal_code: Option<String>,
    #[allow(missing_docs)]
    pub country_code: Option<String>,
}

/// Normalized result of a completed checkout, handed to the surrounding
/// form-submission pipeline.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaymentResult {
    #[allow(missing_docs)]
    pub order_id: String,
    #[allow(missing_docs)]
    pub transaction_id: String,
    #[allow(missing_docs)]
    pub amount: MajorUnit,
    #[allow(missing_docs)]
    pub currency: Currency,
    #[allow(missing_docs)]
    pub payment_type: PaymentTypeKind,
    /// Method the buyer paid with.
    pub method: PaymentMethodKind,
    #[allow(missing_docs)]
    pub merchant_id: String,
    #[allow(missing_docs)]
    pub item_number: String,
    /// Raw capture payload.
    pub raw_capture: serde_json::Value,
    /// When the capture completed.
    #[serde(with = "time::serde::rfc3339")]
    pub completed_at: OffsetDateTime,
    #[allow(missing_docs)]
    pub billing_address: Option<Address>,
    #[allow(missing_docs)]
    pub shipping_address: Option<Address>,
}
