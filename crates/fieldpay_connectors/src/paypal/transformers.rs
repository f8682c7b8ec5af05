use base64::Engine;
use error_stack::report;
use fieldpay_interfaces::errors::ConnectorError;
use fieldpay_types::{
    checkout::{InitiatePaymentRequest, PaymentDetail},
    enums::{BillingIntervalUnit, Currency, PlanStatus, SetupFeeFailureAction, TenureType},
    merchants::{MerchantCapabilities, MerchantCredentials, OnboardingUrlRequest},
    plans::{PlanUpdateRequest, PricingModel, SubscriptionPlanRequest},
};
use fieldpay_utils::{consts, types::MajorUnit};
use masking::{ExposeInterface, PeekInterface, Secret};
use serde::{Deserialize, Serialize};

use crate::utils::missing_field_err;

pub mod auth_headers {
    pub const PAYPAL_REQUEST_ID: &str = "PayPal-Request-Id";
    pub const PREFER: &str = "Prefer";
}

const ORDER_QUANTITY: u32 = 1;

#[derive(Debug)]
pub struct PaypalAuthType {
    pub client_id: Secret<String>,
    pub client_secret: Secret<String>,
}

impl PaypalAuthType {
    pub fn generate_authorization_value(&self) -> String {
        let auth_id = format!(
            "{}:{}",
            self.client_id.peek(),
            self.client_secret.clone().expose(),
        );
        format!("Basic {}", consts::BASE64_ENGINE.encode(auth_id))
    }
}

impl TryFrom<&MerchantCredentials> for PaypalAuthType {
    type Error = error_stack::Report<ConnectorError>;
    fn try_from(credentials: &MerchantCredentials) -> Result<Self, Self::Error> {
        match (&credentials.client_id, &credentials.client_secret) {
            (Some(client_id), Some(client_secret)) => Ok(Self {
                client_id: Secret::new(client_id.clone()),
                client_secret: client_secret.clone(),
            }),
            _ => Err(report!(ConnectorError::FailedToObtainAuthType)),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: Secret<String>,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Debug, Clone, Serialize, Eq, PartialEq)]
pub struct OrderAmount {
    pub currency_code: Currency,
    pub value: String,
}

impl OrderAmount {
    pub fn new(currency: Currency, amount: MajorUnit) -> Self {
        Self {
            currency_code: currency,
            value: amount.to_wire(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Eq, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaypalProductType {
    Service,
}

#[derive(Debug, Serialize)]
pub struct CatalogProductRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub product_type: PaypalProductType,
}

impl From<&SubscriptionPlanRequest> for CatalogProductRequest {
    fn from(request: &SubscriptionPlanRequest) -> Self {
        Self {
            name: request.product_name.clone(),
            product_type: PaypalProductType::Service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CatalogProductResponse {
    pub id: String,
    #[allow(dead_code)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaypalPlanStatus {
    Created,
    Active,
    Inactive,
}

impl From<PaypalPlanStatus> for PlanStatus {
    fn from(status: PaypalPlanStatus) -> Self {
        match status {
            PaypalPlanStatus::Created => Self::Created,
            PaypalPlanStatus::Active => Self::Active,
            PaypalPlanStatus::Inactive => Self::Inactive,
        }
    }
}

#[derive(Debug, Serialize, Eq, PartialEq)]
pub struct PaypalFrequency {
    pub interval_unit: BillingIntervalUnit,
    pub interval_count: u32,
}

#[derive(Debug, Serialize, Eq, PartialEq)]
pub struct PaypalPricingTier {
    pub starting_quantity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ending_quantity: Option<String>,
    pub amount: OrderAmount,
}

#[derive(Debug, Clone, Copy, Serialize, Eq, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaypalPricingModel {
    Tiered,
}

#[derive(Debug, Serialize, Eq, PartialEq)]
pub struct PaypalPricingScheme {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_price: Option<OrderAmount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing_model: Option<PaypalPricingModel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tiers: Option<Vec<PaypalPricingTier>>,
}

impl PaypalPricingScheme {
    fn fixed(currency: Currency, price: MajorUnit) -> Self {
        Self {
            fixed_price: Some(OrderAmount::new(currency, price)),
            pricing_model: None,
            tiers: None,
        }
    }

    fn tiered(currency: Currency, tiers: &[fieldpay_types::payment_fields::PricingTier]) -> Self {
        Self {
            fixed_price: None,
            pricing_model: Some(PaypalPricingModel::Tiered),
            tiers: Some(
                tiers
                    .iter()
                    .map(|tier| PaypalPricingTier {
                        starting_quantity: tier.starting_quantity.to_string(),
                        ending_quantity: tier.ending_quantity.map(|value| value.to_string()),
                        amount: OrderAmount::new(currency, tier.amount),
                    })
                    .collect(),
            ),
        }
    }
}

#[derive(Debug, Serialize, Eq, PartialEq)]
pub struct PaypalBillingCycle {
    pub frequency: PaypalFrequency,
    pub tenure_type: TenureType,
    pub sequence: u32,
    pub total_cycles: u32,
    pub pricing_scheme: PaypalPricingScheme,
}

#[derive(Debug, Serialize, Eq, PartialEq)]
pub struct PaypalPaymentPreferences {
    pub auto_bill_outstanding: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setup_fee: Option<OrderAmount>,
    pub setup_fee_failure_action: SetupFeeFailureAction,
    pub payment_failure_threshold: u32,
}

#[derive(Debug, Serialize, Eq, PartialEq)]
pub struct PaypalTaxes {
    pub percentage: String,
    pub inclusive: bool,
}

#[derive(Debug, Serialize)]
pub struct BillingPlanRequest {
    pub product_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: PaypalPlanStatus,
    pub billing_cycles: Vec<PaypalBillingCycle>,
    pub payment_preferences: PaypalPaymentPreferences,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxes: Option<PaypalTaxes>,
}

impl TryFrom<(String, &SubscriptionPlanRequest)> for BillingPlanRequest {
    type Error = error_stack::Report<ConnectorError>;
    fn try_from(
        (product_id, request): (String, &SubscriptionPlanRequest),
    ) -> Result<Self, Self::Error> {
        let currency = request.currency;
        let billing_cycles = request
            .billing_cycles
            .iter()
            .map(|cycle| PaypalBillingCycle {
                frequency: PaypalFrequency {
                    interval_unit: cycle.frequency.unit,
                    interval_count: cycle.frequency.interval_count,
                },
                tenure_type: cycle.tenure_type,
                sequence: cycle.sequence,
                total_cycles: cycle.total_cycles,
                pricing_scheme: match &cycle.pricing {
                    PricingModel::Fixed { price } => PaypalPricingScheme::fixed(currency, *price),
                    PricingModel::Tiered { tiers } => PaypalPricingScheme::tiered(currency, tiers),
                },
            })
            .collect::<Vec<_>>();
        if billing_cycles.is_empty() {
            return Err(missing_field_err("billing_cycles")());
        }

        Ok(Self {
            product_id,
            name: request.name.clone(),
            description: request.description.clone(),
            status: PaypalPlanStatus::Active,
            billing_cycles,
            payment_preferences: PaypalPaymentPreferences {
                auto_bill_outstanding: request.payment_preferences.auto_bill_outstanding,
                setup_fee: request
                    .payment_preferences
                    .setup_fee
                    .map(|fee| OrderAmount::new(currency, fee)),
                setup_fee_failure_action: request.payment_preferences.setup_fee_failure_action,
                payment_failure_threshold: request.payment_preferences.payment_failure_threshold,
            },
            taxes: request.taxes.as_ref().map(|taxes| PaypalTaxes {
                percentage: taxes.percentage.to_string(),
                inclusive: taxes.inclusive,
            }),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct BillingPlanResponse {
    pub id: String,
    pub product_id: Option<String>,
    pub name: Option<String>,
    pub status: PaypalPlanStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum PatchOperation {
    Replace,
}

#[derive(Debug, Serialize)]
pub struct PlanPatchOp {
    pub op: PatchOperation,
    pub path: String,
    pub value: serde_json::Value,
}

/// The narrow update surface gateways allow on live plans: description and
/// payment failure threshold.
pub fn plan_update_operations(update: &PlanUpdateRequest) -> Vec<PlanPatchOp> {
    let mut operations = Vec::new();
    if let Some(description) = &update.description {
        operations.push(PlanPatchOp {
            op: PatchOperation::Replace,
            path: "/description".to_owned(),
            value: serde_json::Value::String(description.clone()),
        });
    }
    if let Some(threshold) = update.payment_failure_threshold {
        operations.push(PlanPatchOp {
            op: PatchOperation::Replace,
            path: "/payment_preferences/payment_failure_threshold".to_owned(),
            value: serde_json::Value::from(threshold),
        });
    }
    operations
}

#[derive(Debug, Clone, Copy, Serialize, Eq, PartialEq)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaypalOrderIntent {
    Capture,
}

#[derive(Debug, Clone, Copy, Serialize, Eq, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaypalUserAction {
    PayNow,
    SubscribeNow,
}

#[derive(Debug, Serialize)]
pub struct ApplicationContext {
    pub return_url: String,
    pub cancel_url: String,
    pub user_action: PaypalUserAction,
}

#[derive(Debug, Serialize)]
pub struct Payee {
    pub merchant_id: String,
}

#[derive(Debug, Serialize)]
pub struct OrderItem {
    pub name: String,
    pub quantity: String,
    pub unit_amount: OrderAmount,
}

#[derive(Debug, Serialize)]
pub struct AmountBreakdown {
    pub item_total: OrderAmount,
}

#[derive(Debug, Serialize)]
pub struct OrderRequestAmount {
    pub currency_code: Currency,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<AmountBreakdown>,
}

#[derive(Debug, Serialize)]
pub struct PurchaseUnitRequest {
    pub reference_id: String,
    pub custom_id: String,
    pub payee: Payee,
    pub amount: OrderRequestAmount,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<OrderItem>>,
}

#[derive(Debug, Serialize)]
pub struct OrdersRequest {
    pub intent: PaypalOrderIntent,
    pub purchase_units: Vec<PurchaseUnitRequest>,
    pub application_context: ApplicationContext,
}

impl From<&InitiatePaymentRequest> for OrdersRequest {
    fn from(request: &InitiatePaymentRequest) -> Self {
        let items = match &request.detail {
            PaymentDetail::Products { products } => Some(
                products
                    .iter()
                    .map(|product| OrderItem {
                        name: product.name.clone(),
                        quantity: ORDER_QUANTITY.to_string(),
                        unit_amount: OrderAmount::new(request.currency, product.price),
                    })
                    .collect::<Vec<_>>(),
            ),
            PaymentDetail::Subscription { .. } | PaymentDetail::None => None,
        };
        let breakdown = items.as_ref().map(|_| AmountBreakdown {
            item_total: OrderAmount::new(request.currency, request.amount),
        });

        Self {
            intent: PaypalOrderIntent::Capture,
            purchase_units: vec![PurchaseUnitRequest {
                reference_id: request.item_number.clone(),
                custom_id: request.item_number.clone(),
                payee: Payee {
                    merchant_id: request.merchant_id.clone(),
                },
                amount: OrderRequestAmount {
                    currency_code: request.currency,
                    value: request.amount.to_wire(),
                    breakdown,
                },
                items,
            }],
            application_context: ApplicationContext {
                return_url: request.return_url.clone(),
                cancel_url: request.cancel_url.clone(),
                user_action: PaypalUserAction::PayNow,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OrdersResponse {
    pub id: String,
    #[allow(dead_code)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionsRequest {
    pub plan_id: String,
    pub custom_id: String,
    pub application_context: ApplicationContext,
}

impl TryFrom<&InitiatePaymentRequest> for SubscriptionsRequest {
    type Error = error_stack::Report<ConnectorError>;
    fn try_from(request: &InitiatePaymentRequest) -> Result<Self, Self::Error> {
        let plan_id = match &request.detail {
            PaymentDetail::Subscription { plan_id } => plan_id.clone(),
            PaymentDetail::Products { .. } | PaymentDetail::None => {
                return Err(missing_field_err("plan_id")())
            }
        };
        Ok(Self {
            plan_id,
            custom_id: request.item_number.clone(),
            application_context: ApplicationContext {
                return_url: request.return_url.clone(),
                cancel_url: request.cancel_url.clone(),
                user_action: PaypalUserAction::SubscribeNow,
            },
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionsResponse {
    pub id: String,
    #[allow(dead_code)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CaptureDetail {
    pub id: String,
    #[allow(dead_code)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CapturePayments {
    #[serde(default)]
    pub captures: Vec<CaptureDetail>,
}

#[derive(Debug, Deserialize)]
pub struct CapturePurchaseUnit {
    pub payments: Option<CapturePayments>,
}

#[derive(Debug, Deserialize)]
pub struct CaptureOrderResponse {
    pub id: String,
    #[allow(dead_code)]
    pub status: Option<String>,
    pub payer: Option<serde_json::Value>,
    #[serde(default)]
    pub purchase_units: Vec<CapturePurchaseUnit>,
}

impl CaptureOrderResponse {
    /// The id of the first settled capture; falls back to the order id when
    /// the gateway omits the capture list.
    pub fn transaction_id(&self) -> String {
        self.purchase_units
            .first()
            .and_then(|unit| unit.payments.as_ref())
            .and_then(|payments| payments.captures.first())
            .map(|capture| capture.id.clone())
            .unwrap_or_else(|| self.id.clone())
    }
}

#[derive(Debug, Deserialize)]
pub struct MerchantCapability {
    pub name: String,
    pub status: Option<String>,
}

impl MerchantCapability {
    fn is_active(&self) -> bool {
        self.status.as_deref() == Some("ACTIVE")
    }
}

#[derive(Debug, Deserialize)]
pub struct MerchantIntegrationsResponse {
    #[serde(default)]
    pub payments_receivable: bool,
    #[serde(default)]
    pub capabilities: Vec<MerchantCapability>,
}

impl From<MerchantIntegrationsResponse> for MerchantCapabilities {
    fn from(response: MerchantIntegrationsResponse) -> Self {
        let has = |name: &str| {
            response
                .capabilities
                .iter()
                .any(|capability| capability.name == name && capability.is_active())
        };
        Self {
            cards: response.payments_receivable,
            venmo: has("VENMO_PAY_PROCESSING"),
            google_pay: has("GOOGLE_PAY"),
            pay_later: has("PAY_UPON_INVOICE") || has("PAYPAL_CREDIT_PROCESSING"),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReferralOperation {
    pub operation: String,
}

#[derive(Debug, Serialize)]
pub struct LegalConsent {
    #[serde(rename = "type")]
    pub consent_type: String,
    pub granted: bool,
}

#[derive(Debug, Serialize)]
pub struct PartnerConfigOverride {
    pub return_url: String,
}

#[derive(Debug, Serialize)]
pub struct PartnerReferralRequest {
    pub tracking_id: String,
    pub operations: Vec<ReferralOperation>,
    pub products: Vec<String>,
    pub legal_consents: Vec<LegalConsent>,
    pub partner_config_override: PartnerConfigOverride,
}

impl From<&OnboardingUrlRequest> for PartnerReferralRequest {
    fn from(request: &OnboardingUrlRequest) -> Self {
        Self {
            tracking_id: request.tracking_id.clone(),
            operations: vec![ReferralOperation {
                operation: "API_INTEGRATION".to_owned(),
            }],
            products: vec!["EXPRESS_CHECKOUT".to_owned()],
            legal_consents: vec![LegalConsent {
                consent_type: "SHARE_DATA_CONSENT".to_owned(),
                granted: true,
            }],
            partner_config_override: PartnerConfigOverride {
                return_url: request.return_url.clone(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PaypalLink {
    pub href: String,
    pub rel: String,
}

#[derive(Debug, Deserialize)]
pub struct PartnerReferralResponse {
    #[serde(default)]
    pub links: Vec<PaypalLink>,
}

impl PartnerReferralResponse {
    pub fn action_url(&self) -> Option<String> {
        self.links
            .iter()
            .find(|link| link.rel == "action_url")
            .map(|link| link.href.clone())
    }
}

#[derive(Debug, Deserialize)]
pub struct OrderErrorDetails {
    pub issue: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PaypalOrderErrorResponse {
    pub name: Option<String>,
    pub message: Option<String>,
    #[allow(dead_code)]
    pub debug_id: Option<String>,
    pub details: Option<Vec<OrderErrorDetails>>,
}

#[derive(Debug, Deserialize)]
pub struct PaypalAccessTokenErrorResponse {
    pub error: String,
    pub error_description: Option<String>,
}

#[cfg(test)]
mod tests {
    use fieldpay_types::{
        enums::PaymentTypeKind,
        payment_fields::{PricingTier, Product},
        plans::{
            BillingCycle, BillingFrequency, PaymentPreferences, PricingModel, TaxDetails,
        },
    };

    use super::*;

    fn plan_request(pricing: PricingModel, with_trial: bool) -> SubscriptionPlanRequest {
        let mut billing_cycles = Vec::new();
        let mut sequence = 1;
        if with_trial {
            billing_cycles.push(BillingCycle {
                tenure_type: TenureType::Trial,
                sequence,
                frequency: BillingFrequency {
                    unit: BillingIntervalUnit::Week,
                    interval_count: 1,
                },
                total_cycles: 2,
                pricing: PricingModel::Fixed {
                    price: MajorUnit::zero(),
                },
            });
            sequence += 1;
        }
        billing_cycles.push(BillingCycle {
            tenure_type: TenureType::Regular,
            sequence,
            frequency: BillingFrequency {
                unit: BillingIntervalUnit::Month,
                interval_count: 1,
            },
            total_cycles: 0,
            pricing,
        });
        SubscriptionPlanRequest {
            name: "Pro".to_owned(),
            description: Some("Pro".to_owned()),
            product_name: "form1 (field1)".to_owned(),
            billing_cycles,
            payment_preferences: PaymentPreferences {
                auto_bill_outstanding: true,
                setup_fee: Some(MajorUnit::new(1.5)),
                setup_fee_failure_action: SetupFeeFailureAction::Continue,
                payment_failure_threshold: 3,
            },
            taxes: Some(TaxDetails {
                percentage: 7.5,
                inclusive: false,
            }),
            currency: Currency::Usd,
        }
    }

    #[test]
    fn billing_plan_request_serializes_cycles_in_order() {
        let request = plan_request(
            PricingModel::Fixed {
                price: MajorUnit::new(20.0),
            },
            true,
        );
        let plan = BillingPlanRequest::try_from(("PROD-1".to_owned(), &request)).unwrap();
        let json = serde_json::to_value(&plan).unwrap();

        assert_eq!(json["product_id"], "PROD-1");
        assert_eq!(json["status"], "ACTIVE");
        assert_eq!(json["billing_cycles"][0]["tenure_type"], "TRIAL");
        assert_eq!(json["billing_cycles"][1]["tenure_type"], "REGULAR");
        assert_eq!(
            json["billing_cycles"][1]["pricing_scheme"]["fixed_price"]["value"],
            "20.00"
        );
        assert_eq!(json["payment_preferences"]["setup_fee"]["value"], "1.50");
        assert_eq!(json["taxes"]["percentage"], "7.5");
    }

    #[test]
    fn tiered_scheme_omits_open_ended_quantity() {
        let request = plan_request(
            PricingModel::Tiered {
                tiers: vec![
                    PricingTier {
                        starting_quantity: 1,
                        ending_quantity: Some(10),
                        amount: MajorUnit::new(8.0),
                    },
                    PricingTier {
                        starting_quantity: 11,
                        ending_quantity: None,
                        amount: MajorUnit::new(6.0),
                    },
                ],
            },
            false,
        );
        let plan = BillingPlanRequest::try_from(("PROD-2".to_owned(), &request)).unwrap();
        let json = serde_json::to_value(&plan).unwrap();

        let scheme = &json["billing_cycles"][0]["pricing_scheme"];
        assert_eq!(scheme["pricing_model"], "TIERED");
        assert_eq!(scheme["tiers"][0]["ending_quantity"], "10");
        assert!(scheme["tiers"][1].get("ending_quantity").is_none());
        assert!(scheme.get("fixed_price").is_none());
    }

    #[test]
    fn update_operations_cover_the_narrow_surface() {
        let operations = plan_update_operations(&PlanUpdateRequest {
            description: Some("Pro plan".to_owned()),
            payment_failure_threshold: Some(5),
        });
        assert_eq!(operations.len(), 2);
        assert_eq!(operations[0].path, "/description");
        assert_eq!(
            operations[1].path,
            "/payment_preferences/payment_failure_threshold"
        );
    }

    #[test]
    fn orders_request_carries_payee_and_items() {
        let request = InitiatePaymentRequest {
            merchant_id: "M-1".to_owned(),
            payment_type: PaymentTypeKind::ProductWise,
            amount: MajorUnit::new(30.0),
            currency: Currency::Usd,
            item_number: "field1-form1-0-abc".to_owned(),
            idempotency_key: "idem_1".to_owned(),
            return_url: "https://forms.example/return".to_owned(),
            cancel_url: "https://forms.example/cancel".to_owned(),
            detail: PaymentDetail::Products {
                products: vec![Product {
                    product_id: "p1".to_owned(),
                    name: "Widget".to_owned(),
                    price: MajorUnit::new(30.0),
                }],
            },
        };
        let order = OrdersRequest::from(&request);
        let json = serde_json::to_value(&order).unwrap();

        assert_eq!(json["intent"], "CAPTURE");
        assert_eq!(json["purchase_units"][0]["payee"]["merchant_id"], "M-1");
        assert_eq!(json["purchase_units"][0]["amount"]["value"], "30.00");
        assert_eq!(json["purchase_units"][0]["items"][0]["name"], "Widget");
        assert_eq!(json["application_context"]["user_action"], "PAY_NOW");
    }

    #[test]
    fn subscription_request_requires_a_plan() {
        let request = InitiatePaymentRequest {
            merchant_id: "M-1".to_owned(),
            payment_type: PaymentTypeKind::Subscription,
            amount: MajorUnit::new(20.0),
            currency: Currency::Usd,
            item_number: "n".to_owned(),
            idempotency_key: "idem_2".to_owned(),
            return_url: "https://forms.example/return".to_owned(),
            cancel_url: "https://forms.example/cancel".to_owned(),
            detail: PaymentDetail::None,
        };
        assert!(SubscriptionsRequest::try_from(&request).is_err());
    }

    #[test]
    fn capture_transaction_id_prefers_the_capture_record() {
        let response: CaptureOrderResponse = serde_json::from_value(serde_json::json!({
            "id": "ORDER-1",
            "status": "COMPLETED",
            "purchase_units": [
                {"payments": {"captures": [{"id": "TXN-9", "status": "COMPLETED"}]}}
            ]
        }))
        .unwrap();
        assert_eq!(response.transaction_id(), "TXN-9");
    }
}
