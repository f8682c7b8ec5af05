//! The buyer-facing checkout state machine.
//!
//! One [`CheckoutSession`] exists per payment field per buyer attempt. It
//! gates checkout behind the form's final page (donation buttons excepted),
//! validates buyer-entered amounts, intersects field-enabled methods with
//! merchant capabilities, and drives the create-order → buyer-approval →
//! capture protocol, ending in a normalized [`PaymentResult`].

use std::sync::Arc;

use error_stack::{report, ResultExt};
use fieldpay_env::{instrument, logger, tracing};
use fieldpay_types::{
    checkout::{Address, CaptureRequest, InitiatePaymentRequest, PaymentDetail, PaymentResult},
    enums::{CheckoutState, PaymentMethodKind, PaymentProvider},
    merchants::{MerchantCapabilities, MerchantCredentials},
    payment_fields::{EnabledMethods, PaymentFieldConfig, PaymentTypeConfig, Product},
    plans::{PlanKey, SubscriptionPlanRequest},
};
use fieldpay_utils::{id, types::MajorUnit};

use crate::{
    errors::{provider_error, CoreError, CoreResult},
    state::PaymentState,
    validation,
};

/// Hooks into the surrounding form-submission pipeline (an external
/// collaborator of this engine).
pub trait FormPipeline: Send + Sync {
    /// Whole-form validation, re-run before any order is created.
    fn validate_form(&self) -> bool;

    /// Receives the normalized result exactly once on completion. The
    /// pipeline attaches it to the form-data payload and auto-submits the
    /// enclosing form.
    fn submit_with_payment(&self, result: PaymentResult);
}

/// A single buyer's checkout attempt for one payment field.
pub struct CheckoutSession {
    state: PaymentState,
    field: PaymentFieldConfig,
    credentials: MerchantCredentials,
    pipeline: Arc<dyn FormPipeline>,
    is_last_page: bool,
    available_methods: Vec<PaymentMethodKind>,
    checkout_state: CheckoutState,
    selected_method: Option<PaymentMethodKind>,
    entered_amount: Option<MajorUnit>,
    amount_error: Option<String>,
    selected_products: Vec<Product>,
    selected_plan: Option<String>,
    plan_price: Option<MajorUnit>,
    item_number: Option<String>,
    order_id: Option<String>,
    is_processing: bool,
    payment_completed: bool,
}

impl std::fmt::Debug for CheckoutSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutSession")
            .field("field_id", &self.field.field_id)
            .field("checkout_state", &self.checkout_state)
            .field("selected_method", &self.selected_method)
            .field("is_processing", &self.is_processing)
            .finish()
    }
}

impl CheckoutSession {
    /// Creates the session for a buyer viewing the field.
    ///
    /// Fails with a fatal error when the field configuration is unusable or
    /// the merchant cannot be resolved; the caller must render no checkout
    /// UI in that case.
    pub async fn mount(
        state: &PaymentState,
        field: PaymentFieldConfig,
        pipeline: Arc<dyn FormPipeline>,
        is_last_page: bool,
    ) -> CoreResult<Self> {
        let outcome = validation::validate_field(&field);
        if !outcome.is_valid {
            return Err(report!(CoreError::ConfigurationError {
                message: outcome.error_message(),
            }));
        }
        if state.gateway_urls(field.provider).is_none() {
            return Err(report!(CoreError::ConfigurationError {
                message: format!("provider {} is not supported yet", field.provider),
            }));
        }

        let credentials = state
            .merchant_resolver
            .resolve(field.provider, &field.account_identifier)
            .await?;
        let available_methods =
            compute_available_methods(&field.enabled_methods, &credentials.capabilities);
        if available_methods.is_empty() {
            return Err(report!(CoreError::ConfigurationError {
                message: "no payment methods are available for this field".to_owned(),
            }));
        }
        let selected_method = match available_methods.as_slice() {
            [only] => Some(*only),
            _ => None,
        };

        let (selected_plan, plan_price) = match &field.payment_type {
            PaymentTypeConfig::Subscription(config) => {
                let key = PlanKey::new(
                    field.field_id.as_str(),
                    credentials.merchant_id.as_str(),
                    field.provider,
                );
                let entry = state
                    .plan_store
                    .find(&key)
                    .await
                    .change_context(CoreError::ProviderError {
                        message: "plan registry lookup failed".to_owned(),
                    })?;
                let plan_id = entry
                    .map(|entry| entry.plan_id)
                    .or_else(|| config.selected_existing_plan.clone());
                // Linked plans carry no local price; fall back to the field's
                // configured amounts.
                let price = SubscriptionPlanRequest::from_config(&field, config)
                    .ok()
                    .and_then(|request| request.regular_price())
                    .or(config.price)
                    .or(field.amount.value);
                (plan_id, price)
            }
            _ => (None, None),
        };

        let mut session = Self {
            state: state.clone(),
            field,
            credentials,
            pipeline,
            is_last_page,
            available_methods,
            checkout_state: CheckoutState::Idle,
            selected_method,
            entered_amount: None,
            amount_error: None,
            selected_products: Vec::new(),
            selected_plan,
            plan_price,
            item_number: None,
            order_id: None,
            is_processing: false,
            payment_completed: false,
        };
        session.advance_pre_order_state();
        Ok(session)
    }

    /// Current state of the attempt.
    pub fn checkout_state(&self) -> CheckoutState {
        self.checkout_state
    }

    /// Methods the buyer may choose from: the intersection of field-enabled
    /// methods and merchant capabilities.
    pub fn available_methods(&self) -> &[PaymentMethodKind] {
        &self.available_methods
    }

    #[allow(missing_docs)]
    pub fn selected_method(&self) -> Option<PaymentMethodKind> {
        self.selected_method
    }

    /// The inline error for the amount input, if any.
    pub fn amount_error(&self) -> Option<&str> {
        self.amount_error.as_deref()
    }

    #[allow(missing_docs)]
    pub fn payment_completed(&self) -> bool {
        self.payment_completed
    }

    /// Records a buyer-entered amount, validating it against the field's
    /// bounds. Invalid input keeps the session in `AmountPending` with an
    /// inline error.
    pub fn enter_amount(&mut self, input: &str) {
        match validation::validate_payment_amount(input, &self.field.amount) {
            Ok(amount) => {
                self.entered_amount = Some(amount);
                self.amount_error = None;
            }
            Err(error) => {
                self.entered_amount = None;
                self.amount_error = Some(error.to_string());
            }
        }
        self.advance_pre_order_state();
    }

    /// Selects a payment method offered by [`Self::available_methods`].
    pub fn select_method(&mut self, method: PaymentMethodKind) -> CoreResult<()> {
        if !self.available_methods.contains(&method) {
            return Err(report!(CoreError::ValidationError {
                message: format!("payment method {method} is not available for this field"),
            }));
        }
        self.selected_method = Some(method);
        Ok(())
    }

    /// Adds a product to the selection (or replaces it when the field allows
    /// only one).
    pub fn select_product(&mut self, product_id: &str) -> CoreResult<()> {
        let PaymentTypeConfig::ProductWise(config) = &self.field.payment_type else {
            return Err(report!(CoreError::ValidationError {
                message: "this field has no product selection".to_owned(),
            }));
        };
        let product = config
            .products
            .iter()
            .find(|product| product.product_id == product_id)
            .cloned()
            .ok_or_else(|| {
                report!(CoreError::ValidationError {
                    message: format!("unknown product {product_id}"),
                })
            })?;
        if !config.allow_multiple {
            self.selected_products.clear();
        }
        if !self
            .selected_products
            .iter()
            .any(|selected| selected.product_id == product.product_id)
        {
            self.selected_products.push(product);
        }
        self.advance_pre_order_state();
        Ok(())
    }

    /// Removes a product from the selection.
    pub fn remove_product(&mut self, product_id: &str) {
        self.selected_products
            .retain(|product| product.product_id != product_id);
        self.advance_pre_order_state();
    }

    /// The amount this attempt would charge, when determinable.
    ///
    /// Derived per payment type: the plan price for subscriptions, the sum of
    /// selected products for product-wise fields, the validated entered
    /// amount for variable fields, and the configured amount otherwise.
    pub fn effective_amount(&self) -> Option<MajorUnit> {
        match &self.field.payment_type {
            PaymentTypeConfig::Subscription(_) => self.plan_price,
            PaymentTypeConfig::ProductWise(_) => {
                if self.selected_products.is_empty() {
                    None
                } else {
                    Some(
                        self.selected_products
                            .iter()
                            .fold(MajorUnit::zero(), |total, product| total + product.price),
                    )
                }
            }
            PaymentTypeConfig::Donation(_) => self.entered_amount,
            PaymentTypeConfig::CustomAmount(_) => {
                if self
                    .field
                    .payment_type
                    .has_buyer_entered_amount(&self.field.amount)
                {
                    self.entered_amount
                } else {
                    self.field.amount.value
                }
            }
            PaymentTypeConfig::DonationButton(_) | PaymentTypeConfig::OneTime(_) => {
                self.field.amount.value
            }
        }
    }

    /// Whether the checkout trigger may be shown and pressed.
    ///
    /// Every payment type except the donation button is gated behind the
    /// form's final page; the donation button renders its own self-contained
    /// widget on any page.
    pub fn is_payment_button_ready(&self) -> bool {
        if self.payment_completed || self.is_processing {
            return false;
        }
        match &self.field.payment_type {
            PaymentTypeConfig::DonationButton(_) => !matches!(
                self.checkout_state,
                CheckoutState::Completed | CheckoutState::Failed
            ),
            _ => {
                self.checkout_state == CheckoutState::MethodSelection
                    && self.selected_method.is_some()
                    && self
                        .effective_amount()
                        .is_some_and(MajorUnit::is_positive)
            }
        }
    }

    /// The `createOrder` callback: re-validates the whole form, then submits
    /// a payment-initiation request and returns the gateway order id.
    ///
    /// No network call is made when form validation fails. The trigger is
    /// latched while the order is in flight.
    #[instrument(skip_all, fields(field_id = %self.field.field_id))]
    pub async fn create_order(&mut self) -> CoreResult<String> {
        if self.is_processing {
            return Err(report!(CoreError::ValidationError {
                message: "a payment attempt is already in progress".to_owned(),
            }));
        }
        if !self.is_payment_button_ready() {
            return Err(report!(CoreError::ValidationError {
                message: "checkout is not ready".to_owned(),
            }));
        }
        if !self.pipeline.validate_form() {
            return Err(report!(CoreError::ValidationError {
                message: "Form validation failed".to_owned(),
            }));
        }
        let amount = self.effective_amount().ok_or_else(|| {
            report!(CoreError::ValidationError {
                message: "no payment amount is available".to_owned(),
            })
        })?;

        self.is_processing = true;
        self.checkout_state = CheckoutState::AwaitingProviderOrder;

        let item_number = id::generate_item_number(&self.field.field_id, &self.field.form_id);
        let request = InitiatePaymentRequest {
            merchant_id: self.credentials.merchant_id.clone(),
            payment_type: self.field.payment_type.kind(),
            amount,
            currency: self.field.amount.currency,
            item_number: item_number.clone(),
            idempotency_key: id::generate_idempotency_key(),
            return_url: self.redirect_url(true)?,
            cancel_url: self.redirect_url(false)?,
            detail: self.payment_detail()?,
        };

        let gateway_credentials = self.state.gateway_credentials(&self.credentials);
        let urls = self.paypal_urls()?.clone();
        let result = self
            .state
            .gateway
            .initiate_payment(
                self.state.dispatch.as_ref(),
                &urls,
                &gateway_credentials,
                request,
            )
            .await;

        self.is_processing = false;
        match result {
            Ok(order) => {
                self.item_number = Some(item_number);
                self.order_id = Some(order.order_id.clone());
                self.checkout_state = CheckoutState::AwaitingBuyerApproval;
                logger::info!(order_id = %order.order_id, "order created");
                Ok(order.order_id)
            }
            Err(error) => {
                self.checkout_state = CheckoutState::Idle;
                self.advance_pre_order_state();
                Err(provider_error("Failed to initiate payment", error))
            }
        }
    }

    /// The `onApprove` callback: captures the approved order and emits the
    /// normalized payment result to the form pipeline exactly once.
    #[instrument(skip_all, fields(field_id = %self.field.field_id))]
    pub async fn on_approve(&mut self) -> CoreResult<PaymentResult> {
        if self.checkout_state != CheckoutState::AwaitingBuyerApproval {
            return Err(report!(CoreError::ValidationError {
                message: "no order is awaiting buyer approval".to_owned(),
            }));
        }
        let order_id = self.order_id.clone().ok_or_else(|| {
            report!(CoreError::ValidationError {
                message: "no order is awaiting buyer approval".to_owned(),
            })
        })?;

        self.is_processing = true;
        self.checkout_state = CheckoutState::Capturing;

        let request = CaptureRequest {
            merchant_id: self.credentials.merchant_id.clone(),
            order_id: order_id.clone(),
            payment_type: self.field.payment_type.kind(),
            item_number: self.item_number.clone().unwrap_or_default(),
        };
        let gateway_credentials = self.state.gateway_credentials(&self.credentials);
        let urls = self.paypal_urls()?.clone();
        let result = self
            .state
            .gateway
            .capture_payment(
                self.state.dispatch.as_ref(),
                &urls,
                &gateway_credentials,
                request,
            )
            .await;

        self.is_processing = false;
        match result {
            Ok(captured) => {
                self.checkout_state = CheckoutState::Completed;
                let payment_result = PaymentResult {
                    order_id,
                    transaction_id: captured.transaction_id,
                    amount: self.effective_amount().unwrap_or(MajorUnit::zero()),
                    currency: self.field.amount.currency,
                    payment_type: self.field.payment_type.kind(),
                    method: self.selected_method.unwrap_or(PaymentMethodKind::Paypal),
                    merchant_id: self.credentials.merchant_id.clone(),
                    item_number: self.item_number.clone().unwrap_or_default(),
                    billing_address: captured
                        .payer
                        .as_ref()
                        .and_then(|payer| payer.get("address"))
                        .and_then(parse_address),
                    shipping_address: captured
                        .raw
                        .pointer("/purchase_units/0/shipping/address")
                        .and_then(parse_address),
                    raw_capture: captured.raw,
                    completed_at: time::OffsetDateTime::now_utc(),
                };
                if !self.payment_completed {
                    self.payment_completed = true;
                    self.pipeline.submit_with_payment(payment_result.clone());
                }
                logger::info!(
                    transaction_id = %payment_result.transaction_id,
                    "payment completed"
                );
                Ok(payment_result)
            }
            Err(error) => {
                self.checkout_state = CheckoutState::Failed;
                Err(provider_error("Failed to capture payment", error))
            }
        }
    }

    /// Buyer-initiated cancellation; the session may be re-entered via
    /// [`Self::reset`].
    pub fn on_cancel(&mut self) {
        self.is_processing = false;
        self.order_id = None;
        self.item_number = None;
        self.checkout_state = CheckoutState::Cancelled;
        logger::info!(field_id = %self.field.field_id, "checkout cancelled by buyer");
    }

    /// Returns a cancelled or failed session to the pre-order flow so the
    /// buyer can re-initiate. Completed sessions stay completed.
    pub fn reset(&mut self) {
        if self.payment_completed {
            return;
        }
        if matches!(
            self.checkout_state,
            CheckoutState::Cancelled | CheckoutState::Failed
        ) {
            self.order_id = None;
            self.item_number = None;
            self.checkout_state = CheckoutState::Idle;
            self.advance_pre_order_state();
        }
    }

    /// Recomputes the pre-order state from the current inputs.
    fn advance_pre_order_state(&mut self) {
        if matches!(
            self.checkout_state,
            CheckoutState::AwaitingProviderOrder
                | CheckoutState::AwaitingBuyerApproval
                | CheckoutState::Capturing
                | CheckoutState::Completed
                | CheckoutState::Cancelled
                | CheckoutState::Failed
        ) {
            return;
        }
        let needs_amount = self
            .field
            .payment_type
            .has_buyer_entered_amount(&self.field.amount);
        let reachable = self.is_last_page
            || matches!(self.field.payment_type, PaymentTypeConfig::DonationButton(_));

        self.checkout_state = if needs_amount && self.entered_amount.is_none() {
            CheckoutState::AmountPending
        } else if reachable && self.effective_amount().is_some_and(MajorUnit::is_positive) {
            CheckoutState::MethodSelection
        } else {
            CheckoutState::Idle
        };
    }

    fn payment_detail(&self) -> CoreResult<PaymentDetail> {
        match &self.field.payment_type {
            PaymentTypeConfig::ProductWise(_) => Ok(PaymentDetail::Products {
                products: self.selected_products.clone(),
            }),
            PaymentTypeConfig::Subscription(_) => {
                let plan_id = self.selected_plan.clone().ok_or_else(|| {
                    report!(CoreError::ConfigurationError {
                        message: "no subscription plan is registered for this field".to_owned(),
                    })
                })?;
                Ok(PaymentDetail::Subscription { plan_id })
            }
            PaymentTypeConfig::Donation(_)
            | PaymentTypeConfig::DonationButton(_)
            | PaymentTypeConfig::CustomAmount(_)
            | PaymentTypeConfig::OneTime(_) => Ok(PaymentDetail::None),
        }
    }

    /// Builds the buyer redirect url, embedding `formId` and `fieldId` so a
    /// payment-status check can resume after the external redirect.
    fn redirect_url(&self, approved: bool) -> CoreResult<String> {
        let base = self.redirect_base(approved);
        let mut url = url::Url::parse(base).map_err(|_| {
            report!(CoreError::ConfigurationError {
                message: format!("invalid redirect url: {base}"),
            })
        })?;
        url.query_pairs_mut()
            .append_pair("formId", &self.field.form_id)
            .append_pair("fieldId", &self.field.field_id);
        Ok(url.to_string())
    }

    fn redirect_base(&self, approved: bool) -> &str {
        let override_url = match &self.field.payment_type {
            PaymentTypeConfig::Subscription(config) => {
                if approved {
                    config.advanced_settings.return_url.as_deref()
                } else {
                    config.advanced_settings.cancel_url.as_deref()
                }
            }
            _ => None,
        };
        override_url.unwrap_or(if approved {
            &self.state.settings.checkout.return_url
        } else {
            &self.state.settings.checkout.cancel_url
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

fn compute_available_methods(
    enabled: &EnabledMethods,
    capabilities: &MerchantCapabilities,
) -> Vec<PaymentMethodKind> {
    [
        PaymentMethodKind::Paypal,
        PaymentMethodKind::Card,
        PaymentMethodKind::Venmo,
        PaymentMethodKind::GooglePay,
    ]
    .into_iter()
    .filter(|method| enabled.allows(*method) && capabilities.supports(*method))
    .collect()
}

fn parse_address(value: &serde_json::Value) -> Option<Address> {
    let text = |key: &str| {
        value
            .get(key)
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned)
    };
    let address = Address {
        line1: text("address_line_1"),
        line2: text("address_line_2"),
        city: text("admin_area_2"),
        state: text("admin_area_1"),
        postal_code: text("postal_code"),
        country_code: text("country_code"),
    };
    (address != Address::default()).then_some(address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_intersection_respects_both_sides() {
        let enabled = EnabledMethods {
            paypal: true,
            cards: true,
            venmo: true,
            google_pay: false,
        };
        let capabilities = MerchantCapabilities {
            cards: true,
            venmo: false,
            google_pay: true,
            pay_later: false,
        };
        assert_eq!(
            compute_available_methods(&enabled, &capabilities),
            vec![PaymentMethodKind::Paypal, PaymentMethodKind::Card]
        );
    }

    #[test]
    fn payer_addresses_parse_from_gateway_shapes() {
        let value = serde_json::json!({
            "address_line_1": "1 Main St",
            "admin_area_2": "Springfield",
            "postal_code": "12345",
            "country_code": "US"
        });
        let address = parse_address(&value).unwrap();
        assert_eq!(address.line1.as_deref(), Some("1 Main St"));
        assert_eq!(address.city.as_deref(), Some("Springfield"));

        assert!(parse_address(&serde_json::json!({})).is_none());
    }
}
