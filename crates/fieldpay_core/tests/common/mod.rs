//! Scripted doubles shared by the integration tests: a call-recording
//! gateway with programmable failures, an in-memory credential store, a
//! network-refusing dispatcher and a recording form pipeline.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use error_stack::report;
use fieldpay_core::{
    checkout::FormPipeline,
    merchants::CredentialStore,
    settings::Settings,
    state::PaymentState,
};
use fieldpay_interfaces::{
    api::{ConnectorCommon, HttpDispatch, PaymentGateway},
    errors::ConnectorError,
    types::{ErrorResponse, GatewayUrlConfig, Response},
};
use fieldpay_types::{
    checkout::{
        CaptureRequest, CapturedPayment, CreatedOrder, InitiatePaymentRequest, PaymentResult,
    },
    enums::{AmountType, Currency, GatewayEnvironment, PaymentProvider, PlanStatus},
    merchants::{
        AccountSummary, MerchantCapabilities, MerchantCredentials, OnboardingSubmission,
        OnboardingUrl, OnboardingUrlRequest,
    },
    payment_fields::{
        AccountIdentifier, AmountConfig, CustomAmountConfig, DonationButtonConfig,
        DonationConfig, EnabledMethods, PaymentFieldConfig, PaymentTypeConfig, Product,
        ProductConfig, SubscriptionConfig,
    },
    plans::{CreatedPlan, FoundPlan, PlanUpdateRequest, SubscriptionPlanRequest},
};
use fieldpay_utils::{
    errors::CustomResult,
    request::{Maskable, Request},
    types::MajorUnit,
};

#[derive(Default)]
pub struct MockGateway {
    calls: Mutex<Vec<String>>,
    pub fail_update: AtomicBool,
    pub fail_create: AtomicBool,
    pub fail_initiate: AtomicBool,
    pub fail_capture: AtomicBool,
    plan_counter: AtomicUsize,
    order_counter: AtomicUsize,
}

impl MockGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_owned());
    }

    pub fn call_count(&self, call: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|recorded| recorded.as_str() == call)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl ConnectorCommon for MockGateway {
    fn id(&self) -> &'static str {
        "mock"
    }

    fn base_url<'a>(
        &self,
        urls: &'a GatewayUrlConfig,
        _environment: GatewayEnvironment,
    ) -> &'a str {
        urls.sandbox_base_url.as_ref()
    }

    fn build_auth_headers(
        &self,
        _credentials: &MerchantCredentials,
        _access_token: Option<&str>,
    ) -> CustomResult<Vec<(String, Maskable)>, ConnectorError> {
        Ok(Vec::new())
    }

    fn build_error_response(&self, res: &Response) -> CustomResult<ErrorResponse, ConnectorError> {
        Ok(ErrorResponse {
            status_code: res.status_code,
            code: "MOCK".to_owned(),
            message: "mock error".to_owned(),
            reason: None,
        })
    }
}

#[async_trait::async_trait]
impl PaymentGateway for MockGateway {
    async fn create_plan(
        &self,
        _dispatch: &dyn HttpDispatch,
        _urls: &GatewayUrlConfig,
        _credentials: &MerchantCredentials,
        request: SubscriptionPlanRequest,
    ) -> CustomResult<CreatedPlan, ConnectorError> {
        self.record("create_plan");
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(report!(ConnectorError::GatewayError {
                code: "CREATE_FAILED".to_owned(),
                message: "plan creation rejected".to_owned(),
            }));
        }
        let n = self.plan_counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(CreatedPlan {
            plan_id: format!("PLAN-{n}"),
            product_id: Some(format!("PROD-{n}")),
            plan_name: request.name,
            status: PlanStatus::Active,
        })
    }

    async fn update_plan(
        &self,
        _dispatch: &dyn HttpDispatch,
        _urls: &GatewayUrlConfig,
        _credentials: &MerchantCredentials,
        _plan_id: &str,
        _request: PlanUpdateRequest,
    ) -> CustomResult<(), ConnectorError> {
        self.record("update_plan");
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(report!(ConnectorError::GatewayError {
                code: "UNPROCESSABLE_ENTITY".to_owned(),
                message: "plan update rejected".to_owned(),
            }));
        }
        Ok(())
    }

    async fn find_plan(
        &self,
        _dispatch: &dyn HttpDispatch,
        _urls: &GatewayUrlConfig,
        _credentials: &MerchantCredentials,
        plan_id: &str,
    ) -> CustomResult<FoundPlan, ConnectorError> {
        self.record("find_plan");
        Ok(FoundPlan {
            plan_id: plan_id.to_owned(),
            name: "Linked plan".to_owned(),
            status: PlanStatus::Active,
        })
    }

    async fn initiate_payment(
        &self,
        _dispatch: &dyn HttpDispatch,
        _urls: &GatewayUrlConfig,
        _credentials: &MerchantCredentials,
        _request: InitiatePaymentRequest,
    ) -> CustomResult<CreatedOrder, ConnectorError> {
        self.record("initiate_payment");
        if self.fail_initiate.load(Ordering::SeqCst) {
            return Err(report!(ConnectorError::GatewayError {
                code: "ORDER_FAILED".to_owned(),
                message: "order creation rejected".to_owned(),
            }));
        }
        let n = self.order_counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(CreatedOrder {
            order_id: format!("ORDER-{n}"),
        })
    }

    async fn capture_payment(
        &self,
        _dispatch: &dyn HttpDispatch,
        _urls: &GatewayUrlConfig,
        _credentials: &MerchantCredentials,
        request: CaptureRequest,
    ) -> CustomResult<CapturedPayment, ConnectorError> {
        self.record("capture_payment");
        if self.fail_capture.load(Ordering::SeqCst) {
            return Err(report!(ConnectorError::GatewayError {
                code: "CAPTURE_FAILED".to_owned(),
                message: "capture rejected".to_owned(),
            }));
        }
        let raw = serde_json::json!({
            "id": request.order_id,
            "status": "COMPLETED",
            "purchase_units": [
                {"payments": {"captures": [{"id": "TXN-1", "status": "COMPLETED"}]}}
            ]
        });
        Ok(CapturedPayment {
            transaction_id: "TXN-1".to_owned(),
            payer: Some(serde_json::json!({
                "address": {"country_code": "US", "postal_code": "12345"}
            })),
            raw,
        })
    }

    async fn get_capabilities(
        &self,
        _dispatch: &dyn HttpDispatch,
        _urls: &GatewayUrlConfig,
        _credentials: &MerchantCredentials,
    ) -> CustomResult<MerchantCapabilities, ConnectorError> {
        self.record("get_capabilities");
        Ok(MerchantCapabilities::default())
    }

    async fn generate_onboarding_url(
        &self,
        _dispatch: &dyn HttpDispatch,
        _urls: &GatewayUrlConfig,
        _partner_credentials: &MerchantCredentials,
        request: OnboardingUrlRequest,
    ) -> CustomResult<OnboardingUrl, ConnectorError> {
        self.record("generate_onboarding_url");
        Ok(OnboardingUrl {
            url: "https://gateway.example/onboard".to_owned(),
            tracking_id: request.tracking_id,
        })
    }
}

#[derive(Default)]
pub struct MockCredentialStore {
    pub records: Mutex<HashMap<String, MerchantCredentials>>,
    pub accounts: Mutex<Vec<AccountSummary>>,
}

impl MockCredentialStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait::async_trait]
impl CredentialStore for MockCredentialStore {
    async fn fetch_credentials(
        &self,
        record_id: &str,
    ) -> CustomResult<MerchantCredentials, ConnectorError> {
        self.records
            .lock()
            .unwrap()
            .get(record_id)
            .cloned()
            .ok_or_else(|| report!(ConnectorError::NotFound))
    }

    async fn store_onboarding(
        &self,
        submission: OnboardingSubmission,
    ) -> CustomResult<AccountSummary, ConnectorError> {
        let summary = AccountSummary {
            record_id: format!("REC{:015}", self.accounts.lock().unwrap().len() + 1),
            name: submission.name,
            merchant_id: submission.merchant_id,
            provider: submission.provider,
            environment: submission.environment,
            is_active: true,
            created_at: None,
        };
        self.accounts.lock().unwrap().push(summary.clone());
        Ok(summary)
    }

    async fn list_accounts(&self) -> CustomResult<Vec<AccountSummary>, ConnectorError> {
        Ok(self.accounts.lock().unwrap().clone())
    }
}

/// Refuses all traffic; the mock gateway never dispatches, so any send means
/// a component tried to reach the network when it must not.
pub struct NullDispatch;

#[async_trait::async_trait]
impl HttpDispatch for NullDispatch {
    async fn send(&self, _request: Request) -> CustomResult<Response, ConnectorError> {
        Err(report!(ConnectorError::RequestNotSent(
            "network is disabled in tests".to_owned(),
        )))
    }
}

#[derive(Default)]
pub struct RecordingPipeline {
    pub form_valid: AtomicBool,
    pub submissions: Mutex<Vec<PaymentResult>>,
}

impl RecordingPipeline {
    pub fn new(form_valid: bool) -> Arc<Self> {
        let pipeline = Self::default();
        pipeline.form_valid.store(form_valid, Ordering::SeqCst);
        Arc::new(pipeline)
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.lock().unwrap().len()
    }
}

impl FormPipeline for RecordingPipeline {
    fn validate_form(&self) -> bool {
        self.form_valid.load(Ordering::SeqCst)
    }

    fn submit_with_payment(&self, result: PaymentResult) {
        self.submissions.lock().unwrap().push(result);
    }
}

pub fn make_state(gateway: Arc<MockGateway>, store: Arc<MockCredentialStore>) -> PaymentState {
    PaymentState::new(
        Settings::default(),
        gateway,
        store,
        Arc::new(NullDispatch),
    )
}

pub fn static_amount(value: f64) -> AmountConfig {
    AmountConfig {
        kind: AmountType::Static,
        value: Some(MajorUnit::new(value)),
        currency: Currency::Usd,
        min_amount: None,
        max_amount: None,
        suggested_amounts: Vec::new(),
    }
}

pub fn variable_amount(min: Option<f64>, max: Option<f64>) -> AmountConfig {
    AmountConfig {
        kind: AmountType::Variable,
        value: None,
        currency: Currency::Usd,
        min_amount: min.map(MajorUnit::new),
        max_amount: max.map(MajorUnit::new),
        suggested_amounts: Vec::new(),
    }
}

pub fn base_field(
    field_id: &str,
    merchant: &str,
    amount: AmountConfig,
    payment_type: PaymentTypeConfig,
) -> PaymentFieldConfig {
    PaymentFieldConfig {
        field_id: field_id.to_owned(),
        form_id: "form1".to_owned(),
        provider: PaymentProvider::Paypal,
        account_identifier: AccountIdentifier::parse(merchant),
        amount,
        payment_type,
        previous_merchant_id: None,
        enabled_methods: EnabledMethods::default(),
    }
}

pub fn subscription_field(field_id: &str, merchant: &str) -> PaymentFieldConfig {
    base_field(
        field_id,
        merchant,
        static_amount(20.0),
        PaymentTypeConfig::Subscription(SubscriptionConfig {
            name: Some("Pro".to_owned()),
            frequency: Some(fieldpay_types::enums::BillingIntervalUnit::Month),
            price: Some(MajorUnit::new(20.0)),
            ..Default::default()
        }),
    )
}

pub fn linked_subscription_field(
    field_id: &str,
    merchant: &str,
    plan_id: &str,
) -> PaymentFieldConfig {
    base_field(
        field_id,
        merchant,
        static_amount(20.0),
        PaymentTypeConfig::Subscription(SubscriptionConfig {
            use_existing_plan: true,
            selected_existing_plan: Some(plan_id.to_owned()),
            ..Default::default()
        }),
    )
}

pub fn custom_amount_field(field_id: &str, merchant: &str, min: Option<f64>) -> PaymentFieldConfig {
    base_field(
        field_id,
        merchant,
        variable_amount(min, None),
        PaymentTypeConfig::CustomAmount(CustomAmountConfig::default()),
    )
}

pub fn donation_field(field_id: &str, merchant: &str) -> PaymentFieldConfig {
    base_field(
        field_id,
        merchant,
        variable_amount(None, None),
        PaymentTypeConfig::Donation(DonationConfig::default()),
    )
}

pub fn donation_button_field(
    field_id: &str,
    merchant: &str,
    button_id: Option<&str>,
) -> PaymentFieldConfig {
    base_field(
        field_id,
        merchant,
        static_amount(10.0),
        PaymentTypeConfig::DonationButton(DonationButtonConfig {
            donation_button_id: button_id.map(str::to_owned),
        }),
    )
}

pub fn product_field(field_id: &str, merchant: &str) -> PaymentFieldConfig {
    base_field(
        field_id,
        merchant,
        static_amount(0.0),
        PaymentTypeConfig::ProductWise(ProductConfig {
            products: vec![
                Product {
                    product_id: "p1".to_owned(),
                    name: "Widget".to_owned(),
                    price: MajorUnit::new(12.5),
                },
                Product {
                    product_id: "p2".to_owned(),
                    name: "Gadget".to_owned(),
                    price: MajorUnit::new(7.5),
                },
            ],
            allow_multiple: true,
        }),
    )
}
