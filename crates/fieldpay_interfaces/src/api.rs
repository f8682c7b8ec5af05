//! The per-gateway capability interface.

use fieldpay_types::{
    checkout::{CaptureRequest, CapturedPayment, CreatedOrder, InitiatePaymentRequest},
    enums::GatewayEnvironment,
    merchants::{MerchantCapabilities, MerchantCredentials, OnboardingUrl, OnboardingUrlRequest},
    plans::{CreatedPlan, FoundPlan, PlanUpdateRequest, SubscriptionPlanRequest},
};
use fieldpay_utils::{
    errors::CustomResult,
    request::{Maskable, Request},
};

use crate::{
    errors::ConnectorError,
    types::{ErrorResponse, GatewayUrlConfig, Response},
};

/// Executes a connector-built [`Request`] and returns the raw response.
///
/// Implemented once by the core services layer over a real HTTP client; test
/// doubles implement it (or bypass it entirely) to keep connectors offline.
#[async_trait::async_trait]
pub trait HttpDispatch: Send + Sync {
    /// Send the request and collect the response body.
    async fn send(&self, request: Request) -> CustomResult<Response, ConnectorError>;
}

/// Identity and shared behavior of a gateway connector.
pub trait ConnectorCommon {
    /// Stable connector id, e.g. `"paypal"`.
    fn id(&self) -> &'static str;

    /// The API host for the given environment.
    fn base_url<'a>(&self, urls: &'a GatewayUrlConfig, environment: GatewayEnvironment)
        -> &'a str;

    /// Builds the authentication headers for a call on behalf of the given
    /// merchant.
    fn build_auth_headers(
        &self,
        credentials: &MerchantCredentials,
        access_token: Option<&str>,
    ) -> CustomResult<Vec<(String, Maskable)>, ConnectorError>;

    /// Interprets a non-success response body as the gateway's error shape.
    fn build_error_response(&self, res: &Response) -> CustomResult<ErrorResponse, ConnectorError>;
}

/// The capability interface every gateway implements once: plan lifecycle,
/// checkout and merchant-facing operations.
#[async_trait::async_trait]
pub trait PaymentGateway: ConnectorCommon + Send + Sync {
    /// Registers a new subscription plan (and its catalog product, when the
    /// gateway separates the two).
    async fn create_plan(
        &self,
        dispatch: &dyn HttpDispatch,
        urls: &GatewayUrlConfig,
        credentials: &MerchantCredentials,
        request: SubscriptionPlanRequest,
    ) -> CustomResult<CreatedPlan, ConnectorError>;

    /// Updates the narrow set of plan attributes the gateway allows changing
    /// in place.
    async fn update_plan(
        &self,
        dispatch: &dyn HttpDispatch,
        urls: &GatewayUrlConfig,
        credentials: &MerchantCredentials,
        plan_id: &str,
        request: PlanUpdateRequest,
    ) -> CustomResult<(), ConnectorError>;

    /// Looks up an existing plan by id.
    async fn find_plan(
        &self,
        dispatch: &dyn HttpDispatch,
        urls: &GatewayUrlConfig,
        credentials: &MerchantCredentials,
        plan_id: &str,
    ) -> CustomResult<FoundPlan, ConnectorError>;

    /// Creates an order for a checkout attempt, returning the opaque order id
    /// handed to the buyer-approval flow.
    async fn initiate_payment(
        &self,
        dispatch: &dyn HttpDispatch,
        urls: &GatewayUrlConfig,
        credentials: &MerchantCredentials,
        request: InitiatePaymentRequest,
    ) -> CustomResult<CreatedOrder, ConnectorError>;

    /// Captures an approved order into a settled transaction.
    async fn capture_payment(
        &self,
        dispatch: &dyn HttpDispatch,
        urls: &GatewayUrlConfig,
        credentials: &MerchantCredentials,
        request: CaptureRequest,
    ) -> CustomResult<CapturedPayment, ConnectorError>;

    /// Fetches the capability flags of a merchant account.
    async fn get_capabilities(
        &self,
        dispatch: &dyn HttpDispatch,
        urls: &GatewayUrlConfig,
        credentials: &MerchantCredentials,
    ) -> CustomResult<MerchantCapabilities, ConnectorError>;

    /// Generates a gateway onboarding url for a new merchant.
    async fn generate_onboarding_url(
        &self,
        dispatch: &dyn HttpDispatch,
        urls: &GatewayUrlConfig,
        partner_credentials: &MerchantCredentials,
        request: OnboardingUrlRequest,
    ) -> CustomResult<OnboardingUrl, ConnectorError>;
}
