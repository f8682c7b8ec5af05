pub mod transformers;

use error_stack::{report, ResultExt};
use fieldpay_env::logger;
use fieldpay_interfaces::{
    api::{ConnectorCommon, HttpDispatch, PaymentGateway},
    errors::ConnectorError,
    types::{ErrorResponse, GatewayUrlConfig, Response},
};
use fieldpay_types::{
    checkout::{CaptureRequest, CapturedPayment, CreatedOrder, InitiatePaymentRequest},
    enums::{GatewayEnvironment, PaymentTypeKind, PlanStatus},
    merchants::{MerchantCapabilities, MerchantCredentials, OnboardingUrl, OnboardingUrlRequest},
    plans::{CreatedPlan, FoundPlan, PlanUpdateRequest, SubscriptionPlanRequest},
};
use fieldpay_utils::{
    errors::CustomResult,
    ext_traits::{BytesExt, Encode},
    request::{Mask, Maskable, Method, Request, RequestBuilder},
};
use masking::{PeekInterface, Secret};
use transformers as paypal;

use crate::headers;

#[derive(Debug, Clone)]
pub struct Paypal;

impl Paypal {
    /// Obtains an OAuth access token via the client-credentials grant.
    async fn fetch_access_token(
        &self,
        dispatch: &dyn HttpDispatch,
        urls: &GatewayUrlConfig,
        credentials: &MerchantCredentials,
    ) -> CustomResult<Secret<String>, ConnectorError> {
        let auth = paypal::PaypalAuthType::try_from(credentials)?;
        let request = RequestBuilder::new()
            .method(Method::Post)
            .url(&format!(
                "{}/v1/oauth2/token",
                self.base_url(urls, credentials.environment)
            ))
            .headers(vec![(
                headers::AUTHORIZATION.to_string(),
                auth.generate_authorization_value().into_masked(),
            )])
            .header(
                headers::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .set_body(vec![(
                "grant_type".to_string(),
                "client_credentials".to_string(),
            )])
            .build();

        let response = dispatch.send(request).await?;
        let token: paypal::AccessTokenResponse =
            self.handle_response(&response, "AccessTokenResponse")?;
        Ok(token.access_token)
    }

    /// Parses a success response, or raises the gateway's declared error.
    fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: &Response,
        type_name: &'static str,
    ) -> CustomResult<T, ConnectorError> {
        if response.is_success() {
            response
                .response
                .parse_struct(type_name)
                .change_context(ConnectorError::ResponseDeserializationFailed)
        } else {
            let error = self.build_error_response(response)?;
            logger::warn!(
                connector = self.id(),
                status_code = error.status_code,
                error_code = %error.code,
                "gateway call failed"
            );
            Err(report!(ConnectorError::GatewayError {
                code: error.code,
                message: error.reason.unwrap_or(error.message),
            }))
        }
    }

    /// Standard headers for a JSON call authorized by a bearer token.
    fn bearer_headers(
        &self,
        credentials: &MerchantCredentials,
        access_token: &Secret<String>,
    ) -> CustomResult<Vec<(String, Maskable)>, ConnectorError> {
        let mut header_list =
            self.build_auth_headers(credentials, Some(access_token.peek().as_str()))?;
        header_list.push((
            headers::CONTENT_TYPE.to_string(),
            "application/json".to_string().into(),
        ));
        header_list.push((
            paypal::auth_headers::PREFER.to_string(),
            "return=representation".to_string().into(),
        ));
        Ok(header_list)
    }

    fn json_request(
        &self,
        method: Method,
        url: String,
        header_list: Vec<(String, Maskable)>,
        body: &impl serde::Serialize,
    ) -> CustomResult<Request, ConnectorError> {
        let payload = body
            .encode_to_value()
            .change_context(ConnectorError::RequestBuildFailed)?;
        Ok(RequestBuilder::new()
            .method(method)
            .url(&url)
            .headers(header_list)
            .set_body(payload)
            .build())
    }
}

impl ConnectorCommon for Paypal {
    fn id(&self) -> &'static str {
        "paypal"
    }

    fn base_url<'a>(
        &self,
        urls: &'a GatewayUrlConfig,
        environment: GatewayEnvironment,
    ) -> &'a str {
        match environment {
            GatewayEnvironment::Sandbox => urls.sandbox_base_url.as_ref(),
            GatewayEnvironment::Production => urls.base_url.as_ref(),
        }
    }

    fn build_auth_headers(
        &self,
        _credentials: &MerchantCredentials,
        access_token: Option<&str>,
    ) -> CustomResult<Vec<(String, Maskable)>, ConnectorError> {
        let token = access_token.ok_or(ConnectorError::FailedToObtainAuthType)?;
        Ok(vec![(
            headers::AUTHORIZATION.to_string(),
            format!("Bearer {token}").into_masked(),
        )])
    }

    fn build_error_response(
        &self,
        res: &Response,
    ) -> CustomResult<ErrorResponse, ConnectorError> {
        if let Ok(response) = res
            .response
            .parse_struct::<paypal::PaypalOrderErrorResponse>("PaypalOrderErrorResponse")
        {
            let reason = response.details.as_ref().map(|details| {
                details
                    .iter()
                    .map(|detail| {
                        detail
                            .description
                            .clone()
                            .unwrap_or_else(|| detail.issue.clone())
                    })
                    .collect::<Vec<_>>()
                    .join("; ")
            });
            return Ok(ErrorResponse {
                status_code: res.status_code,
                code: response.name.unwrap_or_else(|| "UNKNOWN".to_string()),
                message: response
                    .message
                    .unwrap_or_else(|| "gateway did not provide a message".to_string()),
                reason,
            });
        }

        let token_error: paypal::PaypalAccessTokenErrorResponse = res
            .response
            .parse_struct("PaypalAccessTokenErrorResponse")
            .change_context(ConnectorError::ResponseDeserializationFailed)?;
        Ok(ErrorResponse {
            status_code: res.status_code,
            code: token_error.error,
            message: token_error
                .error_description
                .unwrap_or_else(|| "authentication failed".to_string()),
            reason: None,
        })
    }
}

#[async_trait::async_trait]
impl PaymentGateway for Paypal {
    async fn create_plan(
        &self,
        dispatch: &dyn HttpDispatch,
        urls: &GatewayUrlConfig,
        credentials: &MerchantCredentials,
        request: SubscriptionPlanRequest,
    ) -> CustomResult<CreatedPlan, ConnectorError> {
        let base = self.base_url(urls, credentials.environment).to_owned();
        let token = self.fetch_access_token(dispatch, urls, credentials).await?;

        let product_request = paypal::CatalogProductRequest::from(&request);
        let http_request = self.json_request(
            Method::Post,
            format!("{base}/v1/catalogs/products"),
            self.bearer_headers(credentials, &token)?,
            &product_request,
        )?;
        let response = dispatch.send(http_request).await?;
        let product: paypal::CatalogProductResponse =
            self.handle_response(&response, "CatalogProductResponse")?;

        let plan_request =
            paypal::BillingPlanRequest::try_from((product.id.clone(), &request))?;
        let http_request = self.json_request(
            Method::Post,
            format!("{base}/v1/billing/plans"),
            self.bearer_headers(credentials, &token)?,
            &plan_request,
        )?;
        let response = dispatch.send(http_request).await?;
        let plan: paypal::BillingPlanResponse =
            self.handle_response(&response, "BillingPlanResponse")?;
        logger::info!(connector = self.id(), plan_id = %plan.id, "subscription plan created");

        Ok(CreatedPlan {
            plan_id: plan.id,
            product_id: plan.product_id.or(Some(product.id)),
            plan_name: plan.name.unwrap_or(request.name),
            status: PlanStatus::from(plan.status),
        })
    }

    async fn update_plan(
        &self,
        dispatch: &dyn HttpDispatch,
        urls: &GatewayUrlConfig,
        credentials: &MerchantCredentials,
        plan_id: &str,
        request: PlanUpdateRequest,
    ) -> CustomResult<(), ConnectorError> {
        let base = self.base_url(urls, credentials.environment).to_owned();
        let token = self.fetch_access_token(dispatch, urls, credentials).await?;

        let operations = paypal::plan_update_operations(&request);
        let http_request = self.json_request(
            Method::Patch,
            format!("{base}/v1/billing/plans/{plan_id}"),
            self.bearer_headers(credentials, &token)?,
            &operations,
        )?;
        let response = dispatch.send(http_request).await?;
        if response.is_success() {
            logger::info!(connector = self.id(), plan_id, "subscription plan updated");
            Ok(())
        } else {
            let error = self.build_error_response(&response)?;
            Err(report!(ConnectorError::GatewayError {
                code: error.code,
                message: error.reason.unwrap_or(error.message),
            }))
        }
    }

    async fn find_plan(
        &self,
        dispatch: &dyn HttpDispatch,
        urls: &GatewayUrlConfig,
        credentials: &MerchantCredentials,
        plan_id: &str,
    ) -> CustomResult<FoundPlan, ConnectorError> {
        let base = self.base_url(urls, credentials.environment).to_owned();
        let token = self.fetch_access_token(dispatch, urls, credentials).await?;

        let http_request = RequestBuilder::new()
            .method(Method::Get)
            .url(&format!("{base}/v1/billing/plans/{plan_id}"))
            .headers(self.build_auth_headers(credentials, Some(token.peek().as_str()))?)
            .build();
        let response = dispatch.send(http_request).await?;
        if response.status_code == 404 {
            return Err(report!(ConnectorError::NotFound));
        }
        let plan: paypal::BillingPlanResponse =
            self.handle_response(&response, "BillingPlanResponse")?;

        Ok(FoundPlan {
            plan_id: plan.id,
            name: plan.name.unwrap_or_default(),
            status: PlanStatus::from(plan.status),
        })
    }

    async fn initiate_payment(
        &self,
        dispatch: &dyn HttpDispatch,
        urls: &GatewayUrlConfig,
        credentials: &MerchantCredentials,
        request: InitiatePaymentRequest,
    ) -> CustomResult<CreatedOrder, ConnectorError> {
        let base = self.base_url(urls, credentials.environment).to_owned();
        let token = self.fetch_access_token(dispatch, urls, credentials).await?;

        let mut header_list = self.bearer_headers(credentials, &token)?;
        header_list.push((
            paypal::auth_headers::PAYPAL_REQUEST_ID.to_string(),
            request.idempotency_key.clone().into(),
        ));

        let order_id = if request.payment_type == PaymentTypeKind::Subscription {
            let body = paypal::SubscriptionsRequest::try_from(&request)?;
            let http_request = self.json_request(
                Method::Post,
                format!("{base}/v1/billing/subscriptions"),
                header_list,
                &body,
            )?;
            let response = dispatch.send(http_request).await?;
            let subscription: paypal::SubscriptionsResponse =
                self.handle_response(&response, "SubscriptionsResponse")?;
            subscription.id
        } else {
            let body = paypal::OrdersRequest::from(&request);
            let http_request = self.json_request(
                Method::Post,
                format!("{base}/v2/checkout/orders"),
                header_list,
                &body,
            )?;
            let response = dispatch.send(http_request).await?;
            let order: paypal::OrdersResponse =
                self.handle_response(&response, "OrdersResponse")?;
            order.id
        };
        logger::info!(
            connector = self.id(),
            item_number = %request.item_number,
            "payment initiated"
        );

        Ok(CreatedOrder { order_id })
    }

    async fn capture_payment(
        &self,
        dispatch: &dyn HttpDispatch,
        urls: &GatewayUrlConfig,
        credentials: &MerchantCredentials,
        request: CaptureRequest,
    ) -> CustomResult<CapturedPayment, ConnectorError> {
        let base = self.base_url(urls, credentials.environment).to_owned();
        let token = self.fetch_access_token(dispatch, urls, credentials).await?;

        if request.payment_type == PaymentTypeKind::Subscription {
            let http_request = RequestBuilder::new()
                .method(Method::Get)
                .url(&format!(
                    "{base}/v1/billing/subscriptions/{}",
                    request.order_id
                ))
                .headers(self.build_auth_headers(credentials, Some(token.peek().as_str()))?)
                .build();
            let response = dispatch.send(http_request).await?;
            let raw: serde_json::Value = self.handle_response(&response, "SubscriptionDetails")?;
            return Ok(CapturedPayment {
                transaction_id: request.order_id.clone(),
                payer: raw.get("subscriber").cloned(),
                raw,
            });
        }

        let http_request = self.json_request(
            Method::Post,
            format!("{base}/v2/checkout/orders/{}/capture", request.order_id),
            self.bearer_headers(credentials, &token)?,
            &serde_json::json!({}),
        )?;
        let response = dispatch.send(http_request).await?;
        let raw: serde_json::Value = self.handle_response(&response, "CaptureOrderResponse")?;
        let capture: paypal::CaptureOrderResponse = serde_json::from_value(raw.clone())
            .change_context(ConnectorError::ResponseDeserializationFailed)?;
        logger::info!(
            connector = self.id(),
            order_id = %capture.id,
            "payment captured"
        );

        Ok(CapturedPayment {
            transaction_id: capture.transaction_id(),
            payer: capture.payer,
            raw,
        })
    }

    async fn get_capabilities(
        &self,
        dispatch: &dyn HttpDispatch,
        urls: &GatewayUrlConfig,
        credentials: &MerchantCredentials,
    ) -> CustomResult<MerchantCapabilities, ConnectorError> {
        let base = self.base_url(urls, credentials.environment).to_owned();
        let partner_id = urls
            .partner_id
            .as_deref()
            .ok_or(ConnectorError::MissingRequiredField {
                field_name: "partner_id",
            })?
            .to_owned();
        let token = self.fetch_access_token(dispatch, urls, credentials).await?;

        let http_request = RequestBuilder::new()
            .method(Method::Get)
            .url(&format!(
                "{base}/v1/customer/partners/{partner_id}/merchant-integrations/{}",
                credentials.merchant_id
            ))
            .headers(self.build_auth_headers(credentials, Some(token.peek().as_str()))?)
            .build();
        let response = dispatch.send(http_request).await?;
        let integrations: paypal::MerchantIntegrationsResponse =
            self.handle_response(&response, "MerchantIntegrationsResponse")?;

        Ok(MerchantCapabilities::from(integrations))
    }

    async fn generate_onboarding_url(
        &self,
        dispatch: &dyn HttpDispatch,
        urls: &GatewayUrlConfig,
        partner_credentials: &MerchantCredentials,
        request: OnboardingUrlRequest,
    ) -> CustomResult<OnboardingUrl, ConnectorError> {
        let base = self
            .base_url(urls, partner_credentials.environment)
            .to_owned();
        let token = self
            .fetch_access_token(dispatch, urls, partner_credentials)
            .await?;

        let body = paypal::PartnerReferralRequest::from(&request);
        let http_request = self.json_request(
            Method::Post,
            format!("{base}/v2/customer/partner-referrals"),
            self.bearer_headers(partner_credentials, &token)?,
            &body,
        )?;
        let response = dispatch.send(http_request).await?;
        let referral: paypal::PartnerReferralResponse =
            self.handle_response(&response, "PartnerReferralResponse")?;
        let url = referral
            .action_url()
            .ok_or(ConnectorError::ResponseDeserializationFailed)
            .attach_printable("partner referral response carried no action url")?;

        Ok(OnboardingUrl {
            url,
            tracking_id: request.tracking_id,
        })
    }
}
