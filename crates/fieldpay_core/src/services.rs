//! Execution of connector-built requests over a shared HTTP client.

use std::time::Duration;

use error_stack::{report, ResultExt};
use fieldpay_env::{instrument, logger, tracing};
use fieldpay_interfaces::{api::HttpDispatch, errors::ConnectorError, types::Response};
use fieldpay_utils::{
    errors::CustomResult,
    request::{Method, Request, RequestContent},
};

use crate::settings::HttpClientConfig;

/// The production [`HttpDispatch`] implementation: one shared connection pool,
/// a per-request timeout, no redirect following.
#[derive(Debug, Clone)]
pub struct HttpDispatcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpDispatcher {
    /// Builds the dispatcher from the configured client settings.
    pub fn new(config: &HttpClientConfig) -> CustomResult<Self, ConnectorError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .change_context(ConnectorError::RequestNotSent(
                "failed to construct the HTTP client".to_owned(),
            ))?;
        Ok(Self {
            client,
            timeout: Duration::from_secs(config.request_timeout_secs),
        })
    }
}

#[async_trait::async_trait]
impl HttpDispatch for HttpDispatcher {
    #[instrument(skip_all, fields(method = %request.method, url = %request.url))]
    async fn send(&self, request: Request) -> CustomResult<Response, ConnectorError> {
        logger::info!(headers = ?request.headers, "dispatching gateway request");

        let url =
            url::Url::parse(&request.url).change_context(ConnectorError::RequestBuildFailed)?;
        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Put => self.client.put(url),
            Method::Delete => self.client.delete(url),
            Method::Patch => self.client.patch(url),
        };
        for (name, value) in request.headers {
            builder = builder.header(name, value.into_inner());
        }
        builder = match request.body {
            Some(RequestContent::Json(payload)) => builder.json(&payload),
            Some(RequestContent::FormUrlEncoded(pairs)) => builder.form(&pairs),
            None => builder,
        };

        let response = builder
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|error| {
                if error.is_timeout() {
                    report!(ConnectorError::RequestTimeout)
                } else {
                    report!(ConnectorError::RequestNotSent(error.to_string()))
                }
            })
            .attach_printable("unable to send request to the gateway")?;

        let status_code = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .change_context(ConnectorError::ResponseDeserializationFailed)
            .attach_printable("unable to read the gateway response body")?;
        logger::info!(status_code, "gateway response received");

        Ok(Response {
            status_code,
            response: body,
        })
    }
}
