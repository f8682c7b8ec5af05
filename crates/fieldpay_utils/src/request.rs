//! Outbound HTTP request model.
//!
//! Connectors build [`Request`] values describing a gateway call; the core
//! services layer executes them. Header values are [`Maskable`] so secrets
//! never reach the logs.

use masking::{ExposeInterface, PeekInterface, Secret};
use serde::{Deserialize, Serialize};

/// A header value that may carry a secret.
///
/// Masked values never reach `Debug` output; the whole header set can be
/// logged as-is.
#[derive(Clone, Eq, PartialEq)]
pub enum Maskable {
    /// Wrapped in a [`Secret`]; `Debug` output is masked.
    Masked(Secret<String>),
    /// Plain value.
    Normal(String),
}

impl Maskable {
    /// Get the inner value, consuming self.
    pub fn into_inner(self) -> String {
        match self {
            Self::Masked(inner) => inner.expose(),
            Self::Normal(inner) => inner,
        }
    }
}

impl std::fmt::Debug for Maskable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Masked(secret_value) => std::fmt::Debug::fmt(secret_value, f),
            Self::Normal(value) => std::fmt::Debug::fmt(value, f),
        }
    }
}

impl std::hash::Hash for Maskable {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Self::Masked(value) => value.peek().hash(state),
            Self::Normal(value) => value.hash(state),
        }
    }
}

impl From<String> for Maskable {
    fn from(value: String) -> Self {
        Self::Normal(value)
    }
}

impl From<&str> for Maskable {
    fn from(value: &str) -> Self {
        Self::Normal(value.to_owned())
    }
}

/// Marks a value as secret when inserted into request headers.
pub trait Mask {
    /// Wrap the value so it is masked in logs.
    fn into_masked(self) -> Maskable;
}

impl Mask for String {
    fn into_masked(self) -> Maskable {
        Maskable::Masked(Secret::new(self))
    }
}

impl Mask for Secret<String> {
    fn into_masked(self) -> Maskable {
        Maskable::Masked(self)
    }
}

/// Header collection with masked values.
pub type Headers = std::collections::HashSet<(String, Maskable)>;

/// HTTP method of an outbound request.
#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Method {
    #[allow(missing_docs)]
    Get,
    #[allow(missing_docs)]
    Post,
    #[allow(missing_docs)]
    Put,
    #[allow(missing_docs)]
    Delete,
    #[allow(missing_docs)]
    Patch,
}

/// Body of an outbound request.
pub enum RequestContent {
    /// JSON body.
    Json(serde_json::Value),
    /// `application/x-www-form-urlencoded` body.
    FormUrlEncoded(Vec<(String, String)>),
}

impl std::fmt::Debug for RequestContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Json(_) => "JsonRequestBody",
            Self::FormUrlEncoded(_) => "FormUrlEncodedRequestBody",
        })
    }
}

/// A fully described outbound request, ready to be executed.
#[derive(Debug)]
pub struct Request {
    /// Target url.
    pub url: String,
    /// Headers, with masked values.
    pub headers: Headers,
    /// HTTP method.
    pub method: Method,
    /// Optional body.
    pub body: Option<RequestContent>,
}

impl Request {
    /// Creates a new request with the specified HTTP method and url.
    pub fn new(method: Method, url: &str) -> Self {
        Self {
            method,
            url: String::from(url),
            headers: std::collections::HashSet::new(),
            body: None,
        }
    }

    /// Sets the body of the request.
    pub fn set_body<T: Into<RequestContent>>(&mut self, body: T) {
        self.body.replace(body.into());
    }

    /// Adds a header. The value may be masked.
    pub fn add_header(&mut self, header: &str, value: Maskable<String>) {
        self.headers.insert((String::from(header), value));
    }
}

/// Builder for [`Request`].
#[derive(Debug)]
pub struct RequestBuilder {
    url: String,
    headers: Headers,
    method: Method,
    body: Option<RequestContent>,
}

impl RequestBuilder {
    /// Creates a builder with default values.
    pub fn new() -> Self {
        Self {
            method: Method::Get,
            url: String::with_capacity(1024),
            headers: std::collections::HashSet::new(),
            body: None,
        }
    }

    /// Sets the url.
    pub fn url(mut self, url: &str) -> Self {
        self.url = url.into();
        self
    }

    /// Sets the method.
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Inserts a single header.
    pub fn header(mut self, header: &str, value: &str) -> Self {
        self.headers.insert((header.into(), value.into()));
        self
    }

    /// Extends the headers with the given pairs.
    pub fn headers(mut self, headers: Vec<(String, Maskable<String>)>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Sets the body.
    pub fn set_body<T: Into<RequestContent>>(mut self, body: T) -> Self {
        self.body.replace(body.into());
        self
    }

    /// Builds the request.
    pub fn build(self) -> Request {
        Request {
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl From<serde_json::Value> for RequestContent {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

impl From<Vec<(String, String)>> for RequestContent {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self::FormUrlEncoded(pairs)
    }
}
