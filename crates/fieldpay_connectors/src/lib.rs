//! Gateway connector implementations.
//!
//! Each connector implements the [`fieldpay_interfaces::api::PaymentGateway`]
//! capability interface by building outbound requests and interpreting raw
//! responses; it performs no I/O of its own.

pub mod paypal;
pub mod utils;

pub use paypal::Paypal;

/// Well-known header names used by connectors.
pub mod headers {
    pub const AUTHORIZATION: &str = "Authorization";
    pub const CONTENT_TYPE: &str = "Content-Type";
}
