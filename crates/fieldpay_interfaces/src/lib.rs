#![warn(missing_docs, missing_debug_implementations)]

//! The boundary between the payment core and concrete gateways: the
//! [`api::PaymentGateway`] capability interface, the [`errors::ConnectorError`]
//! taxonomy and the raw response types connectors parse.

pub mod api;
pub mod errors;
pub mod types;
