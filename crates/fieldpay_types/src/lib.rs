//! Domain and API types for the payment-field engine: enums shared across
//! crates, the per-field payment configuration model, merchant credentials,
//! subscription plan payloads and the checkout API contracts.

pub mod checkout;
pub mod enums;
pub mod merchants;
pub mod payment_fields;
pub mod plans;
