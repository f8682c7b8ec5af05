//! The payment-field engine: per-field configuration processing (subscription
//! plan lifecycle, configuration echo for checkout-time payment types) and the
//! buyer-facing checkout orchestration state machine.
//!
//! Gateways are reached through the capability interface in
//! `fieldpay_interfaces`; everything here is gateway-agnostic.

pub mod checkout;
pub mod errors;
pub mod merchants;
pub mod onboarding;
pub mod plan_registry;
pub mod processing;
pub mod services;
pub mod settings;
pub mod state;
pub mod validation;
