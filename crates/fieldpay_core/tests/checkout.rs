//! Checkout-side properties: last-page gating, amount bounds blocking the
//! trigger, the full create-order → approve → capture flow, single
//! auto-submit, cancellation retry and method availability.

mod common;

use std::sync::atomic::Ordering;

use common::*;
use fieldpay_core::{checkout::CheckoutSession, errors::CoreError, processing::PaymentProcessor};
use fieldpay_types::enums::{CheckoutState, PaymentMethodKind};

#[tokio::test]
async fn subscription_checkout_is_unreachable_before_the_last_page() {
    let gateway = MockGateway::new();
    let store = MockCredentialStore::new();
    let state = make_state(gateway.clone(), store);
    PaymentProcessor::new(&state)
        .process_field(&subscription_field("f1", "M-1"))
        .await
        .unwrap();

    let mut session = CheckoutSession::mount(
        &state,
        subscription_field("f1", "M-1"),
        RecordingPipeline::new(true),
        false,
    )
    .await
    .unwrap();
    session.select_method(PaymentMethodKind::Paypal).unwrap();

    assert!(!session.is_payment_button_ready());
    assert!(session.create_order().await.is_err());
    assert_eq!(gateway.call_count("initiate_payment"), 0);
}

#[tokio::test]
async fn subscription_checkout_completes_on_the_last_page() {
    let gateway = MockGateway::new();
    let store = MockCredentialStore::new();
    let state = make_state(gateway.clone(), store);
    PaymentProcessor::new(&state)
        .process_field(&subscription_field("f1", "M-1"))
        .await
        .unwrap();

    let pipeline = RecordingPipeline::new(true);
    let mut session = CheckoutSession::mount(
        &state,
        subscription_field("f1", "M-1"),
        pipeline.clone(),
        true,
    )
    .await
    .unwrap();
    session.select_method(PaymentMethodKind::Paypal).unwrap();
    assert!(session.is_payment_button_ready());

    let order_id = session.create_order().await.unwrap();
    assert_eq!(session.checkout_state(), CheckoutState::AwaitingBuyerApproval);

    let result = session.on_approve().await.unwrap();
    assert_eq!(result.order_id, order_id);
    assert_eq!(result.transaction_id, "TXN-1");
    assert!(session.payment_completed());
    assert_eq!(pipeline.submission_count(), 1);
}

#[tokio::test]
async fn below_minimum_amount_blocks_checkout_without_any_network_call() {
    let gateway = MockGateway::new();
    let store = MockCredentialStore::new();
    let state = make_state(gateway.clone(), store);

    let mut session = CheckoutSession::mount(
        &state,
        custom_amount_field("f1", "M-1", Some(5.0)),
        RecordingPipeline::new(true),
        true,
    )
    .await
    .unwrap();
    session.select_method(PaymentMethodKind::Paypal).unwrap();

    session.enter_amount("3");
    assert_eq!(session.checkout_state(), CheckoutState::AmountPending);
    assert_eq!(session.amount_error(), Some("Amount must be at least 5.00"));
    assert!(!session.is_payment_button_ready());
    assert!(session.create_order().await.is_err());
    assert_eq!(gateway.total_calls(), 0);

    session.enter_amount("8");
    assert_eq!(session.checkout_state(), CheckoutState::MethodSelection);
    assert!(session.is_payment_button_ready());
}

#[tokio::test]
async fn successful_checkout_emits_one_normalized_result_and_submits_once() {
    let gateway = MockGateway::new();
    let store = MockCredentialStore::new();
    let state = make_state(gateway.clone(), store);

    let pipeline = RecordingPipeline::new(true);
    let mut session = CheckoutSession::mount(
        &state,
        donation_field("f1", "M-1"),
        pipeline.clone(),
        true,
    )
    .await
    .unwrap();
    session.enter_amount("25");
    session.select_method(PaymentMethodKind::Paypal).unwrap();

    session.create_order().await.unwrap();
    let result = session.on_approve().await.unwrap();

    assert_eq!(result.transaction_id, "TXN-1");
    assert_eq!(result.amount.get(), 25.0);
    assert_eq!(result.merchant_id, "M-1");
    assert!(result.item_number.starts_with("f1-form1-"));
    assert_eq!(
        result.billing_address.as_ref().and_then(|a| a.country_code.as_deref()),
        Some("US")
    );
    assert_eq!(pipeline.submission_count(), 1);

    // A second approval callback must not submit the form again.
    assert!(session.on_approve().await.is_err());
    assert_eq!(pipeline.submission_count(), 1);
}

#[tokio::test]
async fn form_validation_failure_blocks_order_creation() {
    let gateway = MockGateway::new();
    let store = MockCredentialStore::new();
    let state = make_state(gateway.clone(), store);

    let pipeline = RecordingPipeline::new(false);
    let mut session = CheckoutSession::mount(
        &state,
        donation_field("f1", "M-1"),
        pipeline.clone(),
        true,
    )
    .await
    .unwrap();
    session.enter_amount("25");
    session.select_method(PaymentMethodKind::Paypal).unwrap();

    let error = session.create_order().await.unwrap_err();
    assert!(matches!(
        error.current_context(),
        CoreError::ValidationError { .. }
    ));
    assert_eq!(gateway.call_count("initiate_payment"), 0);

    // Fixing the form makes the same session usable again.
    pipeline.form_valid.store(true, Ordering::SeqCst);
    assert!(session.create_order().await.is_ok());
}

#[tokio::test]
async fn buyer_cancel_is_retryable() {
    let gateway = MockGateway::new();
    let store = MockCredentialStore::new();
    let state = make_state(gateway.clone(), store);

    let mut session = CheckoutSession::mount(
        &state,
        donation_field("f1", "M-1"),
        RecordingPipeline::new(true),
        true,
    )
    .await
    .unwrap();
    session.enter_amount("25");
    session.select_method(PaymentMethodKind::Paypal).unwrap();

    session.create_order().await.unwrap();
    session.on_cancel();
    assert_eq!(session.checkout_state(), CheckoutState::Cancelled);
    assert!(!session.is_payment_button_ready());

    session.reset();
    assert!(session.is_payment_button_ready());
    session.create_order().await.unwrap();
    assert_eq!(gateway.call_count("initiate_payment"), 2);
}

#[tokio::test]
async fn capture_failure_is_terminal_until_reset() {
    let gateway = MockGateway::new();
    let store = MockCredentialStore::new();
    let state = make_state(gateway.clone(), store);

    let pipeline = RecordingPipeline::new(true);
    let mut session = CheckoutSession::mount(
        &state,
        donation_field("f1", "M-1"),
        pipeline.clone(),
        true,
    )
    .await
    .unwrap();
    session.enter_amount("25");
    session.select_method(PaymentMethodKind::Paypal).unwrap();
    session.create_order().await.unwrap();

    gateway.fail_capture.store(true, Ordering::SeqCst);
    let error = session.on_approve().await.unwrap_err();
    assert!(matches!(
        error.current_context(),
        CoreError::ProviderError { .. }
    ));
    assert_eq!(session.checkout_state(), CheckoutState::Failed);
    assert!(!session.is_payment_button_ready());
    assert_eq!(pipeline.submission_count(), 0);

    // The buyer must re-initiate from the start.
    gateway.fail_capture.store(false, Ordering::SeqCst);
    session.reset();
    session.create_order().await.unwrap();
    session.on_approve().await.unwrap();
    assert_eq!(pipeline.submission_count(), 1);
}

#[tokio::test]
async fn product_selection_drives_the_order_amount() {
    let gateway = MockGateway::new();
    let store = MockCredentialStore::new();
    let state = make_state(gateway.clone(), store);

    let mut session = CheckoutSession::mount(
        &state,
        product_field("f1", "M-1"),
        RecordingPipeline::new(true),
        true,
    )
    .await
    .unwrap();
    session.select_method(PaymentMethodKind::Paypal).unwrap();

    assert!(!session.is_payment_button_ready());
    session.select_product("p1").unwrap();
    session.select_product("p2").unwrap();
    assert_eq!(session.effective_amount().map(|a| a.get()), Some(20.0));
    assert!(session.is_payment_button_ready());

    session.remove_product("p2");
    assert_eq!(session.effective_amount().map(|a| a.get()), Some(12.5));
}

#[tokio::test]
async fn sole_available_method_is_auto_selected() {
    let gateway = MockGateway::new();
    let store = MockCredentialStore::new();
    let state = make_state(gateway.clone(), store);

    let mut field = donation_field("f1", "M-1");
    field.enabled_methods.cards = false;
    let session = CheckoutSession::mount(&state, field, RecordingPipeline::new(true), true)
        .await
        .unwrap();

    assert_eq!(session.available_methods(), [PaymentMethodKind::Paypal]);
    assert_eq!(session.selected_method(), Some(PaymentMethodKind::Paypal));
}

#[tokio::test]
async fn donation_button_renders_off_the_last_page_but_invalid_config_never_mounts() {
    let gateway = MockGateway::new();
    let store = MockCredentialStore::new();
    let state = make_state(gateway.clone(), store);

    let session = CheckoutSession::mount(
        &state,
        donation_button_field("f1", "M-1", Some("BTN-1")),
        RecordingPipeline::new(true),
        false,
    )
    .await
    .unwrap();
    assert!(session.is_payment_button_ready());

    let error = CheckoutSession::mount(
        &state,
        donation_button_field("f2", "M-1", None),
        RecordingPipeline::new(true),
        false,
    )
    .await
    .unwrap_err();
    let CoreError::ConfigurationError { message } = error.current_context() else {
        panic!("expected a configuration error");
    };
    assert!(message.contains("Donation button ID is required"));
}

#[tokio::test]
async fn failed_order_creation_returns_the_session_to_the_pre_order_flow() {
    let gateway = MockGateway::new();
    let store = MockCredentialStore::new();
    let state = make_state(gateway.clone(), store);

    let mut session = CheckoutSession::mount(
        &state,
        donation_field("f1", "M-1"),
        RecordingPipeline::new(true),
        true,
    )
    .await
    .unwrap();
    session.enter_amount("25");
    session.select_method(PaymentMethodKind::Paypal).unwrap();

    gateway.fail_initiate.store(true, Ordering::SeqCst);
    let error = session.create_order().await.unwrap_err();
    assert!(matches!(
        error.current_context(),
        CoreError::ProviderError { .. }
    ));
    assert_eq!(session.checkout_state(), CheckoutState::MethodSelection);

    gateway.fail_initiate.store(false, Ordering::SeqCst);
    assert!(session.create_order().await.is_ok());
}
